//! Property tests for soft sensor events

use biolock_cipher::CipherSessionFactory;
use biolock_key::{KeyLifecycleManager, SoftwareKeyContainer};
use biolock_sensor::{BiometricSensorSession, SensorState, SimulatedSensor};
use proptest::prelude::*;
use std::sync::Arc;

fn run_soft_events(help_flags: Vec<bool>) -> Vec<SensorState> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("runtime");

    runtime.block_on(async move {
        let container = Arc::new(SoftwareKeyContainer::new());
        KeyLifecycleManager::new(Arc::clone(&container))
            .create_key("default_key", true)
            .expect("create key");
        let factory = CipherSessionFactory::new(container);
        let sensor = Arc::new(SimulatedSensor::new());
        let sessions = BiometricSensorSession::new(Arc::clone(&sensor));

        let cipher = factory.begin_session("default_key").expect("cipher session");
        let session = sessions.start(cipher).expect("start");

        for help in help_flags {
            if help {
                sensor.help("Move finger slightly");
            } else {
                sensor.reject();
            }
        }
        sensor.accept();

        assert!(session.outcome().await.is_success());
        session.history()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn soft_events_never_leave_listening(flags in prop::collection::vec(any::<bool>(), 0..16)) {
        let count = flags.len();
        let history = run_soft_events(flags);

        prop_assert_eq!(history.len(), count + 2);
        prop_assert!(history[..=count].iter().all(|s| *s == SensorState::Listening));
        prop_assert_eq!(history[count + 1], SensorState::Succeeded);
    }
}
