//! Sensor session lifecycle tests

use biolock_cipher::{AuthToken, CipherError, CipherSessionFactory, OperationId, SessionState};
use biolock_key::{KeyLifecycleManager, SoftwareKeyContainer};
use biolock_sensor::{
    BiometricSensorSession, SensorCallback, SensorError, SensorEventKind, SensorOutcome,
    SensorState, Severity, SimulatedSensor, StatusUpdate, UnavailableReason, ERROR_CANCELED,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

struct Fixture {
    container: Arc<SoftwareKeyContainer>,
    factory: CipherSessionFactory<SoftwareKeyContainer>,
    sensor: Arc<SimulatedSensor>,
    sessions: BiometricSensorSession<SimulatedSensor>,
}

fn fixture_with(sensor: SimulatedSensor) -> Fixture {
    let container = Arc::new(SoftwareKeyContainer::new());
    KeyLifecycleManager::new(Arc::clone(&container))
        .create_key("default_key", true)
        .expect("create key");
    let sensor = Arc::new(sensor);
    Fixture {
        factory: CipherSessionFactory::new(Arc::clone(&container)),
        container,
        sessions: BiometricSensorSession::new(Arc::clone(&sensor)),
        sensor,
    }
}

fn fixture() -> Fixture {
    fixture_with(SimulatedSensor::new())
}

impl Fixture {
    fn start(&self) -> biolock_sensor::SensorSession {
        let cipher = self.factory.begin_session("default_key").expect("cipher session");
        self.sessions.start(cipher).expect("start listening")
    }
}

fn drain(rx: &mut broadcast::Receiver<StatusUpdate>) -> Vec<StatusUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

fn severities(updates: &[StatusUpdate]) -> Vec<Severity> {
    updates.iter().map(|u| u.severity).collect()
}

#[tokio::test(start_paused = true)]
async fn test_match_authorizes_cipher_after_settle_delay() {
    let fx = fixture();
    let session = fx.start();
    let began = Instant::now();

    assert!(fx.sensor.accept());
    let outcome = session.outcome().await;

    assert!(began.elapsed() >= Duration::from_millis(1300));
    assert_eq!(session.state(), SensorState::Succeeded);
    assert_eq!(session.last_event(), Some(SensorEventKind::Succeeded));
    match outcome {
        SensorOutcome::Succeeded(cipher) => {
            assert_eq!(cipher.state(), SessionState::Authorized);
            let sealed = cipher.encrypt(b"Very secret message").expect("encrypt");
            assert!(!sealed.to_base64().is_empty());
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_swallows_cancellation_echo() {
    let fx = fixture();
    let session = fx.start();
    let mut status = fx.sessions.subscribe();

    session.stop();
    // Echo delivered through the driver stream and directly
    sleep(Duration::from_millis(50)).await;
    session.on_error(ERROR_CANCELED, "Fingerprint operation canceled.");
    sleep(Duration::from_secs(5)).await;

    assert!(session.is_self_cancelled());
    assert!(session.cancellation_token().is_cancelled());
    assert_eq!(session.state(), SensorState::Cancelled);
    assert_eq!(
        session.history(),
        vec![SensorState::Listening, SensorState::Cancelled]
    );
    assert!(drain(&mut status).is_empty());
    assert!(matches!(session.outcome().await, SensorOutcome::Stopped));
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_success_settle_cancels_outcome() {
    let fx = fixture();
    let session = fx.start();

    fx.sensor.accept();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(session.state(), SensorState::Succeeded);

    session.stop();
    let outcome = session.outcome().await;

    assert!(matches!(outcome, SensorOutcome::Stopped));
    assert_eq!(session.state(), SensorState::Cancelled);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(session.state(), SensorState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_error_settle_cancels_outcome() {
    let fx = fixture();
    let session = fx.start();

    fx.sensor.fail(7, "Too many attempts. Try again later.");
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(session.state(), SensorState::Error);

    session.stop();
    assert!(matches!(session.outcome().await, SensorOutcome::Stopped));
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_reports_failure_after_settle_delay() {
    let fx = fixture();
    let mut status = fx.sessions.subscribe();
    let session = fx.start();
    let began = Instant::now();

    fx.sensor.fail(7, "Too many attempts. Try again later.");
    let outcome = session.outcome().await;

    assert!(began.elapsed() >= Duration::from_millis(1600));
    match outcome {
        SensorOutcome::Failed { message } => {
            assert_eq!(message, "Too many attempts. Try again later.");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(session.state(), SensorState::Error);
    assert!(!session.is_self_cancelled());

    let updates = drain(&mut status);
    assert_eq!(updates[0].severity, Severity::Hint);
    assert_eq!(updates[1].severity, Severity::Warning);
    assert_eq!(updates[1].message, "Too many attempts. Try again later.");
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_uses_fresh_token() {
    let fx = fixture();
    let first = fx.start();
    first.stop();

    let second = fx.start();
    assert!(!second.is_self_cancelled());
    assert!(!second.cancellation_token().is_cancelled());
    assert!(first.cancellation_token().is_cancelled());
    assert_eq!(fx.sensor.listen_count(), 2);
    assert_eq!(fx.sensor.active_operation(), Some(second.operation_id()));

    fx.sensor.accept();
    assert!(second.outcome().await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_failed_attempts_keep_listening() {
    let fx = fixture();
    let session = fx.start();

    fx.sensor.reject();
    fx.sensor.reject();
    fx.sensor.accept();

    assert!(session.outcome().await.is_success());
    assert_eq!(
        session.history(),
        vec![
            SensorState::Listening,
            SensorState::Listening,
            SensorState::Listening,
            SensorState::Succeeded,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_help_publishes_warning_and_keeps_listening() {
    let fx = fixture();
    let session = fx.start();
    let mut status = fx.sessions.subscribe();

    session.on_help(1, "Sensor dirty, please clean it");

    assert_eq!(session.state(), SensorState::Listening);
    assert_eq!(session.last_event(), Some(SensorEventKind::Help));
    let updates = drain(&mut status);
    assert_eq!(
        updates,
        vec![StatusUpdate::new(
            "Sensor dirty, please clean it",
            Severity::Warning
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn test_warning_reverts_to_hint_and_newer_warning_supersedes() {
    let fx = fixture();
    let session = fx.start();
    let mut status = fx.sessions.subscribe();

    session.on_failed_attempt();
    sleep(Duration::from_millis(1000)).await;
    session.on_failed_attempt();
    sleep(Duration::from_millis(1000)).await;

    // First reset would have fired at 1600 ms
    assert_eq!(
        severities(&drain(&mut status)),
        vec![Severity::Warning, Severity::Warning]
    );

    sleep(Duration::from_millis(700)).await;
    let updates = drain(&mut status);
    assert_eq!(updates, vec![StatusUpdate::new("Touch sensor", Severity::Hint)]);
}

#[tokio::test(start_paused = true)]
async fn test_success_cancels_pending_reset() {
    let fx = fixture();
    let session = fx.start();
    let mut status = fx.sessions.subscribe();

    session.on_failed_attempt();
    sleep(Duration::from_millis(100)).await;
    session.on_succeeded(AuthToken::new(session.operation_id()));
    sleep(Duration::from_secs(3)).await;

    let updates = drain(&mut status);
    assert_eq!(
        severities(&updates),
        vec![Severity::Warning, Severity::Success]
    );
    assert_eq!(updates[1].message, "Fingerprint recognized");
}

#[tokio::test(start_paused = true)]
async fn test_events_after_terminal_state_are_ignored() {
    let fx = fixture();
    let session = fx.start();

    session.on_succeeded(AuthToken::new(session.operation_id()));
    session.on_failed_attempt();
    session.on_error(7, "late error");
    session.on_succeeded(AuthToken::new(session.operation_id()));

    assert_eq!(
        session.history(),
        vec![SensorState::Listening, SensorState::Succeeded]
    );
    assert!(session.outcome().await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_match_for_other_operation_fails_session() {
    let fx = fixture();
    let session = fx.start();

    session.on_succeeded(AuthToken::new(OperationId::new()));

    assert_eq!(session.state(), SensorState::Error);
    assert!(matches!(
        session.outcome().await,
        SensorOutcome::Failed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_outcome_taken_once() {
    let fx = fixture();
    let session = fx.start();
    let outcome = session.outcome();

    session.stop();
    session.stop();

    assert_eq!(
        session.history(),
        vec![SensorState::Listening, SensorState::Cancelled]
    );
    assert!(matches!(outcome.await, SensorOutcome::Stopped));
    assert!(matches!(session.outcome().await, SensorOutcome::Stopped));
}

#[tokio::test(start_paused = true)]
async fn test_outcome_handler_maps_result() {
    let fx = fixture();
    let session = fx.start();
    fx.sensor.accept();

    let authorized = session
        .outcome()
        .on_outcome(|outcome| outcome.is_success())
        .await;
    assert!(authorized);
}

#[tokio::test]
async fn test_start_requires_enrollment_and_hardware() {
    let fx = fixture_with(SimulatedSensor::without_enrollment());
    let cipher = fx.factory.begin_session("default_key").expect("cipher session");
    let err = fx.sessions.start(cipher).expect_err("no enrollment");
    assert!(matches!(
        err,
        SensorError::Unavailable(UnavailableReason::NoEnrollment)
    ));
    assert_eq!(fx.sensor.listen_count(), 0);

    let fx = fixture_with(SimulatedSensor::without_hardware());
    assert!(!fx.sessions.is_available());
    let cipher = fx.factory.begin_session("default_key").expect("cipher session");
    let err = fx.sessions.start(cipher).expect_err("no hardware");
    assert!(matches!(
        err,
        SensorError::Unavailable(UnavailableReason::NoHardware)
    ));
}

#[test]
fn test_start_outside_runtime_fails() {
    let fx = fixture();
    let cipher = fx.factory.begin_session("default_key").expect("cipher session");
    assert!(matches!(
        fx.sessions.start(cipher),
        Err(SensorError::NoRuntime)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_match_after_enrollment_change_yields_stale_cipher() {
    let fx = fixture();
    let session = fx.start();

    assert_eq!(fx.container.simulate_enrollment_change().unwrap(), 1);
    assert!(fx.sensor.accept());

    match session.outcome().await {
        SensorOutcome::Succeeded(cipher) => {
            assert_eq!(cipher.state(), SessionState::Invalidated);
            let err = cipher.encrypt(b"Very secret message").unwrap_err();
            assert!(matches!(err, CipherError::SessionStale(_)), "{err:?}");
        }
        other => panic!("expected stale success, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_driver_refusal_fails_start() {
    let fx = fixture();
    fx.sensor.refuse_next_listen("sensor busy");
    let cipher = fx.factory.begin_session("default_key").expect("cipher session");

    match fx.sessions.start(cipher) {
        Err(SensorError::Driver(reason)) => assert_eq!(reason, "sensor busy"),
        other => panic!("expected driver error, got {other:?}"),
    }
    // Refusal applies to one listen only
    let session = fx.start();
    assert_eq!(session.state(), SensorState::Listening);
}
