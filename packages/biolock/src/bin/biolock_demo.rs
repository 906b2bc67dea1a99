//! Simulated end-to-end run: enroll a key, authorize with a scripted
//! sensor, and print the sealed message.

use biolock::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AuthError> {
    LoggingTransformer::init();

    let config = match std::env::args().nth(1) {
        Some(path) => AuthConfig::load(path)?,
        None => AuthConfig::default(),
    };

    let sensor = Arc::new(SimulatedSensor::new());
    let coordinator = AuthorizationCoordinator::with_config(
        Arc::new(SoftwareKeyContainer::new()),
        Arc::clone(&sensor),
        Arc::new(SimulatedLockScreen::new(true)),
        config,
    );

    if let Err(reason) = coordinator.availability() {
        println!("Biometric authentication unavailable: {reason}");
        return Ok(());
    }
    coordinator.enroll_default_key()?;

    let mut status = coordinator.subscribe_status();
    tokio::spawn(async move {
        while let Ok(update) = status.recv().await {
            println!("[{:?}] {}", update.severity, update.message);
        }
    });

    let key_name = coordinator.config().default_key_name.clone();
    let pending = coordinator.authorize(&key_name)?;

    let scanner = Arc::clone(&sensor);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        scanner.reject();
        tokio::time::sleep(Duration::from_millis(500)).await;
        scanner.accept();
    });

    match pending.outcome().await {
        AuthOutcome::Authenticated { cipher_session } => {
            let sealed = cipher_session.encrypt(b"Very secret message")?;
            println!("Purchase confirmed: {}", sealed.to_base64());
        }
        AuthOutcome::FallbackRequested(reason) => {
            println!("Use your password instead ({reason})");
        }
        AuthOutcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}
