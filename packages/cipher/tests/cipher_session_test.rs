//! Cipher session lifecycle against the software key container

use biolock_cipher::prelude::*;
use biolock_key::{KeyLifecycleManager, KeyPolicy, SoftwareKeyContainer};
use std::sync::Arc;

const SECRET_MESSAGE: &[u8] = b"Very secret message";

fn setup() -> (
    Arc<SoftwareKeyContainer>,
    KeyLifecycleManager<SoftwareKeyContainer>,
    CipherSessionFactory<SoftwareKeyContainer>,
) {
    let container = Arc::new(SoftwareKeyContainer::new());
    let keys = KeyLifecycleManager::new(Arc::clone(&container));
    let factory = CipherSessionFactory::new(Arc::clone(&container));
    (container, keys, factory)
}

fn authorized(session: &mut CipherSession) {
    let token = AuthToken::new(session.operation_id());
    session.authorize(&token).unwrap();
}

#[test]
fn test_begin_session_is_ready() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let session = factory.begin_session("default_key").unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.mode(), CipherMode::Encrypt);
    assert_eq!(session.key_name(), "default_key");
    assert!(session.requires_auth());
}

#[test]
fn test_enrollment_change_invalidates_next_session() {
    let (container, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    container.simulate_enrollment_change().unwrap();

    let err = factory.begin_session("default_key").unwrap_err();
    assert!(err.is_key_invalidated());
    assert!(matches!(err, InitError::KeyInvalidated { ref key_name } if key_name == "default_key"));
}

#[test]
fn test_key_exempt_from_enrollment_survives_change() {
    let (container, keys, factory) = setup();
    keys.create_key("k", false).unwrap();
    container.simulate_enrollment_change().unwrap();

    let session = factory.begin_session("k").unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_missing_key_is_fatal() {
    let (_, _, factory) = setup();
    assert!(matches!(
        factory.begin_session("nope"),
        Err(InitError::Fatal(_))
    ));
}

#[test]
fn test_unavailable_store_is_fatal() {
    let (container, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    container.set_available(false);

    assert!(matches!(
        factory.begin_session("default_key"),
        Err(InitError::Fatal(_))
    ));
}

#[test]
fn test_algorithm_key_size_mismatch_is_fatal() {
    let (_, keys, factory) = setup();
    keys.create_key_with_policy(
        "short",
        &KeyPolicy {
            size_bits: 128,
            ..KeyPolicy::biometric_bound(true)
        },
    )
    .unwrap();

    assert!(matches!(
        factory.begin_session("short"),
        Err(InitError::Fatal(_))
    ));
}

#[test]
fn test_unauthorized_session_cannot_encrypt() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let session = factory.begin_session("default_key").unwrap();
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::NotAuthorized)
    ));
}

#[test]
fn test_token_for_other_operation_rejected() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut first = factory.begin_session("default_key").unwrap();
    let second = factory.begin_session("default_key").unwrap();

    let token = AuthToken::new(second.operation_id());
    assert!(matches!(first.authorize(&token), Err(CipherError::TokenMismatch)));
    assert_eq!(first.state(), SessionState::Ready);
}

#[test]
fn test_authorized_encrypt_then_decrypt() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);
    assert_eq!(session.state(), SessionState::Authorized);
    let sealed = session.encrypt(SECRET_MESSAGE).unwrap();
    assert!(!sealed.to_base64().is_empty());

    let mut opener = factory
        .begin_session_with_mode("default_key", CipherMode::Decrypt)
        .unwrap();
    authorized(&mut opener);
    assert_eq!(opener.decrypt(&sealed).unwrap(), SECRET_MESSAGE);
}

#[test]
fn test_tampered_payload_is_operation_failure_and_key_survives() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);
    let sealed = session.encrypt(SECRET_MESSAGE).unwrap();

    let mut bytes = sealed.to_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let tampered = SealedPayload::from_bytes(sealed.algorithm(), &bytes).unwrap();

    let mut opener = factory
        .begin_session_with_mode("default_key", CipherMode::Decrypt)
        .unwrap();
    authorized(&mut opener);
    let err = opener.decrypt(&tampered).unwrap_err();
    assert!(err.is_operation_failure());

    assert!(factory.begin_session("default_key").is_ok());
}

#[test]
fn test_wrong_mode_rejected() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);
    let payload = SealedPayload::new(CipherAlgorithm::Aes256Gcm, vec![0; 12], vec![0; 32]);
    assert!(matches!(
        session.decrypt(&payload),
        Err(CipherError::WrongMode { .. })
    ));
}

#[test]
fn test_recreated_key_revokes_open_sessions() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut stale = factory.begin_session("default_key").unwrap();

    keys.create_key("default_key", true).unwrap();
    let _fresh = factory.begin_session("default_key").unwrap();

    assert_eq!(stale.state(), SessionState::Invalidated);
    let token = AuthToken::new(stale.operation_id());
    assert!(matches!(
        stale.authorize(&token),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_revoke_key_marks_session_stale() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);

    assert_eq!(factory.revoke_key("default_key"), 1);
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_expired_authorization_is_stale() {
    let container = Arc::new(SoftwareKeyContainer::new());
    let keys = KeyLifecycleManager::new(Arc::clone(&container));
    let factory = CipherSessionFactory::with_config(
        Arc::clone(&container),
        CipherConfig {
            session_validity_secs: 0,
            ..CipherConfig::default()
        },
    );
    keys.create_key("default_key", true).unwrap();

    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);
    std::thread::sleep(std::time::Duration::from_millis(5));

    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
    assert!(factory.ledger().is_empty());
}

#[test]
fn test_key_without_live_auth_needs_no_token() {
    let (_, keys, factory) = setup();
    keys.create_key_with_policy(
        "plain",
        &KeyPolicy {
            requires_live_auth: false,
            invalidated_by_new_enrollment: false,
            size_bits: 256,
        },
    )
    .unwrap();

    let session = factory.begin_session("plain").unwrap();
    assert!(!session.requires_auth());
    assert!(session.encrypt(SECRET_MESSAGE).is_ok());
}

#[test]
fn test_dropped_session_leaves_ledger() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();

    let session = factory.begin_session("default_key").unwrap();
    assert_eq!(factory.ledger().len(), 1);
    drop(session);
    assert!(factory.ledger().is_empty());
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: CipherConfig = serde_json::from_str(r#"{"algorithm":"chacha20poly1305"}"#).unwrap();
    assert_eq!(config.algorithm, CipherAlgorithm::ChaCha20Poly1305);
    assert_eq!(config.session_validity_secs, 30);
}

#[test]
fn test_deleted_key_rejects_open_session() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();

    assert!(keys.delete_key("default_key").unwrap());
    assert_eq!(session.state(), SessionState::Invalidated);

    let token = AuthToken::new(session.operation_id());
    assert!(matches!(
        session.authorize(&token),
        Err(CipherError::SessionStale(_))
    ));
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_key_deleted_after_authorization_rejects_encrypt() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);

    keys.delete_key("default_key").unwrap();
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_enrollment_change_rejects_authorized_session() {
    let (container, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);
    assert_eq!(session.state(), SessionState::Authorized);

    container.simulate_enrollment_change().unwrap();
    assert_eq!(session.state(), SessionState::Invalidated);
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_replaced_key_rejects_session_without_new_begin() {
    let (_, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);

    keys.create_key("default_key", true).unwrap();
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}

#[test]
fn test_offline_container_rejects_session() {
    let (container, keys, factory) = setup();
    keys.create_key("default_key", true).unwrap();
    let mut session = factory.begin_session("default_key").unwrap();
    authorized(&mut session);

    container.set_available(false);
    assert!(matches!(
        session.encrypt(SECRET_MESSAGE),
        Err(CipherError::SessionStale(_))
    ));
}
