//! Key lifecycle behaviour against the software container

use biolock_key::prelude::*;
use std::sync::Arc;

fn manager() -> (Arc<SoftwareKeyContainer>, KeyLifecycleManager<SoftwareKeyContainer>) {
    let container = Arc::new(SoftwareKeyContainer::new());
    (Arc::clone(&container), KeyLifecycleManager::new(container))
}

#[test]
fn test_create_key_is_idempotent_per_name() {
    let (_, keys) = manager();

    let first = keys.create_key("default_key", true).unwrap();
    let second = keys.create_key("default_key", false).unwrap();

    assert_eq!(first.name, second.name);
    assert!(second.generation > first.generation);
    let stored = keys.record("default_key").unwrap().unwrap();
    assert_eq!(stored, second);
    assert!(stored.requires_live_auth);
}

#[test]
fn test_has_key() {
    let (_, keys) = manager();
    assert!(!keys.has_key("default_key"));

    keys.create_key("default_key", true).unwrap();
    assert!(keys.has_key("default_key"));
    assert!(!keys.has_key("other"));
}

#[test]
fn test_create_key_fails_when_store_unavailable() {
    let (container, keys) = manager();
    container.set_available(false);

    let err = keys.create_key("default_key", true).unwrap_err();
    assert!(matches!(err, KeyError::StoreUnavailable { .. }));
    assert!(!keys.has_key("default_key"));
}

#[test]
fn test_empty_name_rejected() {
    let (_, keys) = manager();
    assert!(matches!(
        keys.create_key("  ", true),
        Err(KeyError::InvalidKeyName(_))
    ));
}

#[test]
fn test_enrollment_change_respects_policy() {
    let (container, keys) = manager();
    keys.create_key("default_key", true).unwrap();
    keys.create_key("key_not_invalidated", false).unwrap();

    assert_eq!(container.simulate_enrollment_change().unwrap(), 1);

    let handle = container.open().unwrap();
    let err = handle.get_key("default_key").unwrap_err();
    assert!(err.is_invalidation());
    assert_eq!(handle.get_key("key_not_invalidated").unwrap().material.len(), 32);
}

#[test]
fn test_recreating_invalidated_key_restores_it() {
    let (container, keys) = manager();
    keys.create_key("default_key", true).unwrap();
    container.simulate_enrollment_change().unwrap();

    keys.create_key("default_key", true).unwrap();

    let handle = container.open().unwrap();
    assert!(handle.get_key("default_key").is_ok());
}

#[test]
fn test_delete_key() {
    let (_, keys) = manager();
    keys.create_key("default_key", true).unwrap();

    assert!(keys.delete_key("default_key").unwrap());
    assert!(!keys.delete_key("default_key").unwrap());
    assert!(!keys.has_key("default_key"));
}

#[test]
fn test_record_serializes() {
    let (_, keys) = manager();
    let record = keys.create_key("default_key", false).unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "default_key");
    assert_eq!(json["invalidated_by_new_enrollment"], false);
}
