use super::support::*;
use crate::registry::{ContractRegistry, InMemoryRegistry, RegistryError};
use crate::types::{Address, RegistryEnrollment};
use serde_json::json;

fn entry(name: &str, major: u32, addr: u8) -> RegistryEnrollment {
    RegistryEnrollment::new(name, v(major), Address([addr; 20]), json!([]))
}

fn seeded() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    for e in [
        entry(X, 1, 1),
        entry("Dispatcher", 1, 2),
        entry(Y, 1, 3),
        entry(X, 2, 4),
        entry(X, 1, 1),
    ] {
        registry.append(e).unwrap();
    }
    registry
}

#[test]
fn test_append_order_is_kept() {
    let registry = seeded();
    let addrs: Vec<u8> = registry.all().unwrap().iter().map(|e| e.address.0[0]).collect();
    assert_eq!(addrs, vec![1, 2, 3, 4, 1]);
}

#[test]
fn test_search_is_an_ordered_subsequence() {
    let registry = seeded();
    let all = registry.all().unwrap();

    let xs = registry.search(Some(X), None).unwrap();
    assert_eq!(xs, vec![all[0].clone(), all[3].clone(), all[4].clone()]);

    let at_one = registry.search(None, Some(&Address([1; 20]))).unwrap();
    assert_eq!(at_one, vec![all[0].clone(), all[4].clone()]);

    assert_eq!(registry.search(None, None).unwrap(), all);
    assert!(registry.search(Some(Y), Some(&Address([1; 20]))).unwrap().is_empty());
}

#[test]
fn test_current_is_last_not_highest() {
    let registry = seeded();
    // After a rollback the newest record carries the lower version.
    assert_eq!(registry.current(X).unwrap(), Some(entry(X, 1, 1)));
    assert_eq!(registry.previous(X).unwrap(), Some(entry(X, 2, 4)));

    assert_eq!(registry.current(Y).unwrap(), Some(entry(Y, 1, 3)));
    assert_eq!(registry.previous(Y).unwrap(), None);
    assert_eq!(registry.current("Nope").unwrap(), None);
}

#[test]
fn test_retried_append_is_a_duplicate() {
    let mut registry = seeded();
    let err = registry.append(entry(X, 1, 1)).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateEnrollment { ref name, .. } if name == X));
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_reenrolling_an_older_address_is_allowed() {
    let mut registry = seeded();
    registry.append(entry(X, 2, 4)).unwrap();
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.current(X).unwrap(), Some(entry(X, 2, 4)));
}

#[test]
fn test_same_address_under_another_name_is_not_a_duplicate() {
    let mut registry = seeded();
    registry.append(entry(Y, 1, 1)).unwrap();
    assert_eq!(registry.search(None, Some(&Address([1; 20]))).unwrap().len(), 3);
}
