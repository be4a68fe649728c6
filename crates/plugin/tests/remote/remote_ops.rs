//! Storage operations through a remote store.

use crate::*;

use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// POINT OPERATIONS
// =============================================================================

#[test]
fn test_set_get_del() {
    let store = connect_default();
    store.create_table(b"T").unwrap();
    store.set(b"T", b"K", b"V1").unwrap();
    assert_eq!(store.get(b"T", b"K").unwrap().as_ref(), b"V1");

    store.del(b"T", b"K").unwrap();
    assert!(matches!(store.get(b"T", b"K"), Err(Error::KeyNotFound(_))));
}

#[test]
fn test_errors_keep_their_variant() {
    let store = connect_default();
    let err = store.get(b"missing", b"k").unwrap_err();
    assert!(matches!(err, Error::BucketNotFound(ref b) if b == "missing"));
    assert!(err.is_not_found());

    assert!(matches!(
        store.delete_table(b"missing"),
        Err(Error::BucketNotFound(_))
    ));
}

#[test]
fn test_binary_keys_and_values() {
    let store = connect_default();
    let key = [0u8, 255, 10, 13];
    let value: Vec<u8> = (0..=255).collect();
    store.create_table(b"bin").unwrap();
    store.set(b"bin", &key, &value).unwrap();
    assert_eq!(store.get(b"bin", &key).unwrap().as_ref(), value.as_slice());
}

#[test]
fn test_cmp_and_swap() {
    let store = connect_default();
    store.create_table(b"T").unwrap();
    store.set(b"T", b"K", b"V1").unwrap();

    let (value, swapped) = store.cmp_and_swap(b"T", b"K", b"WRONG", b"V2").unwrap();
    assert_eq!(value.as_ref(), b"V1");
    assert!(!swapped);

    let (value, swapped) = store.cmp_and_swap(b"T", b"K", b"V1", b"V2").unwrap();
    assert_eq!(value.as_ref(), b"V2");
    assert!(swapped);
    assert_eq!(store.get(b"T", b"K").unwrap().as_ref(), b"V2");
}

#[test]
fn test_list() {
    let store = connect_default();
    store.create_table(b"T").unwrap();
    store.set(b"T", b"a", b"1").unwrap();
    store.set(b"T", b"b", b"2").unwrap();

    let keys: HashSet<Vec<u8>> = store
        .list(b"T")
        .unwrap()
        .into_iter()
        .map(|e| e.key.to_vec())
        .collect();
    assert_eq!(keys, HashSet::from([b"a".to_vec(), b"b".to_vec()]));
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[test]
fn test_update_results_reach_caller() {
    let store = connect_default();
    let mut tx = Transaction::new();
    tx.create_table("T")
        .set("T", "K", "V1")
        .get("T", "K")
        .cmp_and_swap("T", "K", "V1", "V2");

    store.update(&mut tx).unwrap();
    assert_eq!(tx.operations[2].result().map(|v| v.as_ref()), Some(&b"V1"[..]));
    assert!(tx.operations[3].swapped());
    assert_eq!(store.get(b"T", b"K").unwrap().as_ref(), b"V2");
}

#[test]
fn test_update_stops_at_first_error() {
    let store = connect_default();
    let mut tx = Transaction::new();
    tx.create_table("A").set("missing", "k", "v").create_table("B");

    assert!(matches!(
        store.update(&mut tx),
        Err(Error::BucketNotFound(_))
    ));
    assert!(store.list(b"A").is_ok());
    assert!(store.list(b"B").is_err());
}

#[test]
fn test_cmp_or_rollback_mismatch_is_compare_failed() {
    let store = connect_default();
    store.create_table(b"T").unwrap();
    store.set(b"T", b"K", b"current").unwrap();

    let mut tx = Transaction::new();
    tx.cmp_or_rollback("T", "K", "expected", "new")
        .set("T", "after", "1");
    assert!(matches!(
        store.update(&mut tx),
        Err(Error::CompareFailed(_))
    ));
    assert!(store.get(b"T", b"after").is_err());
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_shared_store_across_threads() {
    let store = Arc::new(connect_default());
    store.create_table(b"T").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..25 {
                    let key = format!("{}-{}", i, j);
                    store.set(b"T", key.as_bytes(), b"x").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.list(b"T").unwrap().len(), 100);
}

#[test]
fn test_connections_share_one_store() {
    let addr = start_server(ServeConfig::default());
    let first = RemoteStore::connect(addr, &LaunchConfig::default()).unwrap();
    let second = RemoteStore::connect(addr, &LaunchConfig::default()).unwrap();

    first.create_table(b"T").unwrap();
    first.set(b"T", b"K", b"V").unwrap();
    assert_eq!(second.get(b"T", b"K").unwrap().as_ref(), b"V");
}

#[test]
fn test_calls_after_shutdown_are_transport_errors() {
    let store = connect_default();
    store.create_table(b"T").unwrap();
    store.shutdown();

    let err = store.get(b"T", b"K").unwrap_err();
    assert!(err.is_transport(), "unexpected error: {:?}", err);
}

// =============================================================================
// FRAME LIMITS
// =============================================================================

#[test]
fn test_oversized_value_keeps_connection_usable() {
    let store = connect_default();
    store.create_table(b"T").unwrap();

    let big = vec![0u8; nosql_wire::MAX_FRAME_SIZE + 1];
    let err = store.set(b"T", b"big", &big).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)), "unexpected error: {:?}", err);

    store.set(b"T", b"small", b"v").unwrap();
    assert_eq!(store.get(b"T", b"small").unwrap().as_ref(), b"v");
    assert!(store.get(b"T", b"big").is_err());
}
