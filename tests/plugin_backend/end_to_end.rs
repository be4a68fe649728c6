//! The full host/backend scenario against a launched process.

use crate::*;

#[test]
fn test_end_to_end_scenario() {
    let (mut process, store) = launch();

    store.create_table(b"T").unwrap();
    store.set(b"T", b"K", b"V1").unwrap();

    let (value, swapped) = store.cmp_and_swap(b"T", b"K", b"WRONG", b"V2").unwrap();
    assert_eq!(value.as_ref(), b"V1");
    assert!(!swapped);

    let (value, swapped) = store.cmp_and_swap(b"T", b"K", b"V1", b"V2").unwrap();
    assert_eq!(value.as_ref(), b"V2");
    assert!(swapped);

    store.del(b"T", b"K").unwrap();
    assert!(matches!(store.get(b"T", b"K"), Err(Error::KeyNotFound(_))));
    store.delete_table(b"T").unwrap();

    assert!(process.is_running());
    process.kill().unwrap();
    assert!(!process.is_running());
}

#[test]
fn test_storage_errors_cross_the_wire_verbatim() {
    let (mut process, store) = launch();

    let err = store.get(b"never-created", b"k").unwrap_err();
    assert!(matches!(err, Error::BucketNotFound(ref b) if b == "never-created"));
    assert!(!err.is_transport());

    assert!(matches!(
        store.delete_table(b"never-created"),
        Err(Error::BucketNotFound(_))
    ));

    store.create_table(b"T").unwrap();
    store.create_table(b"T").unwrap();

    process.kill().unwrap();
}

#[test]
fn test_list_over_the_wire() {
    let (mut process, store) = launch();
    store.create_table(b"T").unwrap();
    store.set(b"T", b"a", b"1").unwrap();
    store.set(b"T", b"b", b"2").unwrap();

    let mut entries: Vec<(Vec<u8>, Vec<u8>)> = store
        .list(b"T")
        .unwrap()
        .into_iter()
        .map(|e| (e.key.to_vec(), e.value.to_vec()))
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            (b"a".to_vec(), b"1".to_vec()),
            (b"b".to_vec(), b"2".to_vec())
        ]
    );

    process.kill().unwrap();
}
