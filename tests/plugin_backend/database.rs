//! Database facade over a plugin descriptor.

use crate::*;

#[test]
fn test_open_plugin_descriptor() {
    let db = Database::builder()
        .launch_config(test_config())
        .open(&plugin_descriptor())
        .unwrap();
    assert!(db.backend_pid().is_some());

    db.create_table(b"users").unwrap();
    db.set(b"users", b"1", b"alice").unwrap();
    assert_eq!(db.get(b"users", b"1").unwrap().as_ref(), b"alice");

    db.close().unwrap();
    assert!(db.backend_pid().is_none());
    assert!(db.get(b"users", b"1").unwrap_err().is_transport());
    db.close().unwrap();
}

#[test]
fn test_missing_cmd_is_config_error() {
    let err = Database::open("plugin:///?verbose=1").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_same_operations_in_and_out_of_process() {
    let remote = Database::builder()
        .launch_config(test_config())
        .open(&plugin_descriptor())
        .unwrap();
    let local = Database::open("memory://").unwrap();

    for db in [&remote, &local] {
        db.create_table(b"t").unwrap();
        db.set(b"t", b"k", b"v").unwrap();
        let (value, swapped) = db.cmp_and_swap(b"t", b"k", b"x", b"y").unwrap();
        assert_eq!((value.as_ref(), swapped), (&b"v"[..], false));
        assert!(matches!(db.get(b"nope", b"k"), Err(Error::BucketNotFound(_))));
    }

    remote.close().unwrap();
    local.close().unwrap();
}
