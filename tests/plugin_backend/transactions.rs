//! Update over the wire, including frames a typed client cannot produce.

use crate::*;

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use nosql::plugin::{MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE, PROTOCOL_VERSION, SERVICE_NAME};
use nosql::wire::{
    encode_transaction, read_message, write_message, ErrorCode, HelloRequest, Request, Response,
    TxEntry, UpdateRequest,
};

#[test]
fn test_create_and_set_in_one_update() {
    let (mut process, store) = launch();

    let mut tx = Transaction::new();
    tx.create_table("t").set("t", "k", "v");
    store.update(&mut tx).unwrap();
    assert_eq!(store.get(b"t", b"k").unwrap().as_ref(), b"v");

    process.kill().unwrap();
}

#[test]
fn test_results_and_stop_on_error() {
    let (mut process, store) = launch();
    store.create_table(b"t").unwrap();
    store.set(b"t", b"k", b"v1").unwrap();

    let mut tx = Transaction::new();
    tx.get("t", "k").cmp_and_swap("t", "k", "v1", "v2");
    store.update(&mut tx).unwrap();
    assert_eq!(tx.operations[0].result().map(|v| v.as_ref()), Some(&b"v1"[..]));
    assert!(tx.operations[1].swapped());

    let mut failing = Transaction::new();
    failing
        .set("t", "first", "1")
        .get("t", "missing")
        .set("t", "third", "3");
    assert!(matches!(
        store.update(&mut failing),
        Err(Error::KeyNotFound(_))
    ));
    assert_eq!(store.get(b"t", b"first").unwrap().as_ref(), b"1");
    assert!(store.get(b"t", b"third").is_err());

    process.kill().unwrap();
}

#[test]
fn test_unknown_operation_tag_applies_nothing() {
    let (mut process, store) = launch();

    let stream = TcpStream::connect(store.peer_addr()).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = BufWriter::new(stream);

    write_message(
        &mut writer,
        &Request::Hello(HelloRequest {
            magic_cookie_key: MAGIC_COOKIE_KEY.to_string(),
            magic_cookie_value: MAGIC_COOKIE_VALUE.to_string(),
            protocol_version: PROTOCOL_VERSION,
            service: SERVICE_NAME.to_string(),
        }),
    )
    .unwrap();
    let hello: Option<Response> = read_message(&mut reader).unwrap();
    assert!(matches!(hello, Some(Response::Hello(_))));

    let mut tx = Transaction::new();
    tx.create_table("t").set("t", "k", "v");
    let mut msg = encode_transaction(&tx);
    msg.operations.insert(
        1,
        TxEntry {
            cmd: 99,
            bucket: "t".into(),
            ..Default::default()
        },
    );
    write_message(&mut writer, &Request::Update(UpdateRequest { tx: msg })).unwrap();

    match read_message::<_, Response>(&mut reader).unwrap() {
        Some(Response::Error(e)) => assert_eq!(e.code, ErrorCode::OpNotSupported),
        other => panic!("expected OpNotSupported, got {:?}", other),
    }

    // Neither the operation before nor the one after the unknown tag ran.
    assert!(matches!(store.list(b"t"), Err(Error::BucketNotFound(_))));

    process.kill().unwrap();
}

#[test]
fn test_cmp_or_rollback_mismatch() {
    let (mut process, store) = launch();
    store.create_table(b"t").unwrap();
    store.set(b"t", b"k", b"current").unwrap();

    let mut tx = Transaction::new();
    tx.set("t", "before", "1")
        .get("t", "k")
        .cmp_or_rollback("t", "k", "expected", "new")
        .set("t", "after", "1");
    let err = store.update(&mut tx).unwrap_err();
    assert!(matches!(err, Error::CompareFailed(_)));

    // Results of the executed prefix come back with the error.
    assert_eq!(tx.operations[1].result().map(|v| v.as_ref()), Some(&b"current"[..]));
    assert_eq!(tx.operations[2].result().map(|v| v.as_ref()), Some(&b"current"[..]));
    assert!(!tx.operations[2].swapped());

    assert_eq!(store.get(b"t", b"before").unwrap().as_ref(), b"1");
    assert_eq!(store.get(b"t", b"k").unwrap().as_ref(), b"current");
    assert!(store.get(b"t", b"after").is_err());

    process.kill().unwrap();
}

#[test]
fn test_failed_update_matches_in_process_store() {
    let (mut process, remote) = launch();
    let local = nosql::MemoryStore::new();

    let mut transactions = Vec::new();
    for store in [&remote as &dyn KvStore, &local as &dyn KvStore] {
        store.create_table(b"T").unwrap();
        store.set(b"T", b"K", b"current").unwrap();

        let mut tx = Transaction::new();
        tx.get("T", "K").cmp_or_rollback("T", "K", "expected", "new");
        assert!(matches!(store.update(&mut tx), Err(Error::CompareFailed(_))));
        transactions.push(tx);
    }
    assert_eq!(transactions[0], transactions[1]);

    process.kill().unwrap();
}
