//! Launch failures against the real backend.

use crate::*;

use nosql::plugin::HandshakeConfig;

#[test]
fn test_cookie_mismatch_backend_refuses_to_start() {
    let config = test_config()
        .handshake(HandshakeConfig::default().magic_cookie("NOSQL_PLUGIN_COOKIE", "not-it"));
    let err = Launcher::new(config).launch(backend_path()).unwrap_err();
    assert!(
        matches!(err, Error::Launch(ref m) if m.contains("exited before completing the handshake")),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_version_mismatch() {
    let config = test_config().handshake(HandshakeConfig::default().protocol_version(2));
    let err = Launcher::new(config).launch(backend_path()).unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("incompatible protocol version")));
}

#[test]
fn test_service_not_advertised() {
    let err = Launcher::new(test_config().service("kms"))
        .launch(backend_path())
        .unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("service not found")));
}

#[test]
fn test_arguments_are_passed_through() {
    // The memory backend ignores its arguments; whitespace splitting must
    // still find the executable.
    let command = format!("{}   --unused  flag", backend_path());
    let (mut process, store) = Launcher::new(test_config()).launch(&command).unwrap();
    store.create_table(b"t").unwrap();
    process.kill().unwrap();
}
