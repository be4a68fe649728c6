//! Hello exchange between host and server.

use crate::*;

use nosql_plugin::{HandshakeConfig, SERVICE_NAME};

#[test]
fn test_connect_reports_services() {
    let store = connect_default();
    assert_eq!(store.services(), &[SERVICE_NAME.to_string()]);
}

#[test]
fn test_cookie_mismatch_is_launch_error() {
    let addr = start_server(ServeConfig::default());
    let config = LaunchConfig::default()
        .handshake(HandshakeConfig::default().magic_cookie("NOSQL_PLUGIN_COOKIE", "wrong"));

    let err = RemoteStore::connect(addr, &config).unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("cookie")));
}

#[test]
fn test_version_mismatch_is_launch_error() {
    let addr = start_server(ServeConfig::default());
    let config = LaunchConfig::default().handshake(HandshakeConfig::default().protocol_version(2));

    let err = RemoteStore::connect(addr, &config).unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("protocol version")));
}

#[test]
fn test_unknown_service_is_launch_error() {
    let addr = start_server(ServeConfig::default());
    let config = LaunchConfig::default().service("kms");

    let err = RemoteStore::connect(addr, &config).unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("service not found")));
}

#[test]
fn test_custom_service_list() {
    let addr = start_server(ServeConfig {
        services: vec!["kv_v2".to_string()],
        ..ServeConfig::default()
    });
    let store = RemoteStore::connect(addr, &LaunchConfig::default().service("kv_v2")).unwrap();
    store.create_table(b"t").unwrap();
}
