//! Kill handle behavior.

use crate::*;

use std::net::TcpStream;

#[test]
fn test_kill_releases_process_and_endpoint() {
    let (mut process, store) = launch();
    let addr = store.peer_addr();
    let pid = process.pid();

    process.kill().unwrap();
    assert!(!process.is_running());

    #[cfg(target_os = "linux")]
    assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
    let _ = pid;

    assert!(TcpStream::connect_timeout(&addr, Duration::from_secs(1)).is_err());
    assert!(store.get(b"t", b"k").unwrap_err().is_transport());
}

#[test]
fn test_kill_is_idempotent() {
    let (mut process, _store) = launch();
    process.kill().unwrap();
    process.kill().unwrap();
}

#[test]
fn test_drop_kills_backend() {
    let (process, store) = launch();
    let addr = store.peer_addr();
    drop(process);
    assert!(TcpStream::connect_timeout(&addr, Duration::from_secs(1)).is_err());
}
