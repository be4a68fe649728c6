//! Launch failures: every one is reported and leaves no process behind.

use crate::*;

use std::time::{Duration, Instant};

use nosql_plugin::Launcher;

#[test]
fn test_empty_command_is_config_error() {
    let err = Launcher::default().launch("   ").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_missing_executable() {
    let err = Launcher::default()
        .launch("/nonexistent/nosql-backend --flag")
        .unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("failed to start")));
}

#[cfg(unix)]
#[test]
fn test_exit_before_handshake() {
    let err = Launcher::default().launch("true").unwrap_err();
    assert!(
        matches!(err, Error::Launch(ref m) if m.contains("exited before completing the handshake")),
        "unexpected error: {:?}",
        err
    );
}

#[cfg(unix)]
#[test]
fn test_garbage_announcement() {
    let err = Launcher::default().launch("echo hello").unwrap_err();
    assert!(matches!(err, Error::Launch(ref m) if m.contains("handshake line")));
}

#[cfg(unix)]
#[test]
fn test_start_timeout() {
    let launcher =
        Launcher::new(LaunchConfig::default().start_timeout(Duration::from_millis(200)));
    let started = Instant::now();
    let err = launcher.launch("sleep 30").unwrap_err();

    assert!(matches!(err, Error::Launch(ref m) if m.contains("timed out")));
    // The sleeping child was killed rather than waited out.
    assert!(started.elapsed() < Duration::from_secs(10));
}
