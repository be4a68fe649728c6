//! Plugin Backend Integration Tests
//!
//! Launches the real `nosql-memory-backend` executable and drives it through
//! the host-side API: launcher, remote store, registry and database facade.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test plugin_backend
//!
//! # Only the end-to-end scenario
//! cargo test --test plugin_backend end_to_end::
//! ```

use std::time::Duration;

use nosql::plugin::{BackendProcess, LaunchConfig, Launcher, RemoteStore};
use nosql::prelude::*;

mod database;
mod end_to_end;
mod handshake;
mod lifecycle;
mod transactions;

fn backend_path() -> &'static str {
    env!("CARGO_BIN_EXE_nosql-memory-backend")
}

/// Percent-encode a command for use as the `cmd` query value.
fn encode_param(value: &str) -> String {
    let mut out = String::new();
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn plugin_descriptor() -> String {
    format!("plugin:///?cmd={}", encode_param(backend_path()))
}

fn test_config() -> LaunchConfig {
    LaunchConfig::default().call_timeout(Duration::from_secs(10))
}

fn launch() -> (BackendProcess, RemoteStore) {
    Launcher::new(test_config()).launch(backend_path()).unwrap()
}
