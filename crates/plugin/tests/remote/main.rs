//! Remote Store Integration Tests
//!
//! Runs a dispatch server in-process on a loopback listener and talks to
//! it through `RemoteStore`, so the full request/response path is
//! exercised without spawning a backend binary.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nosql-plugin --test remote
//! ```

use std::net::{SocketAddr, TcpListener};
use std::thread;

use nosql_core::{Error, KvStore, MemoryStore, Transaction};
use nosql_plugin::{serve_listener, LaunchConfig, RemoteStore, ServeConfig};

mod handshake;
mod launch_failures;
mod remote_ops;

/// Start a server on an ephemeral port and return its address.
fn start_server(config: ServeConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let _ = serve_listener(listener, MemoryStore::new(), config);
    });
    addr
}

fn connect_default() -> RemoteStore {
    let addr = start_server(ServeConfig::default());
    RemoteStore::connect(addr, &LaunchConfig::default()).unwrap()
}
