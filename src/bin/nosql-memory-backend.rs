//! Storage backend serving an in-memory store.
//!
//! Not meant to be run by hand: a host launches it with the magic cookie
//! in the environment and reads the announcement line from stdout. Logs go
//! to stderr, filtered by `RUST_LOG` (default `info`).

use nosql_core::MemoryStore;
use nosql_plugin::{serve, ServeConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = serve(MemoryStore::new(), ServeConfig::default()) {
        eprintln!("nosql-memory-backend: {}", e);
        std::process::exit(1);
    }
}
