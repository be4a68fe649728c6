//! # nosql
//!
//! Key/value storage behind one trait, with backends that run either in
//! this process or in a separate executable.
//!
//! ## Quick Start
//!
//! ```
//! use nosql::prelude::*;
//!
//! let db = Database::open("memory://")?;
//! db.create_table(b"users")?;
//! db.set(b"users", b"1", b"alice")?;
//!
//! let mut tx = Transaction::new();
//! tx.get("users", "1").cmp_and_swap("users", "1", "alice", "bob");
//! db.update(&mut tx)?;
//! assert!(tx.operations[1].swapped());
//!
//! db.close()?;
//! # Ok::<(), nosql::Error>(())
//! ```
//!
//! ## Backends
//!
//! | Descriptor | Backend |
//! |------------|---------|
//! | `memory://` | [`MemoryStore`] in this process |
//! | `plugin:///?cmd=/path/to/backend` | executable launched and driven over the plugin protocol |
//!
//! A backend executable is any binary whose `main` calls
//! [`plugin::serve`] with its store; `nosql-memory-backend` is the one
//! shipped here.

#![warn(missing_docs)]

mod database;
mod registry;

pub mod prelude;

pub use database::{Database, DatabaseBuilder};
pub use registry::{BackendFactory, BackendRegistry, OpenedBackend};

pub use nosql_core::{
    apply_transaction, Bytes, Entry, Error, ErrorKind, KvStore, MemoryStore, OpKind, Operation,
    Result, Transaction,
};

/// Out-of-process backends: launch, handshake and dispatch.
pub use nosql_plugin as plugin;

/// Wire messages and framing.
pub use nosql_wire as wire;
