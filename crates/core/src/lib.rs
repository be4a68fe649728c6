//! Core types for nosql
//!
//! This crate defines the storage contract shared by every backend:
//!
//! - [`KvStore`]: the eight storage operations (point reads and writes,
//!   compare-and-swap, listing, table lifecycle and batched transactions)
//! - [`Operation`] / [`Transaction`]: an ordered batch submitted through
//!   [`KvStore::update`]
//! - [`Error`]: the error space callers see, whether the backend runs
//!   in-process or behind the plugin protocol
//! - [`MemoryStore`]: a sharded in-memory reference backend
//!
//! Buckets, keys and values are opaque byte strings ([`bytes::Bytes`]).
//! Bucket identity is exact byte equality.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod operation;
pub mod store;
pub mod txn;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use memory::MemoryStore;
pub use operation::{OpKind, Operation, Transaction};
pub use store::KvStore;
pub use txn::apply_transaction;
pub use types::{display_bytes, Entry};

pub use bytes::Bytes;
