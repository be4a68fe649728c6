//! Convenient imports for nosql.
//!
//! ```
//! use nosql::prelude::*;
//!
//! let db = Database::open("memory://").unwrap();
//! db.create_table(b"t").unwrap();
//! ```

// Main entry point
pub use crate::database::{Database, DatabaseBuilder};
pub use crate::registry::BackendRegistry;

// Storage contract
pub use nosql_core::{Entry, Error, KvStore, Result, Transaction};

// Launch settings
pub use nosql_plugin::LaunchConfig;
