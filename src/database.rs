//! Main entry point for nosql.
//!
//! A [`Database`] binds one [`KvStore`] chosen by a connection descriptor
//! and forwards every storage call to it. Whether the store runs in this
//! process or in a launched backend is invisible to callers, except that
//! [`Database::close`] also stops the backend.

use std::sync::Arc;

use bytes::Bytes;
use nosql_core::{Entry, KvStore, Result, Transaction};
use nosql_plugin::{BackendProcess, LaunchConfig};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::registry::{BackendRegistry, OpenedBackend};

/// A key/value database bound to one backend.
///
/// # Example
///
/// ```
/// use nosql::prelude::*;
///
/// let db = Database::open("memory://").unwrap();
/// db.create_table(b"users").unwrap();
/// db.set(b"users", b"1", b"alice").unwrap();
/// assert_eq!(db.get(b"users", b"1").unwrap().as_ref(), b"alice");
/// db.close().unwrap();
/// ```
pub struct Database {
    store: Arc<dyn KvStore>,
    process: Mutex<Option<BackendProcess>>,
}

impl Database {
    /// Open the backend named by `descriptor` using the default registry.
    pub fn open(descriptor: &str) -> Result<Self> {
        Self::builder().open(descriptor)
    }

    /// Open the backend named by `descriptor` using `registry`.
    pub fn open_with(descriptor: &str, registry: &BackendRegistry) -> Result<Self> {
        let opened = registry.open(descriptor, &LaunchConfig::default())?;
        Ok(Self::from_opened(opened))
    }

    /// Wrap an existing store.
    pub fn from_store(store: impl KvStore + 'static) -> Self {
        Self::from_opened(OpenedBackend::in_process(store))
    }

    /// Create a builder for registry and launch settings.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    fn from_opened(opened: OpenedBackend) -> Self {
        if let Some(process) = &opened.process {
            info!(pid = process.pid(), "database bound to backend process");
        }
        Database {
            store: opened.store,
            process: Mutex::new(opened.process),
        }
    }

    /// The bound store.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Process id of the backend, for out-of-process stores that are still open.
    pub fn backend_pid(&self) -> Option<u32> {
        self.process.lock().as_ref().map(BackendProcess::pid)
    }

    /// Stop the backend process, if there is one.
    ///
    /// Later storage calls on an out-of-process store fail with a transport
    /// error. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        match self.process.lock().take() {
            Some(mut process) => {
                debug!(pid = process.pid(), "closing backend");
                process.kill()
            }
            None => Ok(()),
        }
    }
}

impl KvStore for Database {
    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Bytes> {
        self.store.get(bucket, key)
    }

    fn set(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<()> {
        self.store.set(bucket, key, value)
    }

    fn cmp_and_swap(
        &self,
        bucket: &[u8],
        key: &[u8],
        old_value: &[u8],
        new_value: &[u8],
    ) -> Result<(Bytes, bool)> {
        self.store.cmp_and_swap(bucket, key, old_value, new_value)
    }

    fn del(&self, bucket: &[u8], key: &[u8]) -> Result<()> {
        self.store.del(bucket, key)
    }

    fn list(&self, bucket: &[u8]) -> Result<Vec<Entry>> {
        self.store.list(bucket)
    }

    fn update(&self, tx: &mut Transaction) -> Result<()> {
        self.store.update(tx)
    }

    fn create_table(&self, bucket: &[u8]) -> Result<()> {
        self.store.create_table(bucket)
    }

    fn delete_table(&self, bucket: &[u8]) -> Result<()> {
        self.store.delete_table(bucket)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("backend_pid", &self.backend_pid())
            .finish()
    }
}

/// Builder for database configuration.
///
/// ```no_run
/// use nosql::prelude::*;
/// use std::time::Duration;
///
/// let db = Database::builder()
///     .launch_config(LaunchConfig::default().call_timeout(Duration::from_secs(2)))
///     .open("plugin:///?cmd=/usr/local/bin/nosql-memory-backend")
///     .unwrap();
/// ```
#[derive(Default)]
pub struct DatabaseBuilder {
    registry: Option<BackendRegistry>,
    launch_config: LaunchConfig,
}

impl DatabaseBuilder {
    /// Builder with the default registry and launch settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` instead of the default one.
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Launch settings for out-of-process backends.
    pub fn launch_config(mut self, config: LaunchConfig) -> Self {
        self.launch_config = config;
        self
    }

    /// Open the backend named by `descriptor`.
    pub fn open(self, descriptor: &str) -> Result<Database> {
        let registry = self.registry.unwrap_or_default();
        let opened = registry.open(descriptor, &self.launch_config)?;
        Ok(Database::from_opened(opened))
    }
}
