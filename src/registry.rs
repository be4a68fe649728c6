//! Backend registry.
//!
//! Maps descriptor schemes to factories. The default registry knows:
//!
//! | Scheme | Backend |
//! |--------|---------|
//! | `memory` | in-process [`MemoryStore`] |
//! | `plugin` | out-of-process backend started from the `cmd` parameter |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nosql_core::{Error, KvStore, MemoryStore, Result};
use nosql_plugin::{BackendProcess, ConnectionDescriptor, LaunchConfig, Launcher};

/// A store produced by a factory, with its kill handle if it runs out of process.
pub struct OpenedBackend {
    /// The store
    pub store: Arc<dyn KvStore>,
    /// Backend process to stop on close
    pub process: Option<BackendProcess>,
}

impl std::fmt::Debug for OpenedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedBackend")
            .field("process", &self.process)
            .finish_non_exhaustive()
    }
}

impl OpenedBackend {
    /// An in-process store with nothing to stop.
    pub fn in_process(store: impl KvStore + 'static) -> Self {
        OpenedBackend {
            store: Arc::new(store),
            process: None,
        }
    }
}

/// Builds a backend from a parsed descriptor.
pub type BackendFactory =
    Box<dyn Fn(&ConnectionDescriptor, &LaunchConfig) -> Result<OpenedBackend> + Send + Sync>;

/// Scheme → factory table.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// A registry with no schemes.
    pub fn empty() -> Self {
        BackendRegistry {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` under `scheme`, replacing any previous one.
    pub fn register<F>(&mut self, scheme: &str, factory: F) -> &mut Self
    where
        F: Fn(&ConnectionDescriptor, &LaunchConfig) -> Result<OpenedBackend> + Send + Sync + 'static,
    {
        self.factories
            .insert(scheme.to_ascii_lowercase(), Box::new(factory));
        self
    }

    /// Check if `scheme` is registered.
    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse `descriptor` and build the backend it names.
    pub fn open(&self, descriptor: &str, config: &LaunchConfig) -> Result<OpenedBackend> {
        let descriptor = ConnectionDescriptor::parse(descriptor)?;
        let factory = self.factories.get(descriptor.scheme()).ok_or_else(|| {
            Error::Config(format!(
                "unknown backend scheme {:?} (known: {})",
                descriptor.scheme(),
                self.schemes().join(", ")
            ))
        })?;
        factory(&descriptor, config)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        let mut registry = BackendRegistry::empty();
        registry
            .register("memory", |_, _| Ok(OpenedBackend::in_process(MemoryStore::new())))
            .register("plugin", open_plugin);
        registry
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

fn open_plugin(descriptor: &ConnectionDescriptor, config: &LaunchConfig) -> Result<OpenedBackend> {
    let command = descriptor.launch_command()?;
    let (process, store) = Launcher::new(config.clone()).launch(command)?;
    Ok(OpenedBackend {
        store: Arc::new(store),
        process: Some(process),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schemes() {
        let registry = BackendRegistry::default();
        assert_eq!(registry.schemes(), vec!["memory", "plugin"]);
        assert!(registry.contains("PLUGIN"));
    }

    #[test]
    fn test_memory_backend() {
        let opened = BackendRegistry::default()
            .open("memory://", &LaunchConfig::default())
            .unwrap();
        assert!(opened.process.is_none());
        opened.store.create_table(b"t").unwrap();
    }

    #[test]
    fn test_unknown_scheme() {
        let err = BackendRegistry::default()
            .open("redis://localhost", &LaunchConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("redis")));
    }

    #[test]
    fn test_plugin_without_cmd_spawns_nothing() {
        let err = BackendRegistry::default()
            .open("plugin:///", &LaunchConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("cmd")));
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = BackendRegistry::empty();
        registry.register("scratch", |d, _| {
            let store = MemoryStore::new();
            store.create_table(d.path().as_bytes())?;
            Ok(OpenedBackend::in_process(store))
        });

        let opened = registry.open("scratch:users", &LaunchConfig::default()).unwrap();
        assert!(opened.store.list(b"users").unwrap().is_empty());
        assert!(registry.open("memory://", &LaunchConfig::default()).is_err());
    }
}
