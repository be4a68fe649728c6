//! Host-side launch configuration.
//!
//! ```toml
//! service = "nosql_kv"
//! start_timeout_ms = 5000
//! call_timeout_ms = 2000
//!
//! [handshake]
//! protocol_version = 1
//! magic_cookie_key = "NOSQL_PLUGIN_COOKIE"
//! magic_cookie_value = "nosql-kv-backend"
//! ```

use std::path::Path;
use std::time::Duration;

use nosql_core::{Error, Result};
use serde::Deserialize;

use crate::handshake::{HandshakeConfig, SERVICE_NAME};

/// Default time allowed for a backend to announce itself.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(10);

/// How a host launches and talks to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Handshake values sent to the backend
    pub handshake: HandshakeConfig,
    /// Service to bind the connection to
    pub service: String,
    /// Deadline for spawn, announcement and `Hello`
    #[serde(rename = "start_timeout_ms", with = "millis")]
    pub start_timeout: Duration,
    /// Per-call read/write deadline; `None` waits indefinitely
    #[serde(rename = "call_timeout_ms", with = "opt_millis")]
    pub call_timeout: Option<Duration>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            handshake: HandshakeConfig::default(),
            service: SERVICE_NAME.to_string(),
            start_timeout: DEFAULT_START_TIMEOUT,
            call_timeout: None,
        }
    }
}

impl LaunchConfig {
    /// Parse from TOML text; missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("invalid launch config: {}", e)))
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Set the handshake values.
    pub fn handshake(mut self, handshake: HandshakeConfig) -> Self {
        self.handshake = handshake;
        self
    }

    /// Set the requested service.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the start deadline.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Set a per-call deadline.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
