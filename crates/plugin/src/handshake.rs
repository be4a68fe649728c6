//! Handshake constants and the announcement line.
//!
//! A backend started by the host announces itself with one line on stdout:
//!
//! ```text
//! CORE|APP|NETWORK|ADDRESS|PROTOCOL
//! 1|1|tcp|127.0.0.1:41234|msgpack
//! ```
//!
//! `CORE` is the version of this line format, `APP` the application
//! protocol version, and `PROTOCOL` the message encoding spoken on the
//! connection.

use std::fmt;
use std::net::SocketAddr;

use nosql_core::{Error, Result};
use serde::Deserialize;

/// Application protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the magic cookie.
pub const MAGIC_COOKIE_KEY: &str = "NOSQL_PLUGIN_COOKIE";

/// Expected magic cookie value.
pub const MAGIC_COOKIE_VALUE: &str = "nosql-kv-backend";

/// Well-known name of the storage service.
pub const SERVICE_NAME: &str = "nosql_kv";

/// Version of the announcement line format.
pub const CORE_PROTOCOL_VERSION: u32 = 1;

/// Network type of the announced address.
pub const NETWORK_TCP: &str = "tcp";

/// Encoding spoken on the connection.
pub const WIRE_PROTOCOL: &str = "msgpack";

/// Values both sides must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Application protocol version
    pub protocol_version: u32,
    /// Name of the cookie environment variable
    pub magic_cookie_key: String,
    /// Value of the cookie
    pub magic_cookie_value: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        HandshakeConfig {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: MAGIC_COOKIE_KEY.to_string(),
            magic_cookie_value: MAGIC_COOKIE_VALUE.to_string(),
        }
    }
}

impl HandshakeConfig {
    /// Set the application protocol version.
    pub fn protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }

    /// Set the cookie key and value.
    pub fn magic_cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.magic_cookie_key = key.into();
        self.magic_cookie_value = value.into();
        self
    }

    /// Check that the cookie is present in this process's environment.
    ///
    /// Backends call this first; a process started by hand fails here.
    pub fn check_environment(&self) -> Result<()> {
        match std::env::var(&self.magic_cookie_key) {
            Ok(value) if value == self.magic_cookie_value => Ok(()),
            _ => Err(Error::Config(format!(
                "this binary is a nosql storage backend and is meant to be launched by a host; \
                 {} is not set to the expected value",
                self.magic_cookie_key
            ))),
        }
    }
}

/// Parsed announcement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeLine {
    /// Line format version
    pub core_version: u32,
    /// Application protocol version
    pub app_version: u32,
    /// Network type, always `tcp` here
    pub network: String,
    /// Address the backend listens on
    pub address: SocketAddr,
    /// Connection encoding
    pub protocol: String,
}

impl HandshakeLine {
    /// Line announcing `address` for the given protocol version.
    pub fn new(app_version: u32, address: SocketAddr) -> Self {
        HandshakeLine {
            core_version: CORE_PROTOCOL_VERSION,
            app_version,
            network: NETWORK_TCP.to_string(),
            address,
            protocol: WIRE_PROTOCOL.to_string(),
        }
    }

    /// Parse a line as printed by a backend.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.trim().split('|').collect();
        if parts.len() != 5 {
            return Err(Error::Launch(format!(
                "unrecognized handshake line: {:?}",
                line.trim()
            )));
        }
        let number = |field: &str, what: &str| -> Result<u32> {
            field
                .parse()
                .map_err(|_| Error::Launch(format!("invalid {} in handshake: {:?}", what, field)))
        };
        Ok(HandshakeLine {
            core_version: number(parts[0], "core version")?,
            app_version: number(parts[1], "protocol version")?,
            network: parts[2].to_string(),
            address: parts[3].parse().map_err(|_| {
                Error::Launch(format!("invalid address in handshake: {:?}", parts[3]))
            })?,
            protocol: parts[4].to_string(),
        })
    }

    /// Reject a line this host cannot talk to.
    pub fn validate(&self, config: &HandshakeConfig) -> Result<()> {
        if self.core_version != CORE_PROTOCOL_VERSION {
            return Err(Error::Launch(format!(
                "incompatible core protocol version: backend {}, host {}",
                self.core_version, CORE_PROTOCOL_VERSION
            )));
        }
        if self.app_version != config.protocol_version {
            return Err(Error::Launch(format!(
                "incompatible protocol version: backend {}, host {}",
                self.app_version, config.protocol_version
            )));
        }
        if self.network != NETWORK_TCP {
            return Err(Error::Launch(format!(
                "unsupported network type: {}",
                self.network
            )));
        }
        if self.protocol != WIRE_PROTOCOL {
            return Err(Error::Launch(format!(
                "unsupported wire protocol: {}",
                self.protocol
            )));
        }
        Ok(())
    }
}

impl fmt::Display for HandshakeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.core_version, self.app_version, self.network, self.address, self.protocol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let line = HandshakeLine::new(1, "127.0.0.1:41234".parse().unwrap());
        assert_eq!(line.to_string(), "1|1|tcp|127.0.0.1:41234|msgpack");
        assert_eq!(HandshakeLine::parse("1|1|tcp|127.0.0.1:41234|msgpack\n").unwrap(), line);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(HandshakeLine::parse("hello world").is_err());
        assert!(HandshakeLine::parse("x|1|tcp|127.0.0.1:1|msgpack").is_err());
        assert!(HandshakeLine::parse("1|1|tcp|not-an-addr|msgpack").is_err());
    }

    #[test]
    fn test_validate_checks_every_field() {
        let config = HandshakeConfig::default();
        let good = HandshakeLine::new(PROTOCOL_VERSION, "127.0.0.1:1".parse().unwrap());
        good.validate(&config).unwrap();

        let mut core = good.clone();
        core.core_version = 2;
        assert!(core.validate(&config).is_err());

        let err = good.validate(&config.clone().protocol_version(2)).unwrap_err();
        assert!(err.to_string().contains("incompatible protocol version"));

        let mut unix = good.clone();
        unix.network = "unix".into();
        assert!(unix.validate(&config).is_err());

        let mut grpc = good;
        grpc.protocol = "grpc".into();
        assert!(grpc.validate(&config).is_err());
    }

    #[test]
    fn test_check_environment_without_cookie() {
        let config = HandshakeConfig::default().magic_cookie("NOSQL_TEST_COOKIE_UNSET_8127", "x");
        let err = config.check_environment().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
