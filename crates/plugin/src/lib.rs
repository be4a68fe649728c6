//! Out-of-process storage backends for nosql
//!
//! A backend is a separate executable that serves a [`KvStore`] over a
//! loopback TCP connection. This crate holds both ends:
//!
//! - Host: [`Launcher`] spawns the executable, reads its announcement line,
//!   connects and returns a [`RemoteStore`] plus a [`BackendProcess`] kill
//!   handle. [`ConnectionDescriptor`] parses `plugin:///?cmd=...` strings.
//! - Backend: [`serve`] checks the magic cookie, announces the listening
//!   address and runs a [`DispatchServer`] per connection.
//!
//! Both ends agree on a [`HandshakeConfig`]: the cookie, exported to the
//! child's environment, and the protocol version, checked on the
//! announcement line and again in `Hello`.
//!
//! [`KvStore`]: nosql_core::KvStore

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod config;
mod descriptor;
mod handshake;
mod launch;
mod server;

pub use client::RemoteStore;
pub use config::{LaunchConfig, DEFAULT_START_TIMEOUT};
pub use descriptor::{ConnectionDescriptor, CMD_PARAM};
pub use handshake::{
    HandshakeConfig, HandshakeLine, CORE_PROTOCOL_VERSION, MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE,
    NETWORK_TCP, PROTOCOL_VERSION, SERVICE_NAME, WIRE_PROTOCOL,
};
pub use launch::{BackendProcess, Launcher};
pub use server::{serve, serve_listener, DispatchServer, ServeConfig};
