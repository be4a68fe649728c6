//! Errors carried inside a `Response::Error`.
//!
//! A backend error crosses the wire as a code plus the variant's payload
//! message, and is rebuilt on the host into the same [`Error`] variant.
//! Host-side code therefore sees `BucketNotFound("users")` whether the
//! store runs in-process or behind a plugin.

use std::fmt;

use nosql_core::Error;
use serde::{Deserialize, Serialize};

/// Error classification on the wire; one code per [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ErrorCode {
    Config,
    Launch,
    Transport,
    Io,
    Serialization,
    Protocol,
    OpNotSupported,
    BucketNotFound,
    KeyNotFound,
    CompareFailed,
    Storage,
}

/// Error as sent by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    /// Variant of the source error
    pub code: ErrorCode,
    /// Payload of the source error
    pub message: String,
}

impl WireError {
    /// Build a wire error from its parts.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        WireError {
            code,
            message: message.into(),
        }
    }

    /// Rebuild the host-side error.
    pub fn into_error(self) -> Error {
        let WireError { code, message } = self;
        match code {
            ErrorCode::Config => Error::Config(message),
            ErrorCode::Launch => Error::Launch(message),
            ErrorCode::Transport => Error::Transport(message),
            ErrorCode::Io => Error::Io(std::io::Error::new(std::io::ErrorKind::Other, message)),
            ErrorCode::Serialization => Error::Serialization(message),
            ErrorCode::Protocol => Error::Protocol(message),
            ErrorCode::OpNotSupported => Error::OpNotSupported(message),
            ErrorCode::BucketNotFound => Error::BucketNotFound(message),
            ErrorCode::KeyNotFound => Error::KeyNotFound(message),
            ErrorCode::CompareFailed => Error::CompareFailed(message),
            ErrorCode::Storage => Error::Storage(message),
        }
    }
}

impl From<&Error> for WireError {
    fn from(err: &Error) -> Self {
        let (code, message) = match err {
            Error::Config(m) => (ErrorCode::Config, m.clone()),
            Error::Launch(m) => (ErrorCode::Launch, m.clone()),
            Error::Transport(m) => (ErrorCode::Transport, m.clone()),
            Error::Io(e) => (ErrorCode::Io, e.to_string()),
            Error::Serialization(m) => (ErrorCode::Serialization, m.clone()),
            Error::Protocol(m) => (ErrorCode::Protocol, m.clone()),
            Error::OpNotSupported(m) => (ErrorCode::OpNotSupported, m.clone()),
            Error::BucketNotFound(m) => (ErrorCode::BucketNotFound, m.clone()),
            Error::KeyNotFound(m) => (ErrorCode::KeyNotFound, m.clone()),
            Error::CompareFailed(m) => (ErrorCode::CompareFailed, m.clone()),
            Error::Storage(m) => (ErrorCode::Storage, m.clone()),
        };
        WireError { code, message }
    }
}

impl From<Error> for WireError {
    fn from(err: Error) -> Self {
        WireError::from(&err)
    }
}

impl From<WireError> for Error {
    fn from(err: WireError) -> Self {
        err.into_error()
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
