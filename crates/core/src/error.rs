//! Unified error type for nosql.
//!
//! Every layer (in-process store, wire codec, plugin launch and transport)
//! reports through this one enum so a host can tell "key not found" from
//! "channel broken" without knowing which backend it is talking to.

use thiserror::Error;

/// All nosql errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration (e.g. descriptor without `cmd`)
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend could not be started or failed the handshake
    #[error("launch failed: {0}")]
    Launch(String),

    /// Channel to the backend is broken, closed or timed out
    #[error("transport error: {0}")]
    Transport(String),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Peer sent a well-formed but unexpected message
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Operation kind is unknown to, or not handled by, the backend
    #[error("operation not supported: {0}")]
    OpNotSupported(String),

    /// Bucket does not exist
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Key does not exist in the bucket
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A `CmpOrRollback` operation saw a value other than the expected one
    #[error("compare failed: {0}")]
    CompareFailed(String),

    /// Any other error reported by a storage backend
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for nosql operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration
    Configuration,
    /// Spawn or handshake failure
    Launch,
    /// Broken channel, malformed message, timeout
    Transport,
    /// Error produced by the storage engine itself
    Storage,
    /// Unsupported or unknown operation kind
    Protocol,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Launch(_) => ErrorKind::Launch,
            Error::Transport(_) | Error::Io(_) | Error::Serialization(_) => ErrorKind::Transport,
            Error::Protocol(_) | Error::OpNotSupported(_) => ErrorKind::Protocol,
            Error::BucketNotFound(_)
            | Error::KeyNotFound(_)
            | Error::CompareFailed(_)
            | Error::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Check if this is a bucket-not-found or key-not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BucketNotFound(_) | Error::KeyNotFound(_))
    }

    /// Check if the channel to the backend failed.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if this is an "operation not supported" error.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::OpNotSupported(_))
    }
}
