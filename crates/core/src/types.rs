//! Shared value types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One `(bucket, key, value)` triple returned by [`KvStore::list`].
///
/// Entries are read projections only; nothing is ever written as an `Entry`.
///
/// [`KvStore::list`]: crate::KvStore::list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Bucket the entry was read from
    pub bucket: Bytes,
    /// Key within the bucket
    pub key: Bytes,
    /// Stored value
    pub value: Bytes,
}

impl Entry {
    /// Create a new entry.
    pub fn new(bucket: impl Into<Bytes>, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Render an opaque byte string for error messages and logs.
pub fn display_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_bytes_lossy() {
        assert_eq!(display_bytes(b"users"), "users");
        assert_eq!(display_bytes(&[0x61, 0xff]), "a\u{fffd}");
    }

    #[test]
    fn test_entry_new() {
        let e = Entry::new(&b"b"[..], &b"k"[..], &b"v"[..]);
        assert_eq!(e.bucket, Bytes::from_static(b"b"));
        assert_eq!(e.value.as_ref(), b"v");
    }
}
