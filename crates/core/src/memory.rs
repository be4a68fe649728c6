//! In-memory reference store
//!
//! Buckets map to shards in a `DashMap`; each shard holds an `FxHashMap`
//! of keys to values. Operations on different buckets never contend, and
//! a compare-and-swap holds its bucket's shard lock from compare to write.

use bytes::Bytes;
use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::store::KvStore;
use crate::types::{display_bytes, Entry};

/// Per-bucket shard
#[derive(Debug, Default)]
struct Shard {
    data: FxHashMap<Bytes, Bytes>,
}

/// Sharded in-memory key/value store.
///
/// # Example
///
/// ```
/// use nosql_core::{KvStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.create_table(b"users").unwrap();
/// store.set(b"users", b"1", b"alice").unwrap();
/// assert_eq!(store.get(b"users", b"1").unwrap().as_ref(), b"alice");
/// ```
#[derive(Default)]
pub struct MemoryStore {
    buckets: DashMap<Bytes, Shard>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of keys across all buckets.
    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|shard| shard.data.len()).sum()
    }

    /// Check if a bucket exists.
    pub fn has_bucket(&self, bucket: &[u8]) -> bool {
        self.buckets.contains_key(bucket)
    }
}

fn bucket_not_found(bucket: &[u8]) -> Error {
    Error::BucketNotFound(display_bytes(bucket))
}

fn key_not_found(key: &[u8]) -> Error {
    Error::KeyNotFound(display_bytes(key))
}

impl KvStore for MemoryStore {
    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Bytes> {
        let shard = self
            .buckets
            .get(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        shard.data.get(key).cloned().ok_or_else(|| key_not_found(key))
    }

    fn set(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<()> {
        let mut shard = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        shard
            .data
            .insert(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn cmp_and_swap(
        &self,
        bucket: &[u8],
        key: &[u8],
        old_value: &[u8],
        new_value: &[u8],
    ) -> Result<(Bytes, bool)> {
        let mut shard = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        let current = shard.data.get_mut(key).ok_or_else(|| key_not_found(key))?;
        if current.as_ref() != old_value {
            return Ok((current.clone(), false));
        }
        let new_value = Bytes::copy_from_slice(new_value);
        *current = new_value.clone();
        Ok((new_value, true))
    }

    fn del(&self, bucket: &[u8], key: &[u8]) -> Result<()> {
        let mut shard = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        shard.data.remove(key);
        Ok(())
    }

    fn list(&self, bucket: &[u8]) -> Result<Vec<Entry>> {
        let shard = self
            .buckets
            .get(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        let bucket = shard.key().clone();
        Ok(shard
            .data
            .iter()
            .map(|(k, v)| Entry {
                bucket: bucket.clone(),
                key: k.clone(),
                value: v.clone(),
            })
            .collect())
    }

    fn create_table(&self, bucket: &[u8]) -> Result<()> {
        if !self.buckets.contains_key(bucket) {
            self.buckets
                .entry(Bytes::copy_from_slice(bucket))
                .or_default();
        }
        Ok(())
    }

    fn delete_table(&self, bucket: &[u8]) -> Result<()> {
        self.buckets
            .remove(bucket)
            .map(|_| ())
            .ok_or_else(|| bucket_not_found(bucket))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("bucket_count", &self.bucket_count())
            .field("total_entries", &self.total_entries())
            .finish()
    }
}
