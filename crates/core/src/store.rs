//! The storage contract.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::operation::Transaction;
use crate::txn::apply_transaction;
use crate::types::Entry;

/// Storage operations every backend provides.
///
/// Implementations may live in-process ([`MemoryStore`]) or on the other
/// side of the plugin protocol. Callers cannot tell the difference: errors
/// are reported in the same [`Error`] space either way.
///
/// Buckets must exist before keys are read or written in them.
///
/// [`MemoryStore`]: crate::MemoryStore
/// [`Error`]: crate::Error
pub trait KvStore: Send + Sync {
    /// Return the value stored under `key` in `bucket`.
    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Bytes>;

    /// Store `value` under `key` in `bucket`.
    fn set(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<()>;

    /// Replace the value under `key` with `new_value` if it currently equals `old_value`.
    ///
    /// Returns `(new_value, true)` when the swap happened and
    /// `(current_value, false)` otherwise; a mismatch is not an error.
    fn cmp_and_swap(
        &self,
        bucket: &[u8],
        key: &[u8],
        old_value: &[u8],
        new_value: &[u8],
    ) -> Result<(Bytes, bool)>;

    /// Remove `key` from `bucket`.
    fn del(&self, bucket: &[u8], key: &[u8]) -> Result<()>;

    /// Return every entry in `bucket`, in no particular order.
    fn list(&self, bucket: &[u8]) -> Result<Vec<Entry>>;

    /// Execute `tx` in order, stopping at the first failing operation.
    ///
    /// Result slots of executed operations are filled in place. Operations
    /// before a failure stay applied.
    fn update(&self, tx: &mut Transaction) -> Result<()> {
        apply_transaction(self, tx)
    }

    /// Create `bucket`; succeeds if it already exists.
    fn create_table(&self, bucket: &[u8]) -> Result<()>;

    /// Delete `bucket` and everything in it; fails if it does not exist.
    fn delete_table(&self, bucket: &[u8]) -> Result<()>;
}

macro_rules! forward_kv_store {
    ($ty:ty) => {
        impl<S: KvStore + ?Sized> KvStore for $ty {
            fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Bytes> {
                (**self).get(bucket, key)
            }

            fn set(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<()> {
                (**self).set(bucket, key, value)
            }

            fn cmp_and_swap(
                &self,
                bucket: &[u8],
                key: &[u8],
                old_value: &[u8],
                new_value: &[u8],
            ) -> Result<(Bytes, bool)> {
                (**self).cmp_and_swap(bucket, key, old_value, new_value)
            }

            fn del(&self, bucket: &[u8], key: &[u8]) -> Result<()> {
                (**self).del(bucket, key)
            }

            fn list(&self, bucket: &[u8]) -> Result<Vec<Entry>> {
                (**self).list(bucket)
            }

            fn update(&self, tx: &mut Transaction) -> Result<()> {
                (**self).update(tx)
            }

            fn create_table(&self, bucket: &[u8]) -> Result<()> {
                (**self).create_table(bucket)
            }

            fn delete_table(&self, bucket: &[u8]) -> Result<()> {
                (**self).delete_table(bucket)
            }
        }
    };
}

forward_kv_store!(Arc<S>);
forward_kv_store!(Box<S>);
