//! Transaction operations.
//!
//! A [`Transaction`] is an ordered list of [`Operation`]s submitted in one
//! [`KvStore::update`] call. Operations run in sequence and stop at the
//! first error. Each read-like operation carries result slots that the
//! executor fills in, so the caller can inspect outcomes after `update`
//! returns. Results are not visible to later operations of the same
//! transaction.
//!
//! [`KvStore::update`]: crate::KvStore::update

use bytes::Bytes;
use std::fmt;

/// Operation kind, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Create a bucket (idempotent)
    CreateTable,
    /// Delete a bucket
    DeleteTable,
    /// Read one key
    Get,
    /// Write one key
    Set,
    /// Remove one key
    Delete,
    /// Conditional write reporting `swapped`
    CmpAndSwap,
    /// Conditional write that aborts the transaction on mismatch
    CmpOrRollback,
}

impl OpKind {
    /// Name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::CreateTable => "CreateTable",
            OpKind::DeleteTable => "DeleteTable",
            OpKind::Get => "Get",
            OpKind::Set => "Set",
            OpKind::Delete => "Delete",
            OpKind::CmpAndSwap => "CmpAndSwap",
            OpKind::CmpOrRollback => "CmpOrRollback",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single storage action inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create `bucket` if it does not already exist.
    CreateTable {
        /// Target bucket
        bucket: Bytes,
    },
    /// Delete `bucket`; fails if it does not exist.
    DeleteTable {
        /// Target bucket
        bucket: Bytes,
    },
    /// Read `key` from `bucket`.
    Get {
        /// Target bucket
        bucket: Bytes,
        /// Key to read
        key: Bytes,
        /// Value read, filled in by execution
        result: Option<Bytes>,
    },
    /// Write `value` under `key`.
    Set {
        /// Target bucket
        bucket: Bytes,
        /// Key to write
        key: Bytes,
        /// Value to store
        value: Bytes,
    },
    /// Remove `key` from `bucket`.
    Delete {
        /// Target bucket
        bucket: Bytes,
        /// Key to remove
        key: Bytes,
    },
    /// Replace the value with `new_value` only if it currently equals `old_value`.
    CmpAndSwap {
        /// Target bucket
        bucket: Bytes,
        /// Key to swap
        key: Bytes,
        /// Expected current value
        old_value: Bytes,
        /// Replacement value
        new_value: Bytes,
        /// Value after execution (new value if swapped, current value otherwise)
        result: Option<Bytes>,
        /// Whether the swap happened
        swapped: bool,
    },
    /// Like `CmpAndSwap`, but a mismatch aborts the rest of the transaction.
    CmpOrRollback {
        /// Target bucket
        bucket: Bytes,
        /// Key to swap
        key: Bytes,
        /// Expected current value
        old_value: Bytes,
        /// Replacement value
        new_value: Bytes,
        /// Value after execution (new value if swapped, current value otherwise)
        result: Option<Bytes>,
        /// Whether the swap happened
        swapped: bool,
    },
}

impl Operation {
    /// Kind of this operation.
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::CreateTable { .. } => OpKind::CreateTable,
            Operation::DeleteTable { .. } => OpKind::DeleteTable,
            Operation::Get { .. } => OpKind::Get,
            Operation::Set { .. } => OpKind::Set,
            Operation::Delete { .. } => OpKind::Delete,
            Operation::CmpAndSwap { .. } => OpKind::CmpAndSwap,
            Operation::CmpOrRollback { .. } => OpKind::CmpOrRollback,
        }
    }

    /// Bucket this operation targets.
    pub fn bucket(&self) -> &Bytes {
        match self {
            Operation::CreateTable { bucket }
            | Operation::DeleteTable { bucket }
            | Operation::Get { bucket, .. }
            | Operation::Set { bucket, .. }
            | Operation::Delete { bucket, .. }
            | Operation::CmpAndSwap { bucket, .. }
            | Operation::CmpOrRollback { bucket, .. } => bucket,
        }
    }

    /// Key this operation targets, if any.
    pub fn key(&self) -> Option<&Bytes> {
        match self {
            Operation::CreateTable { .. } | Operation::DeleteTable { .. } => None,
            Operation::Get { key, .. }
            | Operation::Set { key, .. }
            | Operation::Delete { key, .. }
            | Operation::CmpAndSwap { key, .. }
            | Operation::CmpOrRollback { key, .. } => Some(key),
        }
    }

    /// Result value recorded by execution, if any.
    pub fn result(&self) -> Option<&Bytes> {
        match self {
            Operation::Get { result, .. }
            | Operation::CmpAndSwap { result, .. }
            | Operation::CmpOrRollback { result, .. } => result.as_ref(),
            _ => None,
        }
    }

    /// Swapped flag recorded by execution; always `false` for non-compare kinds.
    pub fn swapped(&self) -> bool {
        match self {
            Operation::CmpAndSwap { swapped, .. } | Operation::CmpOrRollback { swapped, .. } => {
                *swapped
            }
            _ => false,
        }
    }

    /// Overwrite the result slots with those of an executed copy of this operation.
    ///
    /// Returns `false` and leaves `self` untouched when `executed` is of a
    /// different kind.
    pub fn absorb_result(&mut self, executed: &Operation) -> bool {
        if self.kind() != executed.kind() {
            return false;
        }
        match self {
            Operation::Get { result, .. } => *result = executed.result().cloned(),
            Operation::CmpAndSwap {
                result, swapped, ..
            }
            | Operation::CmpOrRollback {
                result, swapped, ..
            } => {
                *result = executed.result().cloned();
                *swapped = executed.swapped();
            }
            _ => {}
        }
        true
    }
}

/// An ordered batch of operations executed by one `update` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Operations in execution order
    pub operations: Vec<Operation>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary operation.
    pub fn push(&mut self, op: Operation) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Append a `CreateTable`.
    pub fn create_table(&mut self, bucket: impl Into<Bytes>) -> &mut Self {
        self.push(Operation::CreateTable {
            bucket: bucket.into(),
        })
    }

    /// Append a `DeleteTable`.
    pub fn delete_table(&mut self, bucket: impl Into<Bytes>) -> &mut Self {
        self.push(Operation::DeleteTable {
            bucket: bucket.into(),
        })
    }

    /// Append a `Get`.
    pub fn get(&mut self, bucket: impl Into<Bytes>, key: impl Into<Bytes>) -> &mut Self {
        self.push(Operation::Get {
            bucket: bucket.into(),
            key: key.into(),
            result: None,
        })
    }

    /// Append a `Set`.
    pub fn set(
        &mut self,
        bucket: impl Into<Bytes>,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> &mut Self {
        self.push(Operation::Set {
            bucket: bucket.into(),
            key: key.into(),
            value: value.into(),
        })
    }

    /// Append a `Delete`.
    pub fn delete(&mut self, bucket: impl Into<Bytes>, key: impl Into<Bytes>) -> &mut Self {
        self.push(Operation::Delete {
            bucket: bucket.into(),
            key: key.into(),
        })
    }

    /// Append a `CmpAndSwap`.
    pub fn cmp_and_swap(
        &mut self,
        bucket: impl Into<Bytes>,
        key: impl Into<Bytes>,
        old_value: impl Into<Bytes>,
        new_value: impl Into<Bytes>,
    ) -> &mut Self {
        self.push(Operation::CmpAndSwap {
            bucket: bucket.into(),
            key: key.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            result: None,
            swapped: false,
        })
    }

    /// Append a `CmpOrRollback`.
    pub fn cmp_or_rollback(
        &mut self,
        bucket: impl Into<Bytes>,
        key: impl Into<Bytes>,
        old_value: impl Into<Bytes>,
        new_value: impl Into<Bytes>,
    ) -> &mut Self {
        self.push(Operation::CmpOrRollback {
            bucket: bucket.into(),
            key: key.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            result: None,
            swapped: false,
        })
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the transaction has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl FromIterator<Operation> for Transaction {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}
