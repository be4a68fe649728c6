//! In-order transaction execution.
//!
//! Operations run one after another against the store's own point
//! operations. The first error stops the walk and is returned unchanged;
//! operations before it stay applied. There is no staging and no undo.
//!
//! `CmpOrRollback` behaves like `CmpAndSwap` when the stored value matches.
//! On a mismatch its result slots are filled (current value,
//! `swapped = false`) and the transaction stops with
//! [`Error::CompareFailed`].

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::operation::{Operation, Transaction};
use crate::store::KvStore;
use crate::types::display_bytes;

/// Execute `tx` against `store`, filling result slots in place.
pub fn apply_transaction<S: KvStore + ?Sized>(store: &S, tx: &mut Transaction) -> Result<()> {
    let total = tx.len();
    for (index, op) in tx.operations.iter_mut().enumerate() {
        trace!(index, kind = %op.kind(), "applying operation");
        if let Err(e) = apply_operation(store, op) {
            debug!(index, total, kind = %op.kind(), error = %e, "transaction stopped");
            return Err(e);
        }
    }
    Ok(())
}

fn apply_operation<S: KvStore + ?Sized>(store: &S, op: &mut Operation) -> Result<()> {
    match op {
        Operation::CreateTable { bucket } => store.create_table(bucket),
        Operation::DeleteTable { bucket } => store.delete_table(bucket),
        Operation::Get {
            bucket,
            key,
            result,
        } => {
            *result = Some(store.get(bucket, key)?);
            Ok(())
        }
        Operation::Set { bucket, key, value } => store.set(bucket, key, value),
        Operation::Delete { bucket, key } => store.del(bucket, key),
        Operation::CmpAndSwap {
            bucket,
            key,
            old_value,
            new_value,
            result,
            swapped,
        } => {
            let (value, did_swap) = store.cmp_and_swap(bucket, key, old_value, new_value)?;
            *result = Some(value);
            *swapped = did_swap;
            Ok(())
        }
        Operation::CmpOrRollback {
            bucket,
            key,
            old_value,
            new_value,
            result,
            swapped,
        } => {
            let (value, did_swap) = store.cmp_and_swap(bucket, key, old_value, new_value)?;
            *result = Some(value);
            *swapped = did_swap;
            if did_swap {
                Ok(())
            } else {
                Err(Error::CompareFailed(format!(
                    "{}/{}",
                    display_bytes(bucket),
                    display_bytes(key)
                )))
            }
        }
    }
}
