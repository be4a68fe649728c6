//! Transaction codec.
//!
//! A [`Transaction`] crosses the wire as a flat list of [`TxEntry`] records
//! tagged by a numeric command:
//!
//! | Tag | Command |
//! |-----|---------|
//! | 0 | CreateTable |
//! | 1 | DeleteTable |
//! | 2 | Get |
//! | 3 | Set |
//! | 4 | Delete |
//! | 5 | CmpAndSwap |
//! | 6 | CmpOrRollback |
//!
//! The tag is kept as a raw integer so that a peer speaking a newer
//! dialect still decodes at the message level; the unknown tag is then
//! reported as [`Error::OpNotSupported`] before anything executes.
//!
//! For compare operations `cmp_value` holds the expected value and `value`
//! the replacement.

use bytes::Bytes;
use nosql_core::{display_bytes, Error, Operation, Result, Transaction};
use serde::{Deserialize, Serialize};

/// Numeric operation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
#[allow(missing_docs)]
pub enum TxCmd {
    CreateTable = 0,
    DeleteTable = 1,
    Get = 2,
    Set = 3,
    Delete = 4,
    CmpAndSwap = 5,
    CmpOrRollback = 6,
}

impl TxCmd {
    /// Decode a tag; `None` for tags this build does not know.
    pub fn from_tag(tag: i32) -> Option<TxCmd> {
        match tag {
            0 => Some(TxCmd::CreateTable),
            1 => Some(TxCmd::DeleteTable),
            2 => Some(TxCmd::Get),
            3 => Some(TxCmd::Set),
            4 => Some(TxCmd::Delete),
            5 => Some(TxCmd::CmpAndSwap),
            6 => Some(TxCmd::CmpOrRollback),
            _ => None,
        }
    }

    /// Wire tag.
    pub fn tag(self) -> i32 {
        self as i32
    }
}

/// One operation on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEntry {
    /// Raw [`TxCmd`] tag
    pub cmd: i32,
    #[allow(missing_docs)]
    pub bucket: Bytes,
    #[allow(missing_docs)]
    pub key: Bytes,
    /// Value for `Set`, replacement for compare operations
    pub value: Bytes,
    /// Expected value for compare operations
    pub cmp_value: Bytes,
    /// Result slot, filled by the executing side
    pub result: Option<Bytes>,
    /// Swapped flag, filled by the executing side
    pub swapped: bool,
}

/// Transaction on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMessage {
    /// Entries in execution order
    pub operations: Vec<TxEntry>,
}

/// Flatten a transaction, including any result slots already filled.
pub fn encode_transaction(tx: &Transaction) -> TxMessage {
    TxMessage {
        operations: tx.iter().map(encode_operation).collect(),
    }
}

fn encode_operation(op: &Operation) -> TxEntry {
    match op {
        Operation::CreateTable { bucket } => TxEntry {
            cmd: TxCmd::CreateTable.tag(),
            bucket: bucket.clone(),
            ..Default::default()
        },
        Operation::DeleteTable { bucket } => TxEntry {
            cmd: TxCmd::DeleteTable.tag(),
            bucket: bucket.clone(),
            ..Default::default()
        },
        Operation::Get {
            bucket,
            key,
            result,
        } => TxEntry {
            cmd: TxCmd::Get.tag(),
            bucket: bucket.clone(),
            key: key.clone(),
            result: result.clone(),
            ..Default::default()
        },
        Operation::Set { bucket, key, value } => TxEntry {
            cmd: TxCmd::Set.tag(),
            bucket: bucket.clone(),
            key: key.clone(),
            value: value.clone(),
            ..Default::default()
        },
        Operation::Delete { bucket, key } => TxEntry {
            cmd: TxCmd::Delete.tag(),
            bucket: bucket.clone(),
            key: key.clone(),
            ..Default::default()
        },
        Operation::CmpAndSwap {
            bucket,
            key,
            old_value,
            new_value,
            result,
            swapped,
        } => TxEntry {
            cmd: TxCmd::CmpAndSwap.tag(),
            bucket: bucket.clone(),
            key: key.clone(),
            value: new_value.clone(),
            cmp_value: old_value.clone(),
            result: result.clone(),
            swapped: *swapped,
        },
        Operation::CmpOrRollback {
            bucket,
            key,
            old_value,
            new_value,
            result,
            swapped,
        } => TxEntry {
            cmd: TxCmd::CmpOrRollback.tag(),
            bucket: bucket.clone(),
            key: key.clone(),
            value: new_value.clone(),
            cmp_value: old_value.clone(),
            result: result.clone(),
            swapped: *swapped,
        },
    }
}

/// Rebuild a transaction.
///
/// Every entry is checked before the transaction is returned, so an
/// unknown tag anywhere fails the whole decode and nothing runs.
pub fn decode_transaction(msg: TxMessage) -> Result<Transaction> {
    msg.operations
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_entry(index, entry))
        .collect()
}

fn decode_entry(index: usize, entry: TxEntry) -> Result<Operation> {
    let cmd = TxCmd::from_tag(entry.cmd).ok_or_else(|| {
        Error::OpNotSupported(format!(
            "unknown operation tag {} at index {} (bucket {})",
            entry.cmd,
            index,
            display_bytes(&entry.bucket)
        ))
    })?;
    let TxEntry {
        bucket,
        key,
        value,
        cmp_value,
        result,
        swapped,
        ..
    } = entry;
    Ok(match cmd {
        TxCmd::CreateTable => Operation::CreateTable { bucket },
        TxCmd::DeleteTable => Operation::DeleteTable { bucket },
        TxCmd::Get => Operation::Get {
            bucket,
            key,
            result,
        },
        TxCmd::Set => Operation::Set { bucket, key, value },
        TxCmd::Delete => Operation::Delete { bucket, key },
        TxCmd::CmpAndSwap => Operation::CmpAndSwap {
            bucket,
            key,
            old_value: cmp_value,
            new_value: value,
            result,
            swapped,
        },
        TxCmd::CmpOrRollback => Operation::CmpOrRollback {
            bucket,
            key,
            old_value: cmp_value,
            new_value: value,
            result,
            swapped,
        },
    })
}

/// Copy result slots from an executed echo back into the caller's transaction.
///
/// The echo must have the same length and the same kind at every position.
pub fn merge_results(tx: &mut Transaction, executed: TxMessage) -> Result<()> {
    let executed = decode_transaction(executed)?;
    if executed.len() != tx.len() {
        return Err(Error::Protocol(format!(
            "update echoed {} operations, sent {}",
            executed.len(),
            tx.len()
        )));
    }
    for (index, (op, done)) in tx.operations.iter_mut().zip(executed.iter()).enumerate() {
        if !op.absorb_result(done) {
            return Err(Error::Protocol(format!(
                "update echoed {} at index {}, sent {}",
                done.kind(),
                index,
                op.kind()
            )));
        }
    }
    Ok(())
}
