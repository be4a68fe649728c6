//! Wire encoding for nosql
//!
//! This crate implements the message contract spoken between a host and an
//! out-of-process storage backend:
//!
//! - [`Request`] / [`Response`]: one message pair per storage operation,
//!   plus the `Hello` handshake exchange
//! - [`TxMessage`]: a transaction flattened to tagged entries
//! - [`WireError`]: backend errors forwarded without loss of kind
//! - [`read_message`] / [`write_message`]: length-prefixed MessagePack frames
//!
//! ## Frame Layout
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4 | payload length, `u32` big-endian |
//! | 4.. | MessagePack-encoded message (named fields) |
//!
//! Frames longer than [`MAX_FRAME_SIZE`] are rejected on both sides.
//!
//! ## Example
//!
//! ```
//! use nosql_wire::{read_message, write_message, GetRequest, Request};
//!
//! let mut buf = Vec::new();
//! let req = Request::Get(GetRequest {
//!     bucket: "users".into(),
//!     key: "1".into(),
//! });
//! write_message(&mut buf, &req).unwrap();
//!
//! let decoded: Option<Request> = read_message(&mut buf.as_slice()).unwrap();
//! assert_eq!(decoded, Some(req));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod frame;
mod message;
mod tx;

pub use error::{ErrorCode, WireError};
pub use frame::{
    decode, encode, encode_frame, read_frame, read_message, send_frame, write_frame,
    write_message, MAX_FRAME_SIZE,
};
pub use message::{
    CmpAndSwapRequest, CmpAndSwapResponse, CreateTableRequest, DelRequest, DeleteTableRequest,
    GetRequest, GetResponse, HelloRequest, HelloResponse, ListRequest, ListResponse, Request,
    Response, SetRequest, UpdateFailedResponse, UpdateRequest, UpdateResponse,
};
pub use tx::{decode_transaction, encode_transaction, merge_results, TxCmd, TxEntry, TxMessage};
