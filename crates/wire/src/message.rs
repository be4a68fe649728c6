//! Request and response messages.
//!
//! | Request | Response |
//! |---------|----------|
//! | `Hello` | `Hello { protocol_version, services }` |
//! | `Get { bucket, key }` | `Get { value }` |
//! | `Set { bucket, key, value }` | `Empty` |
//! | `Del { bucket, key }` | `Empty` |
//! | `CmpAndSwap { bucket, key, old_value, new_value }` | `CmpAndSwap { value, swapped }` |
//! | `List { bucket }` | `List { entries }` |
//! | `Update { tx }` | `Update { tx }` or `UpdateFailed { error, tx }` |
//! | `CreateTable { bucket }` | `Empty` |
//! | `DeleteTable { bucket }` | `Empty` |
//!
//! Any request may instead be answered with `Error`.

use bytes::Bytes;
use nosql_core::Entry;
use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::tx::TxMessage;

/// Handshake request sent once, before any storage call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloRequest {
    /// Magic cookie key the host was configured with
    pub magic_cookie_key: String,
    /// Magic cookie value the host was configured with
    pub magic_cookie_value: String,
    /// Application protocol version of the host
    pub protocol_version: u32,
    /// Service the connection should be bound to
    pub service: String,
}

/// Handshake answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    /// Application protocol version of the backend
    pub protocol_version: u32,
    /// Every service name the backend advertises
    pub services: Vec<String>,
}

/// Point read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
    #[allow(missing_docs)]
    pub key: Bytes,
}

/// Point read result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    #[allow(missing_docs)]
    pub value: Bytes,
}

/// Point write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
    #[allow(missing_docs)]
    pub key: Bytes,
    #[allow(missing_docs)]
    pub value: Bytes,
}

/// Point delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
    #[allow(missing_docs)]
    pub key: Bytes,
}

/// Compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmpAndSwapRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
    #[allow(missing_docs)]
    pub key: Bytes,
    /// Expected current value
    pub old_value: Bytes,
    /// Replacement value
    pub new_value: Bytes,
}

/// Compare-and-swap outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmpAndSwapResponse {
    /// New value if swapped, current value otherwise
    pub value: Bytes,
    /// Whether the swap happened
    pub swapped: bool,
}

/// Bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
}

/// Bucket listing result; entry order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    #[allow(missing_docs)]
    pub entries: Vec<Entry>,
}

/// Transaction submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[allow(missing_docs)]
    pub tx: TxMessage,
}

/// Transaction acknowledgment, echoing the executed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[allow(missing_docs)]
    pub tx: TxMessage,
}

/// Transaction stopped at a failing operation.
///
/// `tx` carries the results of every operation executed up to and
/// including the failing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFailedResponse {
    #[allow(missing_docs)]
    pub error: WireError,
    #[allow(missing_docs)]
    pub tx: TxMessage,
}

/// Table creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
}

/// Table deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTableRequest {
    #[allow(missing_docs)]
    pub bucket: Bytes,
}

/// Host → backend message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    #[allow(missing_docs)]
    Hello(HelloRequest),
    #[allow(missing_docs)]
    Get(GetRequest),
    #[allow(missing_docs)]
    Set(SetRequest),
    #[allow(missing_docs)]
    Del(DelRequest),
    #[allow(missing_docs)]
    CmpAndSwap(CmpAndSwapRequest),
    #[allow(missing_docs)]
    List(ListRequest),
    #[allow(missing_docs)]
    Update(UpdateRequest),
    #[allow(missing_docs)]
    CreateTable(CreateTableRequest),
    #[allow(missing_docs)]
    DeleteTable(DeleteTableRequest),
}

impl Request {
    /// Method name used in logs.
    pub fn method(&self) -> &'static str {
        match self {
            Request::Hello(_) => "Hello",
            Request::Get(_) => "Get",
            Request::Set(_) => "Set",
            Request::Del(_) => "Del",
            Request::CmpAndSwap(_) => "CmpAndSwap",
            Request::List(_) => "List",
            Request::Update(_) => "Update",
            Request::CreateTable(_) => "CreateTable",
            Request::DeleteTable(_) => "DeleteTable",
        }
    }
}

/// Backend → host message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    #[allow(missing_docs)]
    Hello(HelloResponse),
    #[allow(missing_docs)]
    Get(GetResponse),
    #[allow(missing_docs)]
    CmpAndSwap(CmpAndSwapResponse),
    #[allow(missing_docs)]
    List(ListResponse),
    #[allow(missing_docs)]
    Update(UpdateResponse),
    #[allow(missing_docs)]
    UpdateFailed(UpdateFailedResponse),
    /// Success with no payload (`Set`, `Del`, `CreateTable`, `DeleteTable`)
    Empty,
    /// Failure of the request
    Error(WireError),
}

impl Response {
    /// Variant name used in logs and protocol errors.
    pub fn name(&self) -> &'static str {
        match self {
            Response::Hello(_) => "Hello",
            Response::Get(_) => "Get",
            Response::CmpAndSwap(_) => "CmpAndSwap",
            Response::List(_) => "List",
            Response::Update(_) => "Update",
            Response::UpdateFailed(_) => "UpdateFailed",
            Response::Empty => "Empty",
            Response::Error(_) => "Error",
        }
    }
}
