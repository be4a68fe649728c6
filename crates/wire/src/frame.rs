//! Length-prefixed MessagePack frames.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use nosql_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest payload accepted in one frame (64 MiB).
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Encode a message as MessagePack with named fields.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a MessagePack message.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
}

fn transport(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Error::Transport("timed out waiting for backend".to_string())
        }
        io::ErrorKind::UnexpectedEof => Error::Transport("connection closed".to_string()),
        _ => Error::Transport(err.to_string()),
    }
}

fn oversized(len: usize) -> String {
    format!("frame of {} bytes exceeds limit of {}", len, MAX_FRAME_SIZE)
}

/// Encode a message and check that it fits in one frame.
///
/// Nothing touches the stream here, so a failure leaves the connection
/// usable.
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let payload = encode(msg)?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(Error::Serialization(oversized(payload.len())));
    }
    Ok(payload)
}

/// Write one frame. Does not flush.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(Error::Serialization(oversized(payload.len())));
    }
    w.write_u32::<BigEndian>(payload.len() as u32)
        .map_err(transport)?;
    w.write_all(payload).map_err(transport)
}

/// Write one frame and flush it.
pub fn send_frame<W: Write>(w: &mut W, payload: &[u8]) -> Result<()> {
    write_frame(w, payload)?;
    w.flush().map_err(transport)
}

/// Read one frame.
///
/// Returns `Ok(None)` if the peer closed the stream cleanly at a frame
/// boundary. A stream ending inside a frame is a transport error.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match r.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::Transport("truncated frame header".to_string())),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(transport(e)),
        }
    }

    let len = BigEndian::read_u32(&header) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(Error::Transport(oversized(len)));
    }

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload).map_err(transport)?;
    Ok(Some(payload))
}

/// Encode, frame and flush one message.
pub fn write_message<W: Write, T: Serialize>(w: &mut W, msg: &T) -> Result<()> {
    let payload = encode_frame(msg)?;
    send_frame(w, &payload)
}

/// Read and decode one message; `Ok(None)` on clean end of stream.
pub fn read_message<R: Read, T: DeserializeOwned>(r: &mut R) -> Result<Option<T>> {
    match read_frame(r)? {
        Some(payload) => decode(&payload).map(Some),
        None => Ok(None),
    }
}
