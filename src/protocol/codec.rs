//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Frame
//! ```text
//! ┌───────────┬──────────┬──────────┬─────────────────────────┐
//! │Version (1)│ Kind (1) │ Len (3)  │         Payload         │
//! └───────────┴──────────┴──────────┴─────────────────────────┘
//! ```
//!
//! `Kind` is the command type for requests and the status for responses.
//!
//! ### Payload by Command Type
//! - LOOKUP: key_len (4 bytes) + key
//! - CREATE: key_len (4 bytes) + key + value
//! - UPDATE: key_len (4 bytes) + key + value
//! - SCAN:   empty
//! - PING:   empty
//!
//! ### Key List (SCAN reply)
//! `[key_len (4)][key]` repeated, in ascending key order.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::{Command, CommandType, Response, Status};
use crate::error::{Result, StoreError};

/// Only protocol version spoken
pub const PROTOCOL_VERSION: u8 = 0;

/// Header size: 1 byte version + 1 byte kind + 3 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (largest 3-byte length)
pub const MAX_PAYLOAD_SIZE: usize = (1 << 24) - 1;

// =============================================================================
// Framing
// =============================================================================

fn encode_frame(kind: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(StoreError::PayloadTooLarge(payload.len()));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    frame.put_u8(PROTOCOL_VERSION);
    frame.put_u8(kind);
    frame.put_uint(payload.len() as u64, 3);
    frame.put_slice(payload);

    Ok(frame.to_vec())
}

/// Split a complete frame into (version, kind, payload)
fn split_frame(bytes: &[u8]) -> Result<(u8, u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let version = header.get_u8();
    let kind = header.get_u8();
    let payload_len = header.get_uint(3) as usize;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((version, kind, &bytes[HEADER_SIZE..total_len]))
}

/// Read one complete frame from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = (&header[2..]).get_uint(3) as usize;

    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = match command {
        Command::Lookup { key } => {
            let mut payload = BytesMut::with_capacity(4 + key.len());
            payload.put_u32(key.len() as u32);
            payload.put_slice(key);
            payload
        }
        Command::Create { key, value } | Command::Update { key, value } => {
            let mut payload = BytesMut::with_capacity(4 + key.len() + value.len());
            payload.put_u32(key.len() as u32);
            payload.put_slice(key);
            payload.put_slice(value);
            payload
        }
        Command::Scan | Command::Ping => BytesMut::new(),
    };

    encode_frame(command.command_type() as u8, &payload)
}

/// Decode a command from a complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (version, kind, payload) = split_frame(bytes)?;

    if version != PROTOCOL_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let command_type = CommandType::from_byte(kind).ok_or(StoreError::UnknownCommand(kind))?;

    match command_type {
        CommandType::Lookup => {
            let (key, rest) = split_key(payload, "LOOKUP")?;
            if !rest.is_empty() {
                return Err(StoreError::Protocol(format!(
                    "LOOKUP command: {} unexpected trailing bytes",
                    rest.len()
                )));
            }
            Ok(Command::Lookup { key })
        }
        CommandType::Create => {
            let (key, value) = split_key(payload, "CREATE")?;
            Ok(Command::Create {
                key,
                value: value.to_vec(),
            })
        }
        CommandType::Update => {
            let (key, value) = split_key(payload, "UPDATE")?;
            Ok(Command::Update {
                key,
                value: value.to_vec(),
            })
        }
        CommandType::Scan => expect_empty(payload, "SCAN").map(|_| Command::Scan),
        CommandType::Ping => expect_empty(payload, "PING").map(|_| Command::Ping),
    }
}

/// Split a `key_len (4) + key + rest` payload
fn split_key<'a>(payload: &'a [u8], name: &str) -> Result<(Vec<u8>, &'a [u8])> {
    let mut buf = payload;
    if buf.remaining() < 4 {
        return Err(StoreError::Protocol(format!(
            "{} command: missing key length",
            name
        )));
    }

    let key_len = buf.get_u32() as usize;
    if buf.remaining() < key_len {
        return Err(StoreError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            name,
            key_len,
            buf.remaining()
        )));
    }

    Ok((buf[..key_len].to_vec(), &buf[key_len..]))
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(StoreError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    encode_frame(response.status as u8, payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (version, status_byte, payload) = split_frame(bytes)?;

    if version != PROTOCOL_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::AlreadyExists,
        0x03 => Status::Error,
        _ => {
            return Err(StoreError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Key Lists
// =============================================================================

/// Encode keys as `[key_len (4)][key]` records
pub fn encode_key_list<K: AsRef<[u8]>>(keys: impl IntoIterator<Item = K>) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for key in keys {
        let key = key.as_ref();
        buf.put_u32(key.len() as u32);
        buf.put_slice(key);
    }
    buf.to_vec()
}

/// Decode a key list produced by [`encode_key_list`]
pub fn decode_key_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut buf = bytes;
    let mut keys = Vec::new();

    while buf.has_remaining() {
        if buf.remaining() < 4 {
            return Err(StoreError::Protocol(
                "Key list: truncated key length".to_string(),
            ));
        }
        let key_len = buf.get_u32() as usize;
        if buf.remaining() < key_len {
            return Err(StoreError::Protocol(format!(
                "Key list: incomplete key (expected {}, got {})",
                key_len,
                buf.remaining()
            )));
        }
        keys.push(buf[..key_len].to_vec());
        buf.advance(key_len);
    }

    Ok(keys)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// The whole frame is consumed even when decoding fails, so the stream
/// stays aligned on the next frame.
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
