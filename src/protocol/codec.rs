//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - OPEN:    mode (1)
//! - READ:    handle (8) + count (4)
//! - WRITE:   handle (8) + data
//! - SEEK:    handle (8) + offset (8) + whence (1)
//! - RELEASE: handle (8)
//! - STAT:    empty
//! - PING:    empty
//!
//! All integers are big-endian.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::device::{OpenMode, Whence};
use crate::error::{Result, ScullError};
use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Bytes {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let mut payload = BytesMut::new();
    match command {
        Command::Open { mode } => payload.put_u8(*mode as u8),
        Command::Read { handle, count } => {
            payload.put_u64(*handle);
            payload.put_u32(*count);
        }
        Command::Write { handle, data } => {
            payload.reserve(8 + data.len());
            payload.put_u64(*handle);
            payload.put_slice(data);
        }
        Command::Seek {
            handle,
            offset,
            whence,
        } => {
            payload.put_u64(*handle);
            payload.put_i64(*offset);
            payload.put_u8(*whence as u8);
        }
        Command::Release { handle } => payload.put_u64(*handle),
        Command::Stat | Command::Ping => {}
    }

    frame(cmd_type, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, mut payload) = split_frame(bytes, "command")?;

    // Parse command based on type
    let command = match cmd_type {
        0x01 => {
            need(payload, 1, "OPEN")?;
            Command::Open {
                mode: OpenMode::from_raw(payload.get_u8())
                    .map_err(|e| ScullError::Protocol(format!("OPEN command: {}", e)))?,
            }
        }
        0x02 => {
            need(payload, 12, "READ")?;
            Command::Read {
                handle: payload.get_u64(),
                count: payload.get_u32(),
            }
        }
        0x03 => {
            if payload.len() < 8 {
                return Err(ScullError::Protocol(
                    "WRITE command: missing handle".to_string(),
                ));
            }
            let handle = payload.get_u64();
            Command::Write {
                handle,
                data: payload.to_vec(),
            }
        }
        0x04 => {
            need(payload, 17, "SEEK")?;
            let handle = payload.get_u64();
            let offset = payload.get_i64();
            let whence = Whence::from_raw(payload.get_u8() as i32)
                .map_err(|e| ScullError::Protocol(format!("SEEK command: {}", e)))?;
            Command::Seek {
                handle,
                offset,
                whence,
            }
        }
        0x05 => {
            need(payload, 8, "RELEASE")?;
            Command::Release {
                handle: payload.get_u64(),
            }
        }
        0x06 => {
            need(payload, 0, "STAT")?;
            Command::Stat
        }
        0x07 => {
            need(payload, 0, "PING")?;
            Command::Ping
        }
        _ => {
            return Err(ScullError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                cmd_type
            )))
        }
    };

    Ok(command)
}

/// Check a fixed-size payload length
fn need(payload: &[u8], expected: usize, name: &str) -> Result<()> {
    if payload.len() != expected {
        return Err(ScullError::Protocol(format!(
            "{} command: expected {} payload bytes, got {}",
            name,
            expected,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Bytes {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        ScullError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Bytes {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.freeze()
}

/// Split a complete frame into its kind byte and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(ScullError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let kind = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(ScullError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: u32) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ScullError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until the frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R) -> Result<BytesMut> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = (&header[1..]).get_u32();
    check_payload_len(payload_len)?;

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload_len as usize);
    message.put_slice(&header);
    message.resize(HEADER_SIZE + payload_len as usize, 0);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader)?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
