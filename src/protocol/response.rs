//! Response definitions
//!
//! Represents responses to clients.

use bytes::{Buf, BufMut};

use crate::error::{Result, ScullError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    InvalidArgument = 0x01,
    Interrupted = 0x02,
    OutOfMemory = 0x03,
    Fault = 0x04,
    BadHandle = 0x05,
    Error = 0x0F,
}

impl Status {
    /// Decode a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::InvalidArgument),
            0x02 => Some(Status::Interrupted),
            0x03 => Some(Status::OutOfMemory),
            0x04 => Some(Status::Fault),
            0x05 => Some(Status::BadHandle),
            0x0F => Some(Status::Error),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (result for OK, error message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// OK carrying a big-endian u64 (handle id, position)
    pub fn ok_u64(value: u64) -> Self {
        Self::ok(Some(value.to_be_bytes().to_vec()))
    }

    /// OK carrying a big-endian u32 (byte count)
    pub fn ok_u32(value: u32) -> Self {
        Self::ok(Some(value.to_be_bytes().to_vec()))
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Map a device error onto its status code
    pub fn from_error(err: &ScullError) -> Self {
        let status = match err {
            ScullError::InvalidArgument(_) => Status::InvalidArgument,
            ScullError::Interrupted => Status::Interrupted,
            ScullError::OutOfMemory { .. } => Status::OutOfMemory,
            ScullError::Fault { .. } => Status::Fault,
            ScullError::BadHandle(_) => Status::BadHandle,
            _ => Status::Error,
        };
        Self {
            status,
            payload: Some(err.to_string().into_bytes()),
        }
    }

    /// Turn a received response back into a result (client side)
    pub fn into_result(self) -> Result<Option<Vec<u8>>> {
        let Response { status, payload } = self;
        if status == Status::Ok {
            return Ok(payload);
        }

        let message = payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default();

        Err(match status {
            Status::InvalidArgument => ScullError::InvalidArgument(message),
            Status::Interrupted => ScullError::Interrupted,
            Status::OutOfMemory => ScullError::OutOfMemory { requested: 0 },
            Status::Fault => ScullError::Fault {
                requested: 0,
                available: 0,
            },
            Status::Ok | Status::BadHandle | Status::Error => ScullError::Protocol(message),
        })
    }

    /// Decode an OK payload holding a u64
    pub fn into_u64(self) -> Result<u64> {
        let payload = self.into_result()?.unwrap_or_default();
        let mut buf = payload.as_slice();
        if buf.remaining() != 8 {
            return Err(ScullError::Protocol(format!(
                "expected 8-byte payload, got {}",
                payload.len()
            )));
        }
        Ok(buf.get_u64())
    }

    /// Decode an OK payload holding a u32
    pub fn into_u32(self) -> Result<u32> {
        let payload = self.into_result()?.unwrap_or_default();
        let mut buf = payload.as_slice();
        if buf.remaining() != 4 {
            return Err(ScullError::Protocol(format!(
                "expected 4-byte payload, got {}",
                payload.len()
            )));
        }
        Ok(buf.get_u32())
    }
}

/// Payload of a STAT response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub size: u64,
    pub quantum_size: u64,
    pub qset_size: u64,
}

impl Stat {
    pub const ENCODED_LEN: usize = 24;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::ENCODED_LEN);
        buf.put_u64(self.size);
        buf.put_u64(self.quantum_size);
        buf.put_u64(self.qset_size);
        buf
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::ENCODED_LEN {
            return Err(ScullError::Protocol(format!(
                "STAT payload: expected {} bytes, got {}",
                Self::ENCODED_LEN,
                payload.len()
            )));
        }
        let mut buf = payload;
        Ok(Self {
            size: buf.get_u64(),
            quantum_size: buf.get_u64(),
            qset_size: buf.get_u64(),
        })
    }
}
