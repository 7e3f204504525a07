//! Protocol Module
//!
//! Defines the wire protocol remote callers use to drive the device.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: OPEN    - Payload: mode (1)
//! - 0x02: READ    - Payload: handle (8) + count (4)
//! - 0x03: WRITE   - Payload: handle (8) + data
//! - 0x04: SEEK    - Payload: handle (8) + offset (8, signed) + whence (1)
//! - 0x05: RELEASE - Payload: handle (8)
//! - 0x06: STAT    - Payload: empty
//! - 0x07: PING    - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: INVALID_ARGUMENT
//! - 0x02: INTERRUPTED
//! - 0x03: OUT_OF_MEMORY
//! - 0x04: FAULT
//! - 0x05: BAD_HANDLE
//! - 0x0F: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Stat, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
