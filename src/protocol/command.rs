//! Command definitions
//!
//! Represents commands from clients.

use crate::device::{OpenMode, Whence};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Open = 0x01,
    Read = 0x02,
    Write = 0x03,
    Seek = 0x04,
    Release = 0x05,
    Stat = 0x06,
    Ping = 0x07,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a handle (write-only trims the device)
    Open { mode: OpenMode },

    /// Read up to `count` bytes at the handle's position
    Read { handle: u64, count: u32 },

    /// Write `data` at the handle's position
    Write { handle: u64, data: Vec<u8> },

    /// Move the handle's position
    Seek { handle: u64, offset: i64, whence: Whence },

    /// Close a handle
    Release { handle: u64 },

    /// Device size and geometry
    Stat,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Open { .. } => CommandType::Open,
            Command::Read { .. } => CommandType::Read,
            Command::Write { .. } => CommandType::Write,
            Command::Seek { .. } => CommandType::Seek,
            Command::Release { .. } => CommandType::Release,
            Command::Stat => CommandType::Stat,
            Command::Ping => CommandType::Ping,
        }
    }
}
