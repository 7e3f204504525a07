//! Open file handles
//!
//! Position bookkeeping is per handle and needs no lock; the store
//! serializes the data path.

use std::io;
use std::sync::Arc;

use crate::error::{Result, ScullError};
use crate::sync::Interrupt;

use super::{resolve_seek, Device, Whence};

/// Access mode requested at open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpenMode {
    ReadOnly = 0,
    WriteOnly = 1,
    ReadWrite = 2,
}

impl OpenMode {
    /// Decode a raw `O_ACCMODE` value
    pub fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(OpenMode::ReadOnly),
            1 => Ok(OpenMode::WriteOnly),
            2 => Ok(OpenMode::ReadWrite),
            other => Err(ScullError::InvalidArgument(format!("unknown open mode {}", other))),
        }
    }

    /// Whether opening in this mode discards the device contents
    pub fn truncates(self) -> bool {
        self == OpenMode::WriteOnly
    }
}

/// An open handle on a [`Device`]
pub struct FileHandle {
    device: Arc<Device>,
    mode: OpenMode,
    pos: u64,

    /// Cancels this caller's lock waits
    interrupt: Interrupt,
}

impl FileHandle {
    pub(super) fn new(device: Arc<Device>, mode: OpenMode, interrupt: Interrupt) -> Self {
        Self {
            device,
            mode,
            pos: 0,
            interrupt,
        }
    }

    /// Read up to `count` bytes into `buf` and advance the position
    ///
    /// At most one quantum is transferred per call. Returns 0 at end of
    /// data or at a quantum that was never written.
    pub fn read(&mut self, buf: &mut [u8], count: usize) -> Result<usize> {
        let read = self
            .device
            .store()
            .read(self.pos, buf, count, &self.interrupt)?;
        self.pos += read as u64;
        Ok(read)
    }

    /// Write up to `count` bytes from `buf` and advance the position
    ///
    /// At most one quantum is transferred per call.
    pub fn write(&mut self, buf: &[u8], count: usize) -> Result<usize> {
        let written = self
            .device
            .store()
            .write(self.pos, buf, count, &self.interrupt)?;
        self.pos += written as u64;
        Ok(written)
    }

    /// Move the position and return it
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let size = match whence {
            Whence::End => self.device.size(),
            _ => 0,
        };
        self.pos = resolve_seek(self.pos, size, offset, whence)?;
        Ok(self.pos)
    }

    /// Close the handle; the device and its contents stay
    pub fn release(self) -> Result<()> {
        tracing::trace!(mode = ?self.mode, pos = self.pos, "handle released");
        Ok(())
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Mode the handle was opened with
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Token that cancels this handle's blocked calls
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// The device this handle refers to
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

// =============================================================================
// std::io adapters
// =============================================================================

impl io::Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        Ok(FileHandle::read(self, buf, len)?)
    }
}

impl io::Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(FileHandle::write(self, buf, buf.len())?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for FileHandle {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(n) => {
                let offset = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
                })?;
                (offset, Whence::Set)
            }
            io::SeekFrom::Current(n) => (n, Whence::Cur),
            io::SeekFrom::End(n) => (n, Whence::End),
        };
        Ok(FileHandle::seek(self, offset, whence)?)
    }
}
