//! Blocking TCP client
//!
//! Thin wrapper issuing one command per call and decoding the response.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::device::{OpenMode, Whence};
use crate::error::{Result, ScullError};
use crate::protocol::{read_response, write_command, Command, Response, Stat};

/// Client connection to a scull server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Open a handle; write-only discards the device contents
    pub fn open(&mut self, mode: OpenMode) -> Result<u64> {
        self.call(&Command::Open { mode })?.into_u64()
    }

    /// Read at most one quantum at the handle's position
    pub fn read(&mut self, handle: u64, count: u32) -> Result<Vec<u8>> {
        let payload = self.call(&Command::Read { handle, count })?.into_result()?;
        Ok(payload.unwrap_or_default())
    }

    /// Write at most one quantum at the handle's position
    pub fn write(&mut self, handle: u64, data: &[u8]) -> Result<u32> {
        self.call(&Command::Write {
            handle,
            data: data.to_vec(),
        })?
        .into_u32()
    }

    /// Write all of `data`, issuing as many calls as needed
    pub fn write_all(&mut self, handle: u64, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let written = self.write(handle, data)? as usize;
            if written == 0 {
                return Err(ScullError::Protocol("server accepted no bytes".to_string()));
            }
            data = &data[written..];
        }
        Ok(())
    }

    /// Read up to `len` bytes, stopping early at end of data or a hole
    pub fn read_up_to(&mut self, handle: u64, len: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            let want = u32::try_from(len - out.len()).unwrap_or(u32::MAX);
            let chunk = self.read(handle, want)?;
            if chunk.is_empty() {
                break;
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    /// Move the handle's position
    pub fn seek(&mut self, handle: u64, offset: i64, whence: Whence) -> Result<u64> {
        self.call(&Command::Seek {
            handle,
            offset,
            whence,
        })?
        .into_u64()
    }

    /// Close a handle
    pub fn release(&mut self, handle: u64) -> Result<()> {
        self.call(&Command::Release { handle })?.into_result()?;
        Ok(())
    }

    /// Device size and geometry
    pub fn stat(&mut self) -> Result<Stat> {
        let payload = self.call(&Command::Stat)?.into_result()?.unwrap_or_default();
        Stat::decode(&payload)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let payload = self.call(&Command::Ping)?.into_result()?;
        match payload.as_deref() {
            Some(b"PONG") => Ok(()),
            _ => Err(ScullError::Protocol("unexpected PING reply".to_string())),
        }
    }
}
