//! Session
//!
//! Per-connection state: the open handle table and the interrupt token
//! shared by every handle the connection opens.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{Device, FileHandle};
use crate::error::{Result, ScullError};
use crate::protocol::{Command, Stat};
use crate::sync::Interrupt;

/// Executes commands for one remote caller
pub struct Session {
    /// Shared device
    device: Arc<Device>,

    /// Open handles by id
    handles: HashMap<u64, FileHandle>,

    /// Next handle id to hand out
    next_handle: u64,

    /// Raised by the server to cancel blocked calls of this session
    interrupt: Interrupt,
}

impl Session {
    /// Create a session with no open handles
    pub fn new(device: Arc<Device>, interrupt: Interrupt) -> Self {
        Self {
            device,
            handles: HashMap::new(),
            next_handle: 1,
            interrupt,
        }
    }

    /// Execute a command
    ///
    /// Routes commands to the device and returns the response payload
    pub fn execute(&mut self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Open { mode } => {
                let handle = self.device.open(mode, &self.interrupt)?;
                let id = self.next_handle;
                self.next_handle += 1;
                self.handles.insert(id, handle);
                tracing::debug!(handle = id, ?mode, "handle opened");
                Ok(Some(id.to_be_bytes().to_vec()))
            }
            Command::Read { handle, count } => {
                let file = self.handle_mut(handle)?;
                // a single call never moves more than one quantum
                let len = (count as usize).min(file.device().store().quantum_size());
                let mut buf = vec![0u8; len];
                let read = file.read(&mut buf, count as usize)?;
                buf.truncate(read);
                Ok(Some(buf))
            }
            Command::Write { handle, data } => {
                let file = self.handle_mut(handle)?;
                let written = file.write(&data, data.len())?;
                Ok(Some((written as u32).to_be_bytes().to_vec()))
            }
            Command::Seek {
                handle,
                offset,
                whence,
            } => {
                let file = self.handle_mut(handle)?;
                let pos = file.seek(offset, whence)?;
                Ok(Some(pos.to_be_bytes().to_vec()))
            }
            Command::Release { handle } => {
                let file = self
                    .handles
                    .remove(&handle)
                    .ok_or(ScullError::BadHandle(handle))?;
                file.release()?;
                tracing::debug!(handle, "handle released");
                Ok(None)
            }
            Command::Stat => {
                let store = self.device.store();
                let stat = Stat {
                    size: store.size(),
                    quantum_size: store.quantum_size() as u64,
                    qset_size: store.qset_size() as u64,
                };
                Ok(Some(stat.encode()))
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    fn handle_mut(&mut self, id: u64) -> Result<&mut FileHandle> {
        self.handles.get_mut(&id).ok_or(ScullError::BadHandle(id))
    }

    /// Number of open handles
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// This session's interrupt token
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::OpenMode;

    fn session(config: &Config) -> Session {
        Session::new(Device::init(config).unwrap(), Interrupt::new())
    }

    fn handle_id(payload: Option<Vec<u8>>) -> u64 {
        let bytes: [u8; 8] = payload.unwrap().as_slice().try_into().unwrap();
        u64::from_be_bytes(bytes)
    }

    #[test]
    fn test_open_and_release_track_handles() {
        let config = Config::builder().quantum_size(8).qset_size(4).build();
        let mut session = session(&config);
        assert_eq!(session.open_handles(), 0);

        let a = handle_id(session.execute(Command::Open { mode: OpenMode::ReadOnly }).unwrap());
        let b = handle_id(session.execute(Command::Open { mode: OpenMode::ReadWrite }).unwrap());
        assert_ne!(a, b);
        assert_eq!(session.open_handles(), 2);

        session.execute(Command::Release { handle: a }).unwrap();
        assert_eq!(session.open_handles(), 1);
        assert!(matches!(
            session.execute(Command::Release { handle: a }),
            Err(ScullError::BadHandle(id)) if id == a
        ));
    }

    #[test]
    fn test_raised_session_interrupt_cancels_writes() {
        let config = Config::builder().quantum_size(8).qset_size(4).build();
        let mut session = session(&config);
        let handle = handle_id(session.execute(Command::Open { mode: OpenMode::ReadWrite }).unwrap());

        session.interrupt().raise();
        let result = session.execute(Command::Write {
            handle,
            data: b"abc".to_vec(),
        });
        assert!(matches!(result, Err(ScullError::Interrupted)));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_stat_reports_geometry_beyond_u32() {
        let quantum_size = u32::MAX as usize + 10;
        let config = Config::builder().quantum_size(quantum_size).qset_size(2).build();
        let mut session = session(&config);

        let payload = session.execute(Command::Stat).unwrap().unwrap();
        let stat = Stat::decode(&payload).unwrap();
        assert_eq!(stat.size, 0);
        assert_eq!(stat.quantum_size, quantum_size as u64);
        assert_eq!(stat.qset_size, 2);
    }
}
