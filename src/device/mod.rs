//! Device Module
//!
//! The file-like surface a dispatch layer drives: open, read, write,
//! seek and release against one shared [`QuantizedStore`].
//!
//! ## Responsibilities
//! - Device lifecycle (init / destroy)
//! - Discard contents when opened write-only
//! - Per-caller position tracking in [`FileHandle`]
//! - Seek arithmetic (no bounds check against size)

mod file;
mod seek;

pub use file::{FileHandle, OpenMode};
pub use seek::{resolve_seek, Whence};

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::store::QuantizedStore;
use crate::sync::Interrupt;

/// One scull device
///
/// Shared between callers through `Arc<Device>`; every open handle keeps
/// a reference.
pub struct Device {
    /// Device configuration
    config: Config,

    /// Backing store (internally serialized)
    store: QuantizedStore,
}

impl Device {
    /// Create an empty device with the given geometry
    pub fn init(config: &Config) -> Result<Arc<Self>> {
        let store = QuantizedStore::new(config)?;

        info!(
            quantum_size = config.quantum_size,
            qset_size = config.qset_size,
            memory_limit = ?config.memory_limit,
            "scull device initialized"
        );

        Ok(Arc::new(Self {
            config: config.clone(),
            store,
        }))
    }

    /// Open a handle positioned at offset 0
    ///
    /// A write-only open trims the device first; `interrupt` cancels the
    /// wait for the device lock in that case. The returned handle carries
    /// `interrupt` into every later call.
    pub fn open(self: &Arc<Self>, mode: OpenMode, interrupt: &Interrupt) -> Result<FileHandle> {
        if mode.truncates() {
            self.store.trim(interrupt)?;
            debug!("device trimmed on write-only open");
        }

        Ok(FileHandle::new(Arc::clone(self), mode, interrupt.clone()))
    }

    /// Discard all contents
    pub fn trim(&self, interrupt: &Interrupt) -> Result<()> {
        self.store.trim(interrupt)
    }

    /// Trim and release the device
    ///
    /// Fails (returning the device) while handles are still open.
    pub fn destroy(self: Arc<Self>) -> std::result::Result<(), Arc<Self>> {
        let device = Arc::try_unwrap(self)?;
        let size = device.store.size();

        device.store.destroy();
        info!(size, "scull device destroyed");
        Ok(())
    }

    /// Current logical size in bytes
    pub fn size(&self) -> u64 {
        self.store.size()
    }

    /// The backing store (for inspection)
    pub fn store(&self) -> &QuantizedStore {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
