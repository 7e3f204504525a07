//! Configuration for scull
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, ScullError};

/// Default bytes per quantum
pub const DEFAULT_QUANTUM_SIZE: usize = 4000;

/// Default quantum slots per quantum set
pub const DEFAULT_QSET_SIZE: usize = 1000;

/// Main configuration for a scull device and its server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Bytes per quantum (smallest unit of lazy allocation)
    pub quantum_size: usize,

    /// Quantum slots per quantum set node
    pub qset_size: usize,

    /// Cap on bytes the store may allocate (nodes, slot arrays, quanta).
    /// `None` means only the system allocator limits growth.
    pub memory_limit: Option<usize>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Worker threads serving connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quantum_size: DEFAULT_QUANTUM_SIZE,
            qset_size: DEFAULT_QSET_SIZE,
            memory_limit: None,
            listen_addr: "127.0.0.1:7070".to_string(),
            max_connections: 64,
            worker_threads: 4,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Bytes addressable by one quantum set node
    pub fn item_size(&self) -> u64 {
        self.quantum_size as u64 * self.qset_size as u64
    }

    /// Check that the geometry describes a usable store
    pub fn validate(&self) -> Result<()> {
        if self.quantum_size == 0 {
            return Err(ScullError::Config("quantum_size must be non-zero".to_string()));
        }
        if self.qset_size == 0 {
            return Err(ScullError::Config("qset_size must be non-zero".to_string()));
        }
        if (self.quantum_size as u64).checked_mul(self.qset_size as u64).is_none() {
            return Err(ScullError::Config(format!(
                "item size overflows: {} * {}",
                self.quantum_size, self.qset_size
            )));
        }
        if self.worker_threads == 0 {
            return Err(ScullError::Config("worker_threads must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the quantum size (in bytes)
    pub fn quantum_size(mut self, size: usize) -> Self {
        self.config.quantum_size = size;
        self
    }

    /// Set the number of quantum slots per node
    pub fn qset_size(mut self, size: usize) -> Self {
        self.config.qset_size = size;
        self
    }

    /// Cap the bytes the store may allocate
    pub fn memory_limit(mut self, limit: Option<usize>) -> Self {
        self.config.memory_limit = limit;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
