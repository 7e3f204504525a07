//! Error types for scull
//!
//! Provides a unified error type for all operations. The device-level
//! variants mirror the errno values a character device driver reports.

use thiserror::Error;

/// Result type alias using ScullError
pub type Result<T> = std::result::Result<T, ScullError>;

// errno values reported to the host dispatch layer
const EFAULT: i32 = 14;
const EBADF: i32 = 9;
const EINVAL: i32 = 22;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const ERESTARTSYS: i32 = 512;

/// Unified error type for scull operations
#[derive(Debug, Error)]
pub enum ScullError {
    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The wait for the device lock was cancelled. Retry the whole call.
    #[error("Interrupted while waiting for the device lock")]
    Interrupted,

    /// Growing the store failed. Structure built before the failure stays.
    #[error("Out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    /// The caller's buffer does not cover the requested transfer.
    #[error("Bad address: transfer of {requested} bytes, buffer holds {available}")]
    Fault { requested: usize, available: usize },

    #[error("Bad file handle: {0}")]
    BadHandle(u64),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScullError {
    /// Negative errno the host layer would hand back to user space
    pub fn errno(&self) -> i32 {
        match self {
            ScullError::InvalidArgument(_) | ScullError::Config(_) => -EINVAL,
            ScullError::Interrupted => -ERESTARTSYS,
            ScullError::OutOfMemory { .. } => -ENOMEM,
            ScullError::Fault { .. } => -EFAULT,
            ScullError::BadHandle(_) => -EBADF,
            ScullError::Io(_) | ScullError::Network(_) | ScullError::Protocol(_) => -EIO,
        }
    }
}

impl From<ScullError> for std::io::Error {
    fn from(err: ScullError) -> Self {
        use std::io::ErrorKind;

        let kind = match &err {
            ScullError::Io(e) => return std::io::Error::new(e.kind(), e.to_string()),
            ScullError::InvalidArgument(_) | ScullError::Config(_) => ErrorKind::InvalidInput,
            // std retries ErrorKind::Interrupted, and a raised token fails every retry
            ScullError::Interrupted => ErrorKind::Other,
            ScullError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            ScullError::Fault { .. } => ErrorKind::InvalidData,
            ScullError::BadHandle(_) => ErrorKind::NotFound,
            ScullError::Network(_) | ScullError::Protocol(_) => ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
