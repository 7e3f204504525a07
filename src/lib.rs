//! # scull
//!
//! An in-memory character device whose bytes live in lazily allocated,
//! fixed-size quanta:
//! - Linear offsets translated to (node, slot, offset-in-quantum)
//! - Nodes, slot arrays and quanta allocated on first write
//! - At most one quantum moved per read or write call
//! - Write-only open discards the contents (trim)
//! - Interruptible device lock
//! - TCP dispatch layer for remote callers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Session per connection)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ open / read / write / seek / release
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Device + FileHandle                          │
//! │           (per-handle position, seek math)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  QuantizedStore                              │
//! │   Semaphore (interruptible) → Vec<QuantumSet> → quanta       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod sync;
pub mod store;
pub mod device;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ScullError};
pub use config::Config;
pub use device::{Device, FileHandle, OpenMode, Whence};
pub use store::QuantizedStore;
pub use sync::Interrupt;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of scull
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
