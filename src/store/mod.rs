//! Store Module
//!
//! The quantized in-memory backing store of the device.
//!
//! ## Responsibilities
//! - Translate a linear offset into (node, slot, offset-in-quantum)
//! - Grow the node list, slot arrays and quanta lazily on write
//! - Copy at most one quantum per read or write call
//! - Release the whole structure on trim
//!
//! ## Layout
//! ```text
//!  nodes: Vec<QuantumSet>
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!  │ QuantumSet 0 │   │ QuantumSet 1 │   │ QuantumSet 2 │ ...
//!  └──────┬───────┘   └──────┬───────┘   └──────────────┘
//!         │ slots (qset_size)│
//!         ▼                  ▼
//!  ┌────┬────┬────┐   ┌────┬────┬────┐
//!  │ q0 │ -- │ q2 │   │ q0 │ q1 │ -- │    q = quantum_size bytes
//!  └────┴────┴────┘   └────┴────┴────┘    -- = never written
//! ```
//!
//! One node addresses `quantum_size * qset_size` bytes (the item size).

mod address;
mod budget;
mod qset;
mod quantized;

pub use address::Address;
pub use budget::MemoryBudget;
pub use quantized::QuantizedStore;
