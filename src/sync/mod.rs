//! Sync Module
//!
//! Blocking primitives whose waits can be cancelled from another thread.
//!
//! ## Responsibilities
//! - Binary semaphore guarding a device (one holder at a time)
//! - Per-caller interrupt token that aborts a blocked acquire
//!
//! ## Wakeup Model
//! A waiter records which semaphore it sleeps on inside its own
//! [`Interrupt`]. Raising the token takes that semaphore's state lock
//! before notifying, so the wakeup cannot slip between the waiter's
//! flag check and its sleep.

mod interrupt;
mod semaphore;

pub use interrupt::Interrupt;
pub use semaphore::{Permit, Semaphore};
