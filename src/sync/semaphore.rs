//! Binary semaphore with interruptible acquire

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, ScullError};

use super::Interrupt;

/// Shared state of a semaphore; also referenced by parked interrupts
pub(crate) struct SemaphoreState {
    held: Mutex<bool>,
    released: Condvar,
}

impl SemaphoreState {
    /// Wake every sleeper so each re-checks its interrupt and the permit
    pub(super) fn wake_all(&self) {
        let _held = self.held.lock();
        self.released.notify_all();
    }
}

/// Binary semaphore (initial count 1)
///
/// At most one [`Permit`] exists at any time. Dropping the permit releases
/// the semaphore.
pub struct Semaphore {
    state: Arc<SemaphoreState>,
}

impl Semaphore {
    /// Create an available semaphore
    pub fn new() -> Self {
        Self {
            state: Arc::new(SemaphoreState {
                held: Mutex::new(false),
                released: Condvar::new(),
            }),
        }
    }

    /// Acquire, blocking until the permit is free or `interrupt` is raised
    ///
    /// Returns `ScullError::Interrupted` without acquiring if the token is
    /// raised before or during the wait.
    pub fn down_interruptible(&self, interrupt: &Interrupt) -> Result<Permit<'_>> {
        if interrupt.is_raised() {
            return Err(ScullError::Interrupted);
        }

        let mut held = self.state.held.lock();
        if !*held {
            *held = true;
            return Ok(Permit { semaphore: self });
        }

        interrupt.park_on(&self.state);
        loop {
            if interrupt.is_raised() {
                interrupt.unpark();
                tracing::debug!("semaphore wait interrupted");
                return Err(ScullError::Interrupted);
            }
            if !*held {
                *held = true;
                interrupt.unpark();
                return Ok(Permit { semaphore: self });
            }
            self.state.released.wait(&mut held);
        }
    }

    /// Acquire, blocking until the permit is free
    pub fn down(&self) -> Permit<'_> {
        let mut held = self.state.held.lock();
        while *held {
            self.state.released.wait(&mut held);
        }
        *held = true;
        Permit { semaphore: self }
    }

    /// Whether a permit is currently outstanding
    pub fn is_held(&self) -> bool {
        *self.state.held.lock()
    }

    fn up(&self) {
        let mut held = self.state.held.lock();
        *held = false;
        // interrupted sleepers leave without taking the permit, so wake them all
        self.state.released.notify_all();
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of holding the semaphore; releases it on drop
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.up();
    }
}
