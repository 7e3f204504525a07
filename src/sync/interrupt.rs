//! Interrupt token
//!
//! Cancellation signal carried by one caller into blocking waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::semaphore::SemaphoreState;

/// Cancellation token for blocking waits
///
/// Clones share the same signal. A token is meant to be waited on by one
/// caller at a time; other clones only raise or clear it.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<InterruptInner>,
}

#[derive(Default)]
struct InterruptInner {
    raised: AtomicBool,

    /// Semaphore the owning caller is currently sleeping on
    parked_on: Mutex<Option<Arc<SemaphoreState>>>,
}

impl Interrupt {
    /// Create a token that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake the caller if it is blocked
    pub fn raise(&self) {
        self.inner.raised.store(true, Ordering::SeqCst);

        let parked = self.inner.parked_on.lock().clone();
        if let Some(state) = parked {
            state.wake_all();
        }
    }

    /// Clear the signal so the token can be reused
    pub fn clear(&self) {
        self.inner.raised.store(false, Ordering::SeqCst);
    }

    /// Whether the signal is currently raised
    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    pub(super) fn park_on(&self, state: &Arc<SemaphoreState>) {
        *self.inner.parked_on.lock() = Some(Arc::clone(state));
    }

    pub(super) fn unpark(&self) {
        *self.inner.parked_on.lock() = None;
    }
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("raised", &self.is_raised())
            .finish()
    }
}
