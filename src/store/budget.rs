//! Allocation accounting
//!
//! Tracks the bytes the store holds so an optional cap can turn growth
//! into `OutOfMemory` before the system allocator is asked.

use crate::error::{Result, ScullError};

/// Byte budget for store allocations
#[derive(Debug, Clone)]
pub struct MemoryBudget {
    limit: Option<usize>,
    used: usize,
}

impl MemoryBudget {
    /// Create a budget; `None` means unbounded
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserve `bytes` against the limit
    pub fn charge(&mut self, bytes: usize) -> Result<()> {
        let used = self
            .used
            .checked_add(bytes)
            .ok_or(ScullError::OutOfMemory { requested: bytes })?;

        if let Some(limit) = self.limit {
            if used > limit {
                return Err(ScullError::OutOfMemory { requested: bytes });
            }
        }

        self.used = used;
        Ok(())
    }

    /// Give back bytes charged earlier
    pub fn release(&mut self, bytes: usize) {
        self.used = self.used.saturating_sub(bytes);
    }

    /// Forget every charge (after the structure has been dropped)
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Bytes currently charged
    pub fn used(&self) -> usize {
        self.used
    }

    /// Configured cap
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_budget_accepts_charges() {
        let mut budget = MemoryBudget::new(None);
        assert_eq!(budget.limit(), None);
        budget.charge(1 << 30).unwrap();
        budget.charge(1 << 30).unwrap();
        assert_eq!(budget.used(), 2 << 30);
    }

    #[test]
    fn test_limit_rejects_and_keeps_usage() {
        let mut budget = MemoryBudget::new(Some(100));
        assert_eq!(budget.limit(), Some(100));
        budget.charge(60).unwrap();

        let err = budget.charge(50).unwrap_err();
        assert!(matches!(err, ScullError::OutOfMemory { requested: 50 }));
        assert_eq!(budget.used(), 60);

        budget.charge(40).unwrap();
        assert_eq!(budget.used(), 100);
    }

    #[test]
    fn test_release_and_reset() {
        let mut budget = MemoryBudget::new(Some(10));
        budget.charge(10).unwrap();
        budget.release(4);
        assert_eq!(budget.used(), 6);
        budget.reset();
        assert_eq!(budget.used(), 0);
    }
}
