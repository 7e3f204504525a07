//! Quantum set node
//!
//! A node owns an optional array of `qset_size` slots; each slot owns an
//! optional quantum buffer. Both levels are allocated on first write.

use std::mem;

use crate::error::{Result, ScullError};

use super::MemoryBudget;

/// A single quantum buffer
type Quantum = Box<[u8]>;

/// Accounting cost of one node
pub(crate) const NODE_COST: usize = mem::size_of::<QuantumSet>();

/// Accounting cost of one slot in a slot array
const SLOT_COST: usize = mem::size_of::<Option<Quantum>>();

/// One node of the store: slot array plus its quanta
#[derive(Default)]
pub(crate) struct QuantumSet {
    data: Option<Vec<Option<Quantum>>>,
}

impl QuantumSet {
    /// A node with no slot array yet
    pub fn new() -> Self {
        Self::default()
    }

    /// The quantum at `slot`, if it was ever written
    pub fn quantum(&self, slot: usize) -> Option<&[u8]> {
        self.data.as_ref()?.get(slot)?.as_deref()
    }

    /// The quantum at `slot`, allocating the slot array and quantum if absent
    ///
    /// A slot array allocated here stays attached even if the quantum
    /// allocation that follows fails.
    pub fn quantum_mut(
        &mut self,
        slot: usize,
        qset_size: usize,
        quantum_size: usize,
        budget: &mut MemoryBudget,
    ) -> Result<&mut [u8]> {
        if self.data.is_none() {
            self.data = Some(alloc_slots(qset_size, budget)?);
        }

        let slots = self.data.get_or_insert_with(Vec::new);
        let entry = slots.get_mut(slot).ok_or_else(|| {
            ScullError::InvalidArgument(format!("slot {} outside quantum set of {}", slot, qset_size))
        })?;

        if entry.is_none() {
            *entry = Some(alloc_quantum(quantum_size, budget)?);
        }

        Ok(&mut entry.get_or_insert_with(Box::default)[..])
    }

    /// Whether the slot array has been allocated
    pub fn has_slots(&self) -> bool {
        self.data.is_some()
    }

    /// Number of allocated quanta in this node
    pub fn quantum_count(&self) -> usize {
        self.data
            .as_ref()
            .map(|slots| slots.iter().filter(|q| q.is_some()).count())
            .unwrap_or(0)
    }
}

/// Allocate a zeroed slot array of `qset_size` empty slots
fn alloc_slots(qset_size: usize, budget: &mut MemoryBudget) -> Result<Vec<Option<Quantum>>> {
    let bytes = qset_size.saturating_mul(SLOT_COST);
    budget.charge(bytes)?;

    let mut slots = Vec::new();
    if slots.try_reserve_exact(qset_size).is_err() {
        budget.release(bytes);
        tracing::warn!(bytes, "slot array allocation failed");
        return Err(ScullError::OutOfMemory { requested: bytes });
    }
    slots.resize_with(qset_size, || None);
    Ok(slots)
}

/// Allocate a zero-filled quantum
fn alloc_quantum(quantum_size: usize, budget: &mut MemoryBudget) -> Result<Quantum> {
    budget.charge(quantum_size)?;

    let mut buf = Vec::new();
    if buf.try_reserve_exact(quantum_size).is_err() {
        budget.release(quantum_size);
        tracing::warn!(bytes = quantum_size, "quantum allocation failed");
        return Err(ScullError::OutOfMemory { requested: quantum_size });
    }
    buf.resize(quantum_size, 0);
    Ok(buf.into_boxed_slice())
}
