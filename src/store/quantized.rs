//! Quantized store implementation
//!
//! Node list, lazy growth, single-quantum copies and trim.

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Result, ScullError};
use crate::sync::{Interrupt, Semaphore};

use super::qset::{QuantumSet, NODE_COST};
use super::{Address, MemoryBudget};

/// The device's backing store
///
/// ## Concurrency:
/// - `sem`: binary semaphore serializing read, write, follow and trim.
///   Acquired with the caller's [`Interrupt`], so a blocked caller can be
///   cancelled.
/// - `state`: the data itself. Only locked while `sem` is held, except by
///   the read-only accessors, which take it briefly.
pub struct QuantizedStore {
    sem: Semaphore,
    state: Mutex<StoreState>,

    /// Geometry restored by trim
    default_quantum_size: usize,
    default_qset_size: usize,
}

struct StoreState {
    /// Nodes in sequence; node `i` addresses bytes `[i * item, (i + 1) * item)`
    nodes: Vec<QuantumSet>,

    /// Highest byte offset ever written + 1
    size: u64,

    quantum_size: usize,
    qset_size: usize,

    budget: MemoryBudget,
}

impl QuantizedStore {
    /// Create an empty store with the configured geometry
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            sem: Semaphore::new(),
            state: Mutex::new(StoreState {
                nodes: Vec::new(),
                size: 0,
                quantum_size: config.quantum_size,
                qset_size: config.qset_size,
                budget: MemoryBudget::new(config.memory_limit),
            }),
            default_quantum_size: config.quantum_size,
            default_qset_size: config.qset_size,
        })
    }

    /// Ensure node `n` exists, allocating it and every node before it
    ///
    /// On allocation failure the nodes already appended stay attached.
    pub fn follow(&self, n: usize, interrupt: &Interrupt) -> Result<()> {
        let _permit = self.sem.down_interruptible(interrupt)?;
        let mut state = self.state.lock();
        state.follow(n)?;
        Ok(())
    }

    /// Read up to `count` bytes at `pos` into `dest`
    ///
    /// Returns 0 at or past the end of data and for a quantum that was
    /// never written. Never copies across a quantum boundary.
    pub fn read(&self, pos: u64, dest: &mut [u8], count: usize, interrupt: &Interrupt) -> Result<usize> {
        let _permit = self.sem.down_interruptible(interrupt)?;
        let mut state = self.state.lock();

        if pos >= state.size {
            return Ok(0);
        }
        let count = (count as u64).min(state.size - pos) as usize;

        let quantum_size = state.quantum_size;
        let addr = state.translate(pos)?;

        let node = state.follow(addr.node)?;
        let quantum = match node.quantum(addr.slot) {
            Some(quantum) => quantum,
            None => {
                trace!(pos, node = addr.node, slot = addr.slot, "read of unwritten quantum");
                return Ok(0);
            }
        };

        let count = count.min(quantum_size - addr.offset);
        if count > dest.len() {
            return Err(ScullError::Fault {
                requested: count,
                available: dest.len(),
            });
        }

        dest[..count].copy_from_slice(&quantum[addr.offset..addr.offset + count]);
        Ok(count)
    }

    /// Write up to `count` bytes from `src` at `pos`
    ///
    /// Allocates the node, slot array and quantum on demand. Never copies
    /// across a quantum boundary. Extends `size` past the written bytes.
    pub fn write(&self, pos: u64, src: &[u8], count: usize, interrupt: &Interrupt) -> Result<usize> {
        let _permit = self.sem.down_interruptible(interrupt)?;
        let mut state = self.state.lock();

        let quantum_size = state.quantum_size;
        let addr = state.translate(pos)?;

        let quantum = state.quantum_mut(addr)?;

        let count = count.min(quantum_size - addr.offset);
        if count > src.len() {
            return Err(ScullError::Fault {
                requested: count,
                available: src.len(),
            });
        }
        let end = pos
            .checked_add(count as u64)
            .ok_or_else(|| ScullError::InvalidArgument(format!("write at {} overflows", pos)))?;

        quantum[addr.offset..addr.offset + count].copy_from_slice(&src[..count]);

        if end > state.size {
            state.size = end;
        }
        Ok(count)
    }

    /// Release every node, slot array and quantum and reset to empty
    pub fn trim(&self, interrupt: &Interrupt) -> Result<()> {
        let _permit = self.sem.down_interruptible(interrupt)?;
        self.trim_locked();
        Ok(())
    }

    /// Trim without an interruptible wait (teardown path)
    pub fn destroy(self) {
        let _permit = self.sem.down();
        self.trim_locked();
    }

    fn trim_locked(&self) {
        let mut state = self.state.lock();

        let nodes = std::mem::take(&mut state.nodes);
        if !nodes.is_empty() {
            let quanta: usize = nodes.iter().map(QuantumSet::quantum_count).sum();
            debug!(
                nodes = nodes.len(),
                quanta,
                bytes = state.budget.used(),
                size = state.size,
                "trimming store"
            );
        }
        drop(nodes);

        state.size = 0;
        state.quantum_size = self.default_quantum_size;
        state.qset_size = self.default_qset_size;
        state.budget.reset();
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Current logical size in bytes
    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    /// Number of quantum set nodes in the list
    pub fn node_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    /// Number of quanta allocated across all nodes
    pub fn quantum_count(&self) -> usize {
        self.state.lock().nodes.iter().map(QuantumSet::quantum_count).sum()
    }

    /// Whether the quantum at `(node, slot)` has been allocated
    pub fn has_quantum(&self, node: usize, slot: usize) -> bool {
        self.state
            .lock()
            .nodes
            .get(node)
            .map(|n| n.quantum(slot).is_some())
            .unwrap_or(false)
    }

    /// Bytes charged against the memory budget
    pub fn allocated_bytes(&self) -> usize {
        self.state.lock().budget.used()
    }

    /// Bytes per quantum
    pub fn quantum_size(&self) -> usize {
        self.state.lock().quantum_size
    }

    /// Quantum slots per node
    pub fn qset_size(&self) -> usize {
        self.state.lock().qset_size
    }

    /// Bytes addressable by one node
    pub fn item_size(&self) -> u64 {
        let state = self.state.lock();
        state.quantum_size as u64 * state.qset_size as u64
    }
}

impl StoreState {
    fn translate(&self, pos: u64) -> Result<Address> {
        Address::translate(pos, self.quantum_size, self.qset_size).ok_or(ScullError::OutOfMemory {
            requested: NODE_COST,
        })
    }

    /// Return node `n`, appending empty nodes up to and including it
    fn follow(&mut self, n: usize) -> Result<&mut QuantumSet> {
        while self.nodes.len() <= n {
            self.budget.charge(NODE_COST).map_err(|e| {
                warn!(node = self.nodes.len(), target = n, "node allocation refused");
                e
            })?;
            if self.nodes.try_reserve(1).is_err() {
                self.budget.release(NODE_COST);
                warn!(node = self.nodes.len(), target = n, "node allocation failed");
                return Err(ScullError::OutOfMemory { requested: NODE_COST });
            }
            self.nodes.push(QuantumSet::new());
            trace!(node = self.nodes.len() - 1, "allocated quantum set");
        }
        Ok(&mut self.nodes[n])
    }

    /// The quantum addressed by `addr`, allocating whatever is missing
    fn quantum_mut(&mut self, addr: Address) -> Result<&mut [u8]> {
        self.follow(addr.node)?;

        let StoreState {
            nodes,
            budget,
            quantum_size,
            qset_size,
            ..
        } = self;
        nodes[addr.node].quantum_mut(addr.slot, *qset_size, *quantum_size, budget)
    }
}
