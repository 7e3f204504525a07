//! Offset translation

/// Location of a byte inside the node list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Index of the quantum set node
    pub node: usize,

    /// Slot within the node's quantum array
    pub slot: usize,

    /// Byte offset within the quantum
    pub offset: usize,
}

impl Address {
    /// Split a linear offset into node, slot and intra-quantum offset
    ///
    /// Returns `None` when the node index does not fit in `usize`.
    pub fn translate(pos: u64, quantum_size: usize, qset_size: usize) -> Option<Self> {
        let quantum = quantum_size as u64;
        let item_size = quantum * qset_size as u64;

        let node = usize::try_from(pos / item_size).ok()?;
        let rest = pos % item_size;

        Some(Self {
            node,
            slot: (rest / quantum) as usize,
            offset: (rest % quantum) as usize,
        })
    }
}
