//! Generation-checked handles into a structure.
//!
//! The graph underneath a [`Structure`](crate::Structure) recycles the slot of a
//! removed anchor or rod for the next one added. Each handle therefore carries
//! the generation of its slot, and a handle whose slot has since been reused no
//! longer resolves.

use petgraph::stable_graph::{EdgeIndex, NodeIndex};

/// Handle of an anchor within a [`Structure`](crate::Structure).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorId {
    /// Slot of the anchor in the graph.
    pub(crate) node: NodeIndex,
    /// Number of times the slot had been vacated when the anchor was added.
    pub(crate) generation: u32,
}

impl AnchorId {
    /// Build a handle for the given slot and generation.
    pub(crate) fn new(node: NodeIndex, generation: u32) -> Self {
        Self { node, generation }
    }

    /// Slot number of the anchor.
    #[must_use]
    pub fn index(self) -> usize {
        self.node.index()
    }

    /// Generation of the slot the handle refers to.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Handle of a rod within a [`Structure`](crate::Structure).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RodId {
    /// Slot of the rod in the graph.
    pub(crate) edge: EdgeIndex,
    /// Number of times the slot had been vacated when the rod was added.
    pub(crate) generation: u32,
}

impl RodId {
    /// Build a handle for the given slot and generation.
    pub(crate) fn new(edge: EdgeIndex, generation: u32) -> Self {
        Self { edge, generation }
    }

    /// Slot number of the rod.
    #[must_use]
    pub fn index(self) -> usize {
        self.edge.index()
    }

    /// Generation of the slot the handle refers to.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Per-slot generation counters.
#[derive(Clone, Debug, Default)]
pub(crate) struct Generations(Vec<u32>);

impl Generations {
    /// Generation of a slot; slots never vacated are at zero.
    pub(crate) fn current(&self, slot: usize) -> u32 {
        self.0.get(slot).copied().unwrap_or(0)
    }

    /// Advance a slot so that handles issued for it stop resolving.
    pub(crate) fn retire(&mut self, slot: usize) {
        if slot >= self.0.len() {
            self.0.resize(slot + 1, 0);
        }
        self.0[slot] = self.0[slot].wrapping_add(1);
    }
}
