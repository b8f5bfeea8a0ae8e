//! Rod payloads stored on the edges of a structure.

use nalgebra::Vector3;

use crate::{AnchorId, RodId};

/// Internal representation of a rod.
///
/// The endpoints live in the graph; the rod itself only carries the cached
/// result of the last extensibility traversal and the topology revision it
/// was computed against.
#[derive(Clone, Debug)]
pub(crate) struct Rod {
    /// Result of the most recent extensibility traversal.
    extensible: bool,
    /// Topology revision at the time `extensible` was computed.
    computed_at: u64,
}

impl Rod {
    /// Create a rod whose cache holds a value computed at `revision`.
    pub(crate) fn new(extensible: bool, revision: u64) -> Self {
        Self {
            extensible,
            computed_at: revision,
        }
    }

    /// Cached extensibility.
    pub(crate) fn extensible(&self) -> bool {
        self.extensible
    }

    /// The cache is stale once the topology has moved past the revision it was computed at.
    pub(crate) fn is_stale(&self, revision: u64) -> bool {
        self.computed_at != revision
    }

    /// Store a value computed at `revision`.
    pub(crate) fn refresh(&mut self, extensible: bool, revision: u64) {
        self.extensible = extensible;
        self.computed_at = revision;
    }
}

/// Read-only view of a rod for drawing and reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RodSnapshot {
    /// Handle of the rod.
    pub id: RodId,
    /// Anchor the rod starts at.
    pub head: AnchorId,
    /// Anchor the rod ends at.
    pub tail: AnchorId,
    /// Rectangular position of the head anchor.
    pub head_position: Vector3<f64>,
    /// Rectangular position of the tail anchor.
    pub tail_position: Vector3<f64>,
    /// Cached extensibility of the rod.
    pub extensible: bool,
    /// Whether the topology changed since `extensible` was computed.
    pub stale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_stale_after_revision_moves_on() {
        let mut rod = Rod::new(true, 3);
        assert!(!rod.is_stale(3));
        assert!(rod.is_stale(4));
        assert!(rod.extensible());

        rod.refresh(false, 4);
        assert!(!rod.is_stale(4));
        assert!(!rod.extensible());
    }
}
