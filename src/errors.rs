//! Error types produced while editing or inspecting structures.

use thiserror::Error;

use crate::{AnchorId, RodId};

/// Error returned when editing a [`Structure`](crate::Structure) with invalid handles.
///
/// # Examples
///
/// ```
/// use spheretruss::{Anchor, Structure, StructureEditError};
///
/// let mut structure = Structure::new();
/// let missing = structure.add_anchor(Anchor::default());
/// structure.remove_anchor(missing)?;
/// let error = structure
///     .resize_anchor(missing, 2.0)
///     .expect_err("unknown anchor is rejected");
/// assert_eq!(error, StructureEditError::UnknownAnchor(missing));
/// # Ok::<(), StructureEditError>(())
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum StructureEditError {
    /// Returned when an anchor cannot be found in the structure.
    #[error("anchor {0:?} does not exist in this structure")]
    UnknownAnchor(AnchorId),
    /// Returned when a rod cannot be found in the structure.
    #[error("rod {0:?} does not exist in this structure")]
    UnknownRod(RodId),
    /// Returned when a rod would connect an anchor to itself.
    #[error("a rod cannot start and end at anchor {0:?}")]
    SelfLoop(AnchorId),
}

/// A broken link between a rod and the incidence lists of its anchors.
///
/// Reported by [`Structure::check_consistency`](crate::Structure::check_consistency).
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConsistencyError {
    /// A rod endpoint does not list the rod among its incident rods.
    #[error("anchor {anchor:?} does not list its rod {rod:?}")]
    MissingIncidence {
        /// The rod that is not registered.
        rod: RodId,
        /// The endpoint missing the registration.
        anchor: AnchorId,
    },
    /// An anchor lists a rod that does not exist or does not end at the anchor.
    #[error("anchor {anchor:?} lists rod {rod:?} which is not attached to it")]
    StrayIncidence {
        /// The anchor holding the stale entry.
        anchor: AnchorId,
        /// The listed rod.
        rod: RodId,
    },
    /// An anchor lists the same rod more than once.
    #[error("anchor {anchor:?} lists rod {rod:?} more than once")]
    DuplicateIncidence {
        /// The anchor holding the duplicate entry.
        anchor: AnchorId,
        /// The duplicated rod.
        rod: RodId,
    },
}
