#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod anchor;
pub mod errors;
pub mod geometry;
pub mod handle;
pub mod rod;
pub mod structure;

pub use anchor::Anchor;
pub use errors::{ConsistencyError, StructureEditError};
pub use geometry::{sphere_point, SpherePoint, ANTIPODAL_TOLERANCE, COORDINATE_TOLERANCE};
pub use handle::{AnchorId, RodId};
pub use rod::RodSnapshot;
pub use structure::Structure;

