use std::f64::consts::{FRAC_PI_2, TAU};

use spheretruss::{sphere_point, Anchor, AnchorId, RodId, Structure, StructureEditError};
use thiserror::Error;
use tracing::info;

use crate::config::DemoConfig;

/// Handles into the demonstration structure, exposed for reporting.
#[derive(Debug, Clone)]
pub struct RingScene {
    /// Anchors on the equator in order of increasing azimuth.
    pub ring: Vec<AnchorId>,
    /// Rods joining consecutive ring anchors, including the closing rod.
    pub ring_rods: Vec<RodId>,
    /// Rod hanging off the first ring anchor.
    pub pendant: RodId,
    /// Free end of the pendant rod.
    pub pendant_anchor: AnchorId,
}

/// Error returned when the demonstration structure cannot be built.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    /// The pendant needs a ring anchor to hang from.
    #[error("the ring needs at least one anchor")]
    EmptyRing,
    /// An edit on the structure was rejected.
    #[error(transparent)]
    Edit(#[from] StructureEditError),
}

/// Build an equatorial ring of anchors with a single pendant rod.
///
/// Every cached extensibility value is refreshed before returning.
pub fn build_ring_structure(config: &DemoConfig) -> Result<(Structure, RingScene), SceneError> {
    let mut structure = Structure::new();

    // Space the anchors evenly around the equator so every rod has the same
    // arc length.
    let ring: Vec<AnchorId> = (0..config.ring_size)
        .map(|index| {
            let phi = TAU * index as f64 / config.ring_size as f64;
            structure.add_anchor(Anchor::new(
                sphere_point(FRAC_PI_2, phi),
                config.anchor_mass,
            ))
        })
        .collect();

    let mut ring_rods = Vec::with_capacity(ring.len());
    for pair in ring.windows(2) {
        ring_rods.push(structure.add_rod(pair[0], pair[1])?);
    }
    let (Some(&first), Some(&last)) = (ring.first(), ring.last()) else {
        return Err(SceneError::EmptyRing);
    };
    // Two anchors are already joined; a third rod is needed to form a loop.
    if config.close_ring && ring.len() >= 3 {
        ring_rods.push(structure.add_rod(last, first)?);
    }

    // The pendant leans north from the first ring anchor.
    let (pendant, pendant_anchor) =
        structure.add_rod_with_offset(first, -config.spoke_offset, 0.0, config.anchor_mass)?;

    let changed = structure.recompute_all();
    info!(
        anchors = structure.anchor_count(),
        rods = structure.rod_count(),
        changed,
        "built ring structure"
    );

    Ok((
        structure,
        RingScene {
            ring,
            ring_rods,
            pendant,
            pendant_anchor,
        },
    ))
}
