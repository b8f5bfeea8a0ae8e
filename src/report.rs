use std::fmt::Write;

use spheretruss::{Structure, StructureEditError};

use crate::scene::RingScene;

/// Render a textual summary of the demonstration structure.
///
/// Each rod is listed with its endpoints, arc length, midpoint and cached
/// extensibility.
pub fn render_summary(
    structure: &Structure,
    scene: &RingScene,
) -> Result<String, StructureEditError> {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Ring of {} anchors and {} rods with a pendant (total mass = {:.2})",
        scene.ring.len(),
        scene.ring_rods.len(),
        structure.total_mass()
    )
    .expect("writing to string cannot fail");

    for rod in structure.rods() {
        let status = if rod.extensible {
            "extensible"
        } else {
            "locked"
        };
        let stale = if rod.stale { " (stale)" } else { "" };
        writeln!(
            &mut output,
            "rod {}: anchor {} -> anchor {}, arc = {:.4} rad, midpoint {}, {status}{stale}",
            rod.id.index(),
            rod.head.index(),
            rod.tail.index(),
            structure.rod_arc_length(rod.id)?,
            structure.rod_midpoint(rod.id)?,
        )
        .expect("writing to string cannot fail");
    }

    if let Some(pendant) = structure.anchor(scene.pendant_anchor) {
        writeln!(
            &mut output,
            "Pendant rod {} ends at {}",
            scene.pendant.index(),
            pendant.location()
        )
        .expect("writing to string cannot fail");
    }

    Ok(output)
}
