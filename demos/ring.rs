use std::f64::consts::{FRAC_PI_2, TAU};

use spheretruss::{sphere_point, Anchor, Structure};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut structure = Structure::new();
    let ring: Vec<_> = (0..5)
        .map(|index| {
            let phi = TAU * f64::from(index) / 5.0;
            structure.add_anchor(Anchor::new(sphere_point(FRAC_PI_2, phi), 1.0))
        })
        .collect();
    for (index, &anchor) in ring.iter().enumerate() {
        structure.add_rod(anchor, ring[(index + 1) % ring.len()])?;
    }
    structure.add_rod_with_offset(ring[0], -0.4, 0.0, 0.5)?;
    structure.recompute_all();

    for rod in structure.rods() {
        println!(
            "rod {}: {:?} -> {:?}, extensible = {}",
            rod.id.index(),
            rod.head_position,
            rod.tail_position,
            rod.extensible
        );
    }

    Ok(())
}
