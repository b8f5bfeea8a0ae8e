//! Point masses that rods attach to.

use nalgebra::Vector3;

use crate::geometry::SpherePoint;
use crate::RodId;

/// A mass located on the unit sphere together with the rods attached to it.
///
/// Mass is unconstrained: zero and negative values are accepted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Anchor {
    /// Location on the unit sphere.
    location: SpherePoint,
    /// Mass of the anchor.
    mass: f64,
    /// Incident rods in attachment order.
    rods: Vec<RodId>,
}

impl Anchor {
    /// Create an anchor with no attached rods.
    ///
    /// # Examples
    /// ```
    /// use spheretruss::{sphere_point, Anchor};
    ///
    /// let anchor = Anchor::new(sphere_point(0.0, 0.0), -2.0);
    /// assert_eq!(anchor.mass(), -2.0);
    /// assert!(anchor.rods().is_empty());
    /// ```
    #[must_use]
    pub fn new(location: SpherePoint, mass: f64) -> Self {
        Self {
            location,
            mass,
            rods: Vec::new(),
        }
    }

    /// Create an anchor from polar angles.
    #[must_use]
    pub fn from_polar(theta: f64, phi: f64, mass: f64) -> Self {
        Self::new(SpherePoint::from_polar(theta, phi), mass)
    }

    /// Create an anchor from rectangular coordinates projected onto the sphere.
    #[must_use]
    pub fn from_rectangular(x: f64, y: f64, z: f64, mass: f64) -> Self {
        Self::new(SpherePoint::from_rectangular(x, y, z), mass)
    }

    /// Location of the anchor.
    #[must_use]
    pub fn location(&self) -> SpherePoint {
        self.location
    }

    /// Mass of the anchor.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Rectangular position of the anchor.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        self.location.to_vector()
    }

    /// Rods attached to this anchor, in attachment order.
    #[must_use]
    pub fn rods(&self) -> &[RodId] {
        &self.rods
    }

    /// Move the anchor across the sphere by the given angles.
    pub fn translate(&mut self, d_theta: f64, d_phi: f64) {
        self.location.rotate(d_theta, d_phi);
    }

    /// Replace the mass of the anchor.
    pub fn resize(&mut self, mass: f64) {
        self.mass = mass;
    }

    /// Append a rod to the incidence list.
    pub fn add_rod(&mut self, rod: RodId) {
        self.rods.push(rod);
    }

    /// Empty the incidence list, returning the rods it held.
    pub(crate) fn take_rods(&mut self) -> Vec<RodId> {
        std::mem::take(&mut self.rods)
    }

    /// Remove the rod at `index`, returning `None` when the index is out of range.
    pub fn remove_rod_at(&mut self, index: usize) -> Option<RodId> {
        (index < self.rods.len()).then(|| self.rods.remove(index))
    }

    /// Remove the first occurrence of `rod`, returning whether it was present.
    pub fn remove_rod(&mut self, rod: RodId) -> bool {
        match self.rods.iter().position(|&listed| listed == rod) {
            Some(index) => {
                self.rods.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use petgraph::stable_graph::EdgeIndex;

    use super::*;

    fn rod(index: usize) -> RodId {
        RodId::new(EdgeIndex::new(index), 0)
    }

    #[test]
    fn default_anchor_is_massless_at_north_pole() {
        let anchor = Anchor::default();
        assert_eq!(anchor.location(), SpherePoint::north_pole());
        assert_eq!(anchor.mass(), 0.0);
        assert!(anchor.rods().is_empty());
    }

    #[test]
    fn constructors_normalize_location() {
        let polar = Anchor::from_polar(-FRAC_PI_2, 0.0, 1.0);
        assert_abs_diff_eq!(polar.location().theta(), FRAC_PI_2, epsilon = 1.0e-12);
        let rectangular = Anchor::from_rectangular(0.0, 0.0, 5.0, 1.0);
        assert_abs_diff_eq!(rectangular.position(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn translate_and_resize() {
        let mut anchor = Anchor::new(SpherePoint::north_pole(), 1.0);
        anchor.translate(FRAC_PI_2, FRAC_PI_2);
        assert_abs_diff_eq!(anchor.position().y, 1.0, epsilon = 1.0e-12);
        anchor.resize(0.0);
        assert_eq!(anchor.mass(), 0.0);
        anchor.resize(-4.5);
        assert_eq!(anchor.mass(), -4.5);
    }

    #[test]
    fn removing_out_of_range_index_leaves_list_untouched() {
        let mut anchor = Anchor::default();
        anchor.add_rod(rod(0));
        anchor.add_rod(rod(1));

        assert_eq!(anchor.remove_rod_at(2), None);
        assert_eq!(anchor.rods(), &[rod(0), rod(1)]);

        assert_eq!(anchor.remove_rod_at(0), Some(rod(0)));
        assert_eq!(anchor.rods(), &[rod(1)]);
    }

    #[test]
    fn removing_by_identity() {
        let mut anchor = Anchor::default();
        anchor.add_rod(rod(3));
        anchor.add_rod(rod(4));

        assert!(!anchor.remove_rod(rod(9)));
        assert_eq!(anchor.rods().len(), 2);
        assert!(anchor.remove_rod(rod(3)));
        assert_eq!(anchor.rods(), &[rod(4)]);
    }
}
