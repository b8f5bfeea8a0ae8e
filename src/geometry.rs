//! Positions on the unit sphere.
//!
//! Points are stored as a canonical `(theta, phi)` pair: `theta` is the polar
//! angle measured from the north pole in `[0, π]` and `phi` is the azimuth
//! measured from the X axis in `[0, 2π)`. Rectangular coordinates are derived
//! on demand, see
//! <https://en.wikipedia.org/wiki/Spherical_coordinate_system#Coordinate_system_conversions>.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use nalgebra::Vector3;
use tracing::warn;

/// Absolute tolerance used when comparing angles and coordinates.
pub const COORDINATE_TOLERANCE: f64 = 5.0e-10;

/// Rectangular averages shorter than this are treated as the centre of the sphere.
pub const ANTIPODAL_TOLERANCE: f64 = 1.0e-12;

/// A point on the unit sphere held in canonical polar form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpherePoint {
    /// Inclination from the north pole in radians.
    theta: f64,
    /// Azimuth from the X axis in radians.
    phi: f64,
}

impl Default for SpherePoint {
    fn default() -> Self {
        Self::north_pole()
    }
}

impl SpherePoint {
    /// The north pole, `(theta, phi) = (0, 0)`.
    #[must_use]
    pub const fn north_pole() -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
        }
    }

    /// Create a point from polar angles, normalizing them into canonical range.
    ///
    /// # Examples
    /// ```
    /// use std::f64::consts::PI;
    /// use spheretruss::SpherePoint;
    ///
    /// let point = SpherePoint::from_polar(1.5 * PI, 3.5 * PI);
    /// assert!((point.theta() - PI / 2.0).abs() < 1.0e-12);
    /// assert!((point.phi() - PI / 2.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn from_polar(theta: f64, phi: f64) -> Self {
        let (theta, phi) = canonicalize(theta, phi);
        Self { theta, phi }
    }

    /// Create a point from rectangular coordinates, projecting them onto the sphere.
    ///
    /// The zero vector has no direction and maps to the north pole. Any other
    /// finite vector keeps its direction regardless of magnitude.
    ///
    /// # Examples
    /// ```
    /// use spheretruss::SpherePoint;
    ///
    /// assert_eq!(SpherePoint::from_rectangular(0.0, 0.0, 0.0), SpherePoint::north_pole());
    /// let east = SpherePoint::from_rectangular(0.0, 2.0, 0.0);
    /// assert!((east.y() - 1.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn from_rectangular(x: f64, y: f64, z: f64) -> Self {
        Self::from_vector(Vector3::new(x, y, z))
    }

    /// Create a point from the direction of `vector`.
    #[must_use]
    pub fn from_vector(vector: Vector3<f64>) -> Self {
        if !vector.iter().all(|component| component.is_finite()) {
            warn!(?vector, "non-finite rectangular input mapped to the north pole");
            return Self::north_pole();
        }
        // Scale by the largest component first so the norm neither overflows
        // nor underflows.
        let scale = vector.amax();
        if scale == 0.0 {
            return Self::north_pole();
        }
        let unit = (vector / scale).normalize();

        let theta = unit.z.clamp(-1.0, 1.0).acos();
        let phi = if unit.x == 0.0 {
            if unit.y < 0.0 {
                3.0 * FRAC_PI_2
            } else if unit.y > 0.0 {
                FRAC_PI_2
            } else {
                0.0
            }
        } else {
            unit.y.atan2(unit.x)
        };
        Self::from_polar(theta, phi)
    }

    /// Polar angle in `[0, π]`.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Azimuth in `[0, 2π)`.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Rectangular X coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.theta.sin() * self.phi.cos()
    }

    /// Rectangular Y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.theta.sin() * self.phi.sin()
    }

    /// Rectangular Z coordinate.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.theta.cos()
    }

    /// Convert the point into a unit vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x(), self.y(), self.z())
    }

    /// Move the point by the given angular deltas and renormalize.
    pub fn rotate(&mut self, d_theta: f64, d_phi: f64) {
        let (theta, phi) = canonicalize(self.theta + d_theta, self.phi + d_phi);
        self.theta = theta;
        self.phi = phi;
    }

    /// Return a copy of the point moved by the given angular deltas.
    #[must_use]
    pub fn rotated(mut self, d_theta: f64, d_phi: f64) -> Self {
        self.rotate(d_theta, d_phi);
        self
    }

    /// Midpoint between `self` and `other` along the sphere.
    ///
    /// Antipodal points have no unique midpoint; for those the polar angles are
    /// averaged instead, which puts the midpoint of the two poles on the equator.
    ///
    /// # Examples
    /// ```
    /// use std::f64::consts::PI;
    /// use spheretruss::SpherePoint;
    ///
    /// let north = SpherePoint::from_polar(0.0, 0.0);
    /// let south = SpherePoint::from_polar(PI, 0.0);
    /// assert!((north.midpoint(&south).theta() - PI / 2.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn midpoint(&self, other: &SpherePoint) -> SpherePoint {
        let average = (self.to_vector() + other.to_vector()) / 2.0;
        if average.norm() < ANTIPODAL_TOLERANCE {
            return Self::from_polar(
                (self.theta + other.theta) / 2.0,
                (self.phi + other.phi) / 2.0,
            );
        }
        Self::from_vector(average)
    }

    /// Great-circle distance to `other` in radians.
    #[must_use]
    pub fn arc_to(&self, other: &SpherePoint) -> f64 {
        let a = self.to_vector();
        let b = other.to_vector();
        a.cross(&b).norm().atan2(a.dot(&b))
    }

    /// Average of a set of points projected back onto the sphere.
    ///
    /// Returns `None` when `points` is empty. A set whose average is the centre
    /// of the sphere yields the north pole.
    #[must_use]
    pub fn centroid<'a, I>(points: I) -> Option<SpherePoint>
    where
        I: IntoIterator<Item = &'a SpherePoint>,
    {
        let mut sum = Vector3::zeros();
        let mut count = 0_usize;
        for point in points {
            sum += point.to_vector();
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::from_vector(sum / count as f64))
    }

    /// Compare two points by position within [`COORDINATE_TOLERANCE`].
    ///
    /// Positions are compared rectangularly so that every azimuth at a pole is
    /// considered the same point.
    #[must_use]
    pub fn approx_eq(&self, other: &SpherePoint) -> bool {
        (self.to_vector() - other.to_vector())
            .iter()
            .all(|delta| delta.abs() <= COORDINATE_TOLERANCE)
    }
}

impl From<Vector3<f64>> for SpherePoint {
    fn from(value: Vector3<f64>) -> Self {
        Self::from_vector(value)
    }
}

impl From<SpherePoint> for Vector3<f64> {
    fn from(value: SpherePoint) -> Self {
        value.to_vector()
    }
}

impl fmt::Display for SpherePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}) [theta = {:.6}π, phi = {:.6}π]",
            self.x(),
            self.y(),
            self.z(),
            self.theta / PI,
            self.phi / PI
        )
    }
}

/// Convenience helper for creating [`SpherePoint`] instances from polar angles.
///
/// # Examples
/// ```
/// use spheretruss::sphere_point;
///
/// let pole = sphere_point(0.0, 0.0);
/// assert_eq!(pole.z(), 1.0);
/// ```
#[must_use]
pub fn sphere_point(theta: f64, phi: f64) -> SpherePoint {
    SpherePoint::from_polar(theta, phi)
}

/// Bring a polar pair into canonical range.
///
/// A negative or over-long `theta` is reflected through the pole, which turns
/// the azimuth by half a revolution.
fn canonicalize(theta: f64, phi: f64) -> (f64, f64) {
    if !theta.is_finite() || !phi.is_finite() {
        warn!(theta, phi, "non-finite polar input mapped to the north pole");
        return (0.0, 0.0);
    }

    let mut theta = theta.rem_euclid(TAU);
    let mut phi = phi;
    if theta > PI {
        theta = TAU - theta;
        phi += PI;
    }

    phi = phi.rem_euclid(TAU);
    if phi >= TAU {
        phi -= TAU;
    }
    (theta, phi)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn default_is_north_pole() {
        let point = SpherePoint::default();
        assert_eq!(point.theta(), 0.0);
        assert_eq!(point.phi(), 0.0);
        assert_abs_diff_eq!(point.x(), 0.0);
        assert_abs_diff_eq!(point.y(), 0.0);
        assert_abs_diff_eq!(point.z(), 1.0);
    }

    #[test]
    fn poles_have_expected_rectangular_form() {
        let north = sphere_point(0.0, 0.0);
        assert_abs_diff_eq!(
            north.to_vector(),
            Vector3::new(0.0, 0.0, 1.0),
            epsilon = COORDINATE_TOLERANCE
        );
        let south = sphere_point(PI, 0.0);
        assert_abs_diff_eq!(
            south.to_vector(),
            Vector3::new(0.0, 0.0, -1.0),
            epsilon = COORDINATE_TOLERANCE
        );
    }

    #[test]
    fn equatorial_point_lies_on_y_axis() {
        let point = sphere_point(FRAC_PI_2, FRAC_PI_2);
        assert_abs_diff_eq!(point.theta(), FRAC_PI_2);
        assert_abs_diff_eq!(point.phi(), FRAC_PI_2);
        assert_abs_diff_eq!(point.x(), 0.0, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(point.y(), 1.0, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(point.z(), 0.0, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn out_of_range_angles_are_normalized() {
        let point = sphere_point(1.5 * PI, 3.5 * PI);
        assert_abs_diff_eq!(point.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(point.phi(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);

        let reflected = sphere_point(-0.25 * PI, 0.0);
        assert_abs_diff_eq!(reflected.theta(), 0.25 * PI, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(reflected.phi(), PI, epsilon = COORDINATE_TOLERANCE);

        let wrapped = sphere_point(-2.5 * PI, -0.5 * PI);
        assert_abs_diff_eq!(wrapped.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(wrapped.phi(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);

        let full_turn = sphere_point(1.0, TAU);
        assert_abs_diff_eq!(full_turn.phi(), 0.0, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let inputs = [
            (0.0, 0.0),
            (PI, 0.0),
            (-7.3, 12.9),
            (4.0, -1.0),
            (100.0, -250.0),
            (FRAC_PI_2, TAU - 1.0e-9),
            (-1.0e-18, -1.0e-18),
        ];
        for (theta, phi) in inputs {
            let (theta, phi) = canonicalize(theta, phi);
            assert!((0.0..=PI).contains(&theta), "theta {theta} out of range");
            assert!((0.0..TAU).contains(&phi), "phi {phi} out of range");
            let (again_theta, again_phi) = canonicalize(theta, phi);
            assert_abs_diff_eq!(again_theta, theta, epsilon = COORDINATE_TOLERANCE);
            assert_abs_diff_eq!(again_phi, phi, epsilon = COORDINATE_TOLERANCE);
        }
    }

    #[test]
    fn polar_rectangular_round_trip_in_every_quadrant() {
        for (theta, phi) in [(1.0, 0.5), (1.0, 2.0), (2.0, 4.0), (0.3, 5.5)] {
            let point = sphere_point(theta, phi);
            let back = SpherePoint::from_rectangular(point.x(), point.y(), point.z());
            assert_abs_diff_eq!(back.theta(), theta, epsilon = COORDINATE_TOLERANCE);
            assert_abs_diff_eq!(back.phi(), phi, epsilon = COORDINATE_TOLERANCE);
        }
    }

    #[test]
    fn rectangular_axes_special_cases() {
        let negative_y = SpherePoint::from_rectangular(0.0, -3.0, 0.0);
        assert_abs_diff_eq!(negative_y.phi(), 3.0 * FRAC_PI_2);
        let positive_y = SpherePoint::from_rectangular(0.0, 0.5, 0.0);
        assert_abs_diff_eq!(positive_y.phi(), FRAC_PI_2);
        let south = SpherePoint::from_rectangular(0.0, 0.0, -4.0);
        assert_abs_diff_eq!(south.theta(), PI);
        assert_eq!(south.phi(), 0.0);
        let negative_x = SpherePoint::from_rectangular(-1.0, 0.0, 0.0);
        assert_abs_diff_eq!(negative_x.phi(), PI);
    }

    #[test]
    fn degenerate_input_falls_back_to_north_pole() {
        let pole = SpherePoint::north_pole();
        assert_eq!(SpherePoint::from_rectangular(0.0, 0.0, 0.0), pole);
        assert_eq!(SpherePoint::from_rectangular(f64::NAN, 1.0, 0.0), pole);
        assert_eq!(SpherePoint::from_rectangular(-0.0, 0.0, -0.0), pole);
        assert_eq!(sphere_point(f64::INFINITY, 0.0), pole);
    }

    #[test]
    fn extreme_magnitudes_keep_their_direction() {
        let huge_north = SpherePoint::from_rectangular(0.0, 0.0, 1.0e200);
        assert_eq!(huge_north, SpherePoint::north_pole());

        let huge_south = SpherePoint::from_rectangular(0.0, 0.0, -1.0e300);
        assert_abs_diff_eq!(huge_south.theta(), PI);

        let tiny = SpherePoint::from_rectangular(0.0, -1.0e-300, 0.0);
        assert_abs_diff_eq!(tiny.theta(), FRAC_PI_2);
        assert_abs_diff_eq!(tiny.phi(), 3.0 * FRAC_PI_2);

        let tiny_x = SpherePoint::from_rectangular(1.0e-300, 0.0, 0.0);
        assert_abs_diff_eq!(tiny_x.theta(), FRAC_PI_2);
        assert_eq!(tiny_x.phi(), 0.0);

        let huge_diagonal = SpherePoint::from_rectangular(f64::MAX, f64::MAX, 0.0);
        assert_abs_diff_eq!(huge_diagonal.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(huge_diagonal.phi(), PI / 4.0, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn rotate_renormalizes() {
        let mut point = sphere_point(FRAC_PI_2, 0.0);
        point.rotate(PI, -FRAC_PI_2);
        assert_abs_diff_eq!(point.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(point.phi(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn midpoint_of_neighbours_lies_between_them() {
        let a = sphere_point(FRAC_PI_2, 0.0);
        let b = sphere_point(FRAC_PI_2, FRAC_PI_2);
        let mid = a.midpoint(&b);
        assert_abs_diff_eq!(mid.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(mid.phi(), PI / 4.0, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(mid.arc_to(&a), mid.arc_to(&b), epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn midpoint_across_the_prime_meridian() {
        let a = sphere_point(FRAC_PI_2, 0.1);
        let b = sphere_point(FRAC_PI_2, TAU - 0.1);
        let mid = a.midpoint(&b);
        assert!(mid.approx_eq(&sphere_point(FRAC_PI_2, 0.0)));
    }

    #[test]
    fn midpoint_of_poles_is_on_the_equator() {
        let north = sphere_point(0.0, 0.0);
        let south = sphere_point(PI, 0.0);
        let mid = north.midpoint(&south);
        assert_abs_diff_eq!(mid.theta(), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(mid.phi(), 0.0, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn arc_length_between_pole_and_equator() {
        let north = SpherePoint::north_pole();
        let equator = sphere_point(FRAC_PI_2, 1.0);
        assert_abs_diff_eq!(north.arc_to(&equator), FRAC_PI_2, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(north.arc_to(&north), 0.0, epsilon = COORDINATE_TOLERANCE);
    }

    #[test]
    fn centroid_of_points() {
        assert!(SpherePoint::centroid(std::iter::empty()).is_none());

        let points = [
            sphere_point(FRAC_PI_2, 0.0),
            sphere_point(FRAC_PI_2, FRAC_PI_2),
            SpherePoint::north_pole(),
        ];
        let centroid = SpherePoint::centroid(&points).expect("non-empty set");
        assert_abs_diff_eq!(centroid.phi(), PI / 4.0, epsilon = COORDINATE_TOLERANCE);
        assert_abs_diff_eq!(
            centroid.z(),
            1.0 / 3.0_f64.sqrt(),
            epsilon = COORDINATE_TOLERANCE
        );
    }

    #[test]
    fn poles_compare_equal_regardless_of_azimuth() {
        assert!(sphere_point(0.0, 1.0).approx_eq(&sphere_point(0.0, 4.0)));
        assert!(!sphere_point(0.1, 1.0).approx_eq(&sphere_point(0.1, 4.0)));
    }

    #[test]
    fn display_reports_both_forms() {
        let text = sphere_point(FRAC_PI_2, PI).to_string();
        assert!(text.contains("theta = 0.500000π"));
        assert!(text.contains("phi = 1.000000π"));
    }
}
