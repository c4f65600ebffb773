//! Triangulation geometry
//!
//! The two laser modules sit on a rotating arm, `baseline_m` apart along
//! the pivot axis and `front_offset_m` behind the front face of the body.
//! Given both ranges and the arm angle, the length between the two target
//! points is the third side of the triangle they span.
//!
//! The formula is provisional until the housing geometry is measured. It
//! is continuous, symmetric under a left/right swap, and reduces to the
//! baseline when both lasers hit the same distance with the arm closed.

use libm::{cos, sqrt};

/// Fixed mechanical constants of the device
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Separation of the two modules along the pivot axis, in meters
    pub baseline_m: f64,
    /// Distance from the modules to the front face, in meters
    pub front_offset_m: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            baseline_m: 0.05,
            front_offset_m: 0.03,
        }
    }
}

impl Geometry {
    /// Length between the two target points, in meters
    ///
    /// `angle_deg` is the calibrated arm angle between the two beams.
    pub fn triangulate(&self, left_m: f64, right_m: f64, angle_deg: f64) -> f64 {
        let a = left_m + self.front_offset_m;
        let c = right_m + self.front_offset_m;
        let theta = angle_deg.to_radians();

        let planar_sq = a * a + c * c - 2.0 * a * c * cos(theta);
        // Rounding can push a degenerate triangle slightly negative
        let planar_sq = if planar_sq < 0.0 { 0.0 } else { planar_sq };

        sqrt(planar_sq + self.baseline_m * self.baseline_m)
    }

    /// Length measured by a single laser, in meters
    pub fn single_range(&self, range_m: f64) -> f64 {
        range_m + self.front_offset_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_closed_arm_equal_ranges_is_baseline() {
        let g = Geometry::default();
        assert!((g.triangulate(3.2, 3.2, 0.0) - g.baseline_m).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let g = Geometry {
            baseline_m: 0.0,
            front_offset_m: 0.0,
        };
        // 3-4-5 triangle
        assert!((g.triangulate(3.0, 4.0, 90.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_range_adds_front_offset() {
        let g = Geometry {
            baseline_m: 0.05,
            front_offset_m: 0.1,
        };
        assert!((g.single_range(2.0) - 2.1).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_symmetric_under_swap(
            a in 0.0f64..50.0,
            c in 0.0f64..50.0,
            theta in -180.0f64..180.0,
        ) {
            let g = Geometry::default();
            let lhs = g.triangulate(a, c, theta);
            let rhs = g.triangulate(c, a, -theta);
            prop_assert!((lhs - rhs).abs() < 1e-9);
        }

        #[test]
        fn prop_never_shorter_than_baseline(
            a in 0.0f64..50.0,
            c in 0.0f64..50.0,
            theta in 0.0f64..180.0,
        ) {
            let g = Geometry::default();
            prop_assert!(g.triangulate(a, c, theta) >= g.baseline_m - 1e-12);
        }

        #[test]
        fn prop_continuous_in_angle(
            a in 0.1f64..20.0,
            c in 0.1f64..20.0,
            theta in 0.0f64..179.0,
        ) {
            let g = Geometry::default();
            let step = g.triangulate(a, c, theta + 1e-6) - g.triangulate(a, c, theta);
            prop_assert!(step.abs() < 1e-3);
        }
    }
}
