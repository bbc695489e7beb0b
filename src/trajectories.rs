//! Kinematic container for a group of tracked individuals.
//!
//! [`Trajectories`] holds position, velocity and acceleration arrays shaped
//! `(time, individual, coord)`, estimated elsewhere. It provides the group
//! center of mass, time slicing, and unit orientation vectors for the
//! social-context pipeline.

use std::ops::Range;

use ndarray::{s, Array2, Array3, ArrayView3, Axis};

use crate::error::{Result, SocialContextError};
use crate::math::linalg::normalize_last_axis;

/// Center-of-mass kinematics, each `(time, coord)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterOfMass {
    /// Mean position over individuals.
    pub s: Array2<f64>,
    /// Mean velocity over individuals.
    pub v: Array2<f64>,
    /// Mean acceleration over individuals.
    pub a: Array2<f64>,
}

/// Positions, velocities and accelerations of a fixed set of individuals.
///
/// The arrays share one `(time, individual, coord)` shape with at least one
/// individual and two or three coordinates; they are only reachable through
/// accessors so that shape is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectories {
    s: Array3<f64>,
    v: Array3<f64>,
    a: Array3<f64>,
}

impl Trajectories {
    /// Build from already estimated kinematics.
    ///
    /// # Errors
    ///
    /// Fails if the three arrays differ in shape, if there are no individuals,
    /// or if the coordinates are not 2D or 3D.
    pub fn from_kinematics(s: Array3<f64>, v: Array3<f64>, a: Array3<f64>) -> Result<Self> {
        if v.shape() != s.shape() {
            return Err(SocialContextError::shape_mismatch(
                "velocity vs position",
                s.shape(),
                v.shape(),
            ));
        }
        if a.shape() != s.shape() {
            return Err(SocialContextError::shape_mismatch(
                "acceleration vs position",
                s.shape(),
                a.shape(),
            ));
        }
        let (_, individuals, coords) = s.dim();
        if individuals == 0 {
            return Err(SocialContextError::invalid_input(
                "trajectories need at least one individual",
            ));
        }
        if !(2..=3).contains(&coords) {
            return Err(SocialContextError::invalid_input(format!(
                "trajectories must be 2D or 3D, got {coords} coordinates"
            )));
        }
        Ok(Self { s, v, a })
    }

    /// Positions, `(time, individual, coord)`.
    #[must_use]
    pub fn s(&self) -> ArrayView3<'_, f64> {
        self.s.view()
    }

    /// Velocities, `(time, individual, coord)`.
    #[must_use]
    pub fn v(&self) -> ArrayView3<'_, f64> {
        self.v.view()
    }

    /// Accelerations, `(time, individual, coord)`.
    #[must_use]
    pub fn a(&self) -> ArrayView3<'_, f64> {
        self.a.view()
    }

    /// Number of frames.
    #[must_use]
    pub fn number_of_frames(&self) -> usize {
        self.s.dim().0
    }

    /// Number of individuals.
    #[must_use]
    pub fn number_of_individuals(&self) -> usize {
        self.s.dim().1
    }

    /// Number of spatial dimensions.
    #[must_use]
    pub fn number_of_dimensions(&self) -> usize {
        self.s.dim().2
    }

    /// Mean over individuals of position, velocity and acceleration.
    #[must_use]
    pub fn center_of_mass(&self) -> CenterOfMass {
        CenterOfMass {
            s: mean_over_individuals(self.s.view()),
            v: mean_over_individuals(self.v.view()),
            a: mean_over_individuals(self.a.view()),
        }
    }

    /// Frames `range` of every array, keeping all individuals.
    ///
    /// # Errors
    ///
    /// Fails if the range is reversed or reaches past the last frame.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        let frames = self.number_of_frames();
        if range.start > range.end || range.end > frames {
            return Err(SocialContextError::invalid_input(format!(
                "frame range {range:?} outside 0..{frames}"
            )));
        }
        let window = s![range.start..range.end, .., ..];
        Ok(Self {
            s: self.s.slice(window).to_owned(),
            v: self.v.slice(window).to_owned(),
            a: self.a.slice(window).to_owned(),
        })
    }

    /// Unit heading of every individual, `(time, individual, coord)`.
    ///
    /// Stationary individuals get a zero vector.
    #[must_use]
    pub fn orientation(&self) -> Array3<f64> {
        normalize_last_axis(self.v.view())
    }

    /// Speed of every individual, `(time, individual)`.
    #[must_use]
    pub fn speed(&self) -> Array2<f64> {
        self.v.map_axis(Axis(2), |v| v.dot(&v).sqrt())
    }
}

fn mean_over_individuals(values: ArrayView3<'_, f64>) -> Array2<f64> {
    // Never empty: `from_kinematics` rejects zero individuals.
    values
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array2::zeros((values.dim().0, values.dim().2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circling_group(frames: usize) -> Trajectories {
        let s = Array3::from_shape_fn((frames, 4, 2), |(t, i, c)| {
            let angle = 0.1 * t as f64 + i as f64;
            let radius = 1.0 + i as f64;
            if c == 0 {
                radius * angle.cos()
            } else {
                radius * angle.sin()
            }
        });
        let v = Array3::from_shape_fn((frames, 4, 2), |(t, i, c)| {
            let angle = 0.1 * t as f64 + i as f64;
            let radius = 0.1 * (1.0 + i as f64);
            if c == 0 {
                -radius * angle.sin()
            } else {
                radius * angle.cos()
            }
        });
        let a = v.mapv(|x| -0.1 * x);
        Trajectories::from_kinematics(s, v, a).unwrap()
    }

    #[test]
    fn test_center_of_mass_is_mean_over_individuals() {
        let t = circling_group(20);
        let com = t.center_of_mass();
        assert_eq!(com.s, t.s.mean_axis(Axis(1)).unwrap());
        assert_eq!(com.v, t.v.mean_axis(Axis(1)).unwrap());
        assert_eq!(com.a, t.a.mean_axis(Axis(1)).unwrap());
        assert_eq!(com.s.dim(), (20, 2));
    }

    #[test]
    fn test_slice_keeps_individuals() {
        let t = circling_group(30);
        let sliced = t.slice(5..15).unwrap();
        assert_eq!(sliced.number_of_frames(), 10);
        assert_eq!(sliced.number_of_individuals(), t.number_of_individuals());
        assert_eq!(sliced.s, t.s.slice(s![5..15, .., ..]));
        assert_eq!(sliced.v, t.v.slice(s![5..15, .., ..]));
        assert_eq!(sliced.a, t.a.slice(s![5..15, .., ..]));
        assert!(t.slice(20..40).is_err());
    }

    #[test]
    fn test_orientation_is_unit_velocity() {
        let t = circling_group(5);
        let e = t.orientation();
        let speed = t.speed();
        for ((frame, i), &sp) in speed.indexed_iter() {
            let norm = e.slice(s![frame, i, ..]).dot(&e.slice(s![frame, i, ..])).sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
            assert_relative_eq!(e[[frame, i, 0]] * sp, t.v[[frame, i, 0]], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_accessors_expose_validated_kinematics() {
        let t = circling_group(6);
        assert_eq!(t.s(), t.s.view());
        assert_eq!(t.v(), t.v.view());
        assert_eq!(t.a(), t.a.view());

        let nobody = Array3::<f64>::zeros((6, 0, 2));
        assert!(matches!(
            Trajectories::from_kinematics(nobody.clone(), nobody.clone(), nobody),
            Err(SocialContextError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_kinematics() {
        let s = Array3::<f64>::zeros((3, 2, 2));
        let v = Array3::<f64>::zeros((3, 2, 3));
        let a = Array3::<f64>::zeros((3, 2, 2));
        assert!(Trajectories::from_kinematics(s.clone(), v, a.clone()).is_err());

        let flat = Array3::<f64>::zeros((3, 2, 1));
        assert!(Trajectories::from_kinematics(flat.clone(), flat.clone(), flat).is_err());

        assert!(Trajectories::from_kinematics(s.clone(), s.clone(), a).is_ok());
    }
}
