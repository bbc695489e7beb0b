//! Projection of each individual's orientation onto its delayed neighbours'
//! polarization.
//!
//! For every delay `d`, frame `t` and individual `i`, the neighbours'
//! orientations `d` frames later are reduced to a polarization vector and
//! projected onto `i`'s own orientation at `t`. A positive value at delay `d`
//! means the neighbourhood later moves the way `i` moves now.

use ndarray::{s, Array3, Array4, Array5, ArrayView3, ArrayView5, Axis, NewAxis};
use tracing::debug;

use crate::delay::{sweep_delays, sweep_window, DelaySweep};
use crate::error::{Result, SocialContextError};
use crate::math::{dot_last_axis, polarization};

/// Delayed projection signal together with the sweep it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedProjection {
    /// Projected orientation, `(delay, time, individual)`.
    pub projection: Array3<f64>,

    /// Swept neighbour orientations, `(delay, time, individual, slot, coord)`.
    ///
    /// Kept because fleshout aggregation consumes the same sweep.
    pub swept: Array5<f64>,
}

/// Sweep delayed neighbour orientations and project them onto each
/// individual's orientation.
///
/// `orientation` is `(time, individual, coord)` and `indices` must not
/// contain the individual itself. The projection is the plain Euclidean dot
/// product; orientations are not normalized here, so their magnitude matters.
///
/// # Errors
///
/// Fails if `max_delay` is zero or `>= T`, or if restriction fails.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use social_context::sweep_delayed_orientation_with_neighbours;
///
/// // Two individuals swapping headings between frames.
/// let orientation = array![
///     [[1.0, 0.0], [0.0, 1.0]],
///     [[0.0, 1.0], [1.0, 0.0]],
///     [[1.0, 0.0], [0.0, 1.0]],
/// ];
/// let indices = array![[[1], [0]], [[1], [0]], [[1], [0]]];
///
/// let result = sweep_delayed_orientation_with_neighbours(orientation.view(), indices.view(), 2)?;
/// assert_eq!(result.projection.dim(), (2, 1, 2));
/// assert_eq!(result.projection[[0, 0, 0]], 0.0); // orthogonal right now
/// assert_eq!(result.projection[[1, 0, 0]], 1.0); // neighbour copies one frame later
/// # Ok::<(), social_context::SocialContextError>(())
/// ```
pub fn sweep_delayed_orientation_with_neighbours(
    orientation: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    max_delay: usize,
) -> Result<DelayedProjection> {
    sweep_delayed_orientation_with(orientation, indices, max_delay, |swept| {
        polarization(swept)
    })
}

/// As [`sweep_delayed_orientation_with_neighbours`], with a caller-supplied
/// reduction of the neighbour axis.
///
/// `polarize` receives the sweep `(delay, time, individual, slot, coord)` and
/// must return `(delay, time, individual, coord)`.
///
/// # Errors
///
/// Fails as [`sweep_delayed_orientation_with_neighbours`], if `polarize`
/// fails, or if it returns the wrong shape.
pub fn sweep_delayed_orientation_with<F>(
    orientation: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    max_delay: usize,
    polarize: F,
) -> Result<DelayedProjection>
where
    F: FnOnce(ArrayView5<'_, f64>) -> Result<Array4<f64>>,
{
    let window = sweep_window(orientation.dim().0, max_delay)?;
    let (_, individuals, coords) = orientation.dim();

    let swept = sweep_delays(orientation, indices, max_delay)?;
    let polarized = polarize(swept.view())?;

    let expected = [max_delay, window, individuals, coords];
    if polarized.shape() != expected.as_slice() {
        return Err(SocialContextError::shape_mismatch(
            "polarization output",
            &expected,
            polarized.shape(),
        ));
    }

    let reference = orientation.slice(s![NewAxis, ..window, .., ..]);
    let reference = reference.broadcast(polarized.raw_dim()).ok_or_else(|| {
        SocialContextError::shape_mismatch("projection broadcast", &expected, reference.shape())
    })?;
    let projection = dot_last_axis(reference, polarized.view())?;

    debug!(max_delay, window, individuals, "projected delayed orientations");
    Ok(DelayedProjection { projection, swept })
}

/// Streamed form of [`sweep_delayed_orientation_with_neighbours`].
///
/// Delay slabs are pulled one at a time from a [`DelaySweep`] and projected
/// as they arrive, so the `(delay, time, individual, coord)` polarization
/// tensor is never built. The slabs are still stacked into `swept`, which the
/// fleshout reads at every delay.
///
/// # Errors
///
/// As [`sweep_delayed_orientation_with_neighbours`].
pub fn sweep_delayed_orientation_streamed(
    orientation: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    max_delay: usize,
) -> Result<DelayedProjection> {
    let sweep = DelaySweep::new(orientation.view(), indices.view(), max_delay)?;
    let window = sweep.window();
    let (_, individuals, coords) = orientation.dim();
    let slots = indices.dim().2;
    let reference = orientation.slice(s![..window, .., ..]);

    let mut projection = Array3::<f64>::zeros((max_delay, window, individuals));
    let mut swept = Array5::<f64>::zeros((max_delay, window, individuals, slots, coords));
    for (delay, slab) in sweep.enumerate() {
        let slab = slab?;
        // (time, individual, coord)
        let polarized = polarization(slab.view())?;
        projection
            .index_axis_mut(Axis(0), delay)
            .assign(&dot_last_axis(reference, polarized.view())?);
        swept.index_axis_mut(Axis(0), delay).assign(&slab);
    }

    debug!(max_delay, window, individuals, "projected delayed orientations slab by slab");
    Ok(DelayedProjection { projection, swept })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3, Axis};

    fn rotating_group() -> (Array3<f64>, Array3<usize>) {
        let orientation = Array3::from_shape_fn((7, 3, 2), |(t, i, c)| {
            let angle = 0.3 * t as f64 + 1.1 * i as f64;
            if c == 0 {
                angle.cos()
            } else {
                angle.sin()
            }
        });
        let indices = Array3::from_shape_fn((7, 3, 2), |(_, i, k)| (i + k + 1) % 3);
        (orientation, indices)
    }

    #[test]
    fn test_projection_matches_definition() {
        let (orientation, indices) = rotating_group();
        let max_delay = 3;
        let result =
            sweep_delayed_orientation_with_neighbours(orientation.view(), indices.view(), max_delay)
                .unwrap();
        assert_eq!(result.projection.dim(), (3, 4, 3));
        assert_eq!(result.swept.dim(), (3, 4, 3, 2, 2));

        for d in 0..max_delay {
            for t in 0..4 {
                for i in 0..3 {
                    let mut expected = 0.0;
                    for c in 0..2 {
                        let mean = (0..2)
                            .map(|k| orientation[[t + d, indices[[t, i, k]], c]])
                            .sum::<f64>()
                            / 2.0;
                        expected += orientation[[t, i, c]] * mean;
                    }
                    assert_relative_eq!(result.projection[[d, t, i]], expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_magnitude_is_not_normalized() {
        let orientation = array![[[2.0, 0.0], [1.0, 0.0]], [[2.0, 0.0], [1.0, 0.0]]];
        let indices = array![[[1], [0]], [[1], [0]]];
        let result =
            sweep_delayed_orientation_with_neighbours(orientation.view(), indices.view(), 1)
                .unwrap();
        assert_eq!(result.projection, array![[[2.0, 2.0]]]);
    }

    #[test]
    fn test_custom_reducer() {
        let (orientation, indices) = rotating_group();
        let result = sweep_delayed_orientation_with(orientation.view(), indices.view(), 2, |swept| {
            Ok(swept.index_axis(Axis(3), 0).to_owned())
        })
        .unwrap();
        let t = 1;
        let i = 2;
        let j = indices[[t, i, 0]];
        let expected = orientation[[t, i, 0]] * orientation[[t + 1, j, 0]]
            + orientation[[t, i, 1]] * orientation[[t + 1, j, 1]];
        assert_relative_eq!(result.projection[[1, t, i]], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_streamed_projection_matches_eager() {
        let (orientation, indices) = rotating_group();
        let eager =
            sweep_delayed_orientation_with_neighbours(orientation.view(), indices.view(), 3)
                .unwrap();
        let streamed =
            sweep_delayed_orientation_streamed(orientation.view(), indices.view(), 3).unwrap();
        assert_eq!(streamed.swept, eager.swept);
        assert_relative_eq!(streamed.projection, eager.projection, epsilon = 1e-12);
        assert!(
            sweep_delayed_orientation_streamed(orientation.view(), indices.view(), 7).is_err()
        );
    }

    #[test]
    fn test_reducer_with_wrong_shape_fails() {
        let (orientation, indices) = rotating_group();
        let result = sweep_delayed_orientation_with(orientation.view(), indices.view(), 2, |_| {
            Ok(Array4::zeros((1, 1, 1, 1)))
        });
        assert!(matches!(
            result,
            Err(SocialContextError::ShapeMismatch { .. })
        ));
    }
}
