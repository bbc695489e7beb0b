//! End-to-end leadership profile.
//!
//! This module ties the pipeline together:
//!
//! 1. Validate the [`LeadershipConfig`]
//! 2. Sweep neighbour orientations over delays `0..max_delay`
//! 3. Project each individual's orientation onto its delayed neighbours'
//!    polarization
//! 4. Flesh out the sweep into `(delay, individual, individual)` matrices
//!    and aggregate them over sliding windows

use ndarray::{Array3, Array5, ArrayView3};
use tracing::debug;

use crate::config::{LeadershipConfig, Materialization};
use crate::error::Result;
use crate::neighbours::nearest_neighbour_indices;
use crate::projection::{
    sweep_delayed_orientation_streamed, sweep_delayed_orientation_with_neighbours,
};
use crate::sliding::sliding_fleshout;
use crate::trajectories::Trajectories;

/// Output of [`compute_leadership_profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeadershipProfile {
    /// Delayed projection signal, `(delay, time, individual)`.
    pub projection: Array3<f64>,

    /// Swept neighbour orientations, `(delay, time, individual, slot, coord)`.
    pub swept: Array5<f64>,

    /// One `(delay, individual, individual)` matrix per sliding window.
    pub windows: Vec<Array3<f64>>,
}

impl LeadershipProfile {
    /// Number of individuals covered by the profile.
    #[must_use]
    pub fn number_of_individuals(&self) -> usize {
        self.projection.dim().2
    }

    /// Mean over all windows of the aggregated matrices, if there are any.
    #[must_use]
    pub fn mean_window(&self) -> Option<Array3<f64>> {
        let (first, rest) = self.windows.split_first()?;
        let mut total = first.clone();
        for window in rest {
            total += window;
        }
        total /= self.windows.len() as f64;
        Some(total)
    }
}

/// Compute the delayed projection and sliding fleshout of a group.
///
/// `orientation` is `(time, individual, coord)` and `indices` is
/// `(time, individual, slot)`, excluding each individual itself. The
/// orientation doubles as the reference data of the fleshout.
///
/// With [`Materialization::Lazy`] the projection is built one delay slab at a
/// time and the sliding stage keeps a single window of per-frame matrices.
///
/// # Errors
///
/// Fails if the configuration is invalid, if the shapes disagree, or if the
/// configured windows do not fit in the `T - max_delay` swept frames.
///
/// # Example
///
/// ```
/// use ndarray::Array3;
/// use social_context::{compute_leadership_profile, LeadershipConfig};
///
/// let orientation = Array3::from_shape_fn((12, 3, 2), |(t, i, c)| {
///     let angle = 0.2 * t as f64 + i as f64;
///     if c == 0 { angle.cos() } else { angle.sin() }
/// });
/// let indices = Array3::from_shape_fn((12, 3, 2), |(_, i, k)| (i + k + 1) % 3);
///
/// let config = LeadershipConfig::default()
///     .with_max_delay(3)
///     .with_num_frames_to_average(4);
/// let profile = compute_leadership_profile(orientation.view(), indices.view(), &config)?;
///
/// assert_eq!(profile.projection.dim(), (3, 9, 3));
/// assert_eq!(profile.windows.len(), 6);
/// # Ok::<(), social_context::SocialContextError>(())
/// ```
pub fn compute_leadership_profile(
    orientation: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    config: &LeadershipConfig,
) -> Result<LeadershipProfile> {
    config.validate()?;

    let projected = match config.materialization {
        Materialization::Eager => {
            sweep_delayed_orientation_with_neighbours(orientation, indices, config.max_delay)?
        }
        Materialization::Lazy => {
            sweep_delayed_orientation_streamed(orientation, indices, config.max_delay)?
        }
    };
    let windows = sliding_fleshout(orientation, indices, projected.swept.view(), config)?;

    debug!(
        frames = orientation.dim().0,
        individuals = orientation.dim().1,
        windows = windows.len(),
        "computed leadership profile"
    );
    Ok(LeadershipProfile {
        projection: projected.projection,
        swept: projected.swept,
        windows,
    })
}

/// Leadership profile of tracked individuals, using their `neighbours`
/// nearest neighbours in every frame.
///
/// # Errors
///
/// Fails if `neighbours` is zero or not below the number of individuals, or
/// as [`compute_leadership_profile`].
pub fn leadership_profile_of(
    trajectories: &Trajectories,
    neighbours: usize,
    config: &LeadershipConfig,
) -> Result<LeadershipProfile> {
    let indices = nearest_neighbour_indices(trajectories.s(), neighbours)?;
    let orientation = trajectories.orientation();
    compute_leadership_profile(orientation.view(), indices.view(), config)
}
