//! Group reductions over sets of orientation vectors.

use ndarray::{Array, ArrayView, Axis, Dimension, RemoveAxis};

use crate::error::{Result, SocialContextError};

/// Polarization of a group of vectors: the mean resultant vector.
///
/// The group axis is the second-to-last axis and coordinates are on the last
/// one, so `(delay, time, individual, neighbour, coord)` reduces to
/// `(delay, time, individual, coord)`. The magnitude of the result is kept;
/// for unit orientations it is the usual order parameter in `[0, 1]`.
///
/// # Errors
///
/// Returns an error if the input has fewer than two axes or the group axis
/// is empty.
pub fn polarization<D>(vectors: ArrayView<'_, f64, D>) -> Result<Array<f64, D::Smaller>>
where
    D: Dimension + RemoveAxis,
{
    if vectors.ndim() < 2 {
        return Err(SocialContextError::invalid_input(format!(
            "polarization needs a group axis and a coordinate axis, got {} axes",
            vectors.ndim()
        )));
    }
    let group = Axis(vectors.ndim() - 2);
    vectors
        .mean_axis(group)
        .ok_or_else(|| SocialContextError::invalid_input("polarization over an empty group"))
}
