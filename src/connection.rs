//! Neighbour-occurrence counts between pairs of individuals.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::error::{Result, SocialContextError};

/// Add one frame's neighbour relations into `counts`.
///
/// `indices_in_frame` is `(individual, slot)`; every slot of `i` pointing at
/// `j` adds `1.0` to `counts[i, j]`, so repeated slots count repeatedly.
///
/// # Errors
///
/// Fails if `counts` is not `(individual, individual)` or if an index is out
/// of range. Nothing is written on error.
pub fn give_connection_matrix_into(
    indices_in_frame: ArrayView2<'_, usize>,
    mut counts: ArrayViewMut2<'_, f64>,
) -> Result<()> {
    let individuals = indices_in_frame.nrows();
    if counts.dim() != (individuals, individuals) {
        return Err(SocialContextError::shape_mismatch(
            "connection matrix accumulator",
            &[individuals, individuals],
            counts.shape(),
        ));
    }
    if let Some(&bad) = indices_in_frame.iter().find(|&&j| j >= individuals) {
        return Err(SocialContextError::index_out_of_range(bad, individuals));
    }
    for (i, row) in indices_in_frame.outer_iter().enumerate() {
        for &j in row {
            counts[[i, j]] += 1.0;
        }
    }
    Ok(())
}

/// Connection matrix of one frame, optionally accumulated into `accumulator`.
///
/// With no accumulator a zeroed `(individual, individual)` matrix is
/// allocated; otherwise the frame's counts are added to the given matrix,
/// which is returned. Accumulating frame after frame gives running totals.
///
/// # Errors
///
/// As [`give_connection_matrix_into`]. The accumulator is consumed and
/// dropped on error; use [`give_connection_matrix_into`] on a borrowed
/// buffer to keep running totals across a failed frame.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use social_context::give_connection_matrix;
///
/// let frame = array![[1, 2], [0, 0], [1, 0]];
/// let counts = give_connection_matrix(frame.view(), None)?;
/// assert_eq!(counts, array![[0.0, 1.0, 1.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
///
/// let totals = give_connection_matrix(frame.view(), Some(counts))?;
/// assert_eq!(totals[[1, 0]], 4.0);
/// # Ok::<(), social_context::SocialContextError>(())
/// ```
pub fn give_connection_matrix(
    indices_in_frame: ArrayView2<'_, usize>,
    accumulator: Option<Array2<f64>>,
) -> Result<Array2<f64>> {
    let individuals = indices_in_frame.nrows();
    let mut counts =
        accumulator.unwrap_or_else(|| Array2::zeros((individuals, individuals)));
    give_connection_matrix_into(indices_in_frame, counts.view_mut())?;
    Ok(counts)
}
