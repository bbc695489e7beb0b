//! Linear algebra along the coordinate axis.
//!
//! Trajectory-shaped arrays keep their coordinates on the last axis, so the
//! products and norms here always contract or scale that axis.

use ndarray::{Array, ArrayView, ArrayView1, Axis, Dimension, RemoveAxis, Zip};

use crate::error::{Result, SocialContextError};

/// Norms below this are treated as zero by [`normalize_last_axis`].
pub const NORM_EPS: f64 = 1e-10;

/// Dot product of two equally shaped arrays along their last axis.
///
/// Both operands must have the same shape; broadcast views are accepted, so
/// a per-individual vector can be contracted against a per-delay stack by
/// broadcasting it first.
///
/// # Errors
///
/// Returns [`SocialContextError::ShapeMismatch`] if the shapes differ, or
/// [`SocialContextError::InvalidInput`] for zero-dimensional operands.
pub fn dot_last_axis<D>(
    a: ArrayView<'_, f64, D>,
    b: ArrayView<'_, f64, D>,
) -> Result<Array<f64, D::Smaller>>
where
    D: Dimension + RemoveAxis,
{
    if a.shape() != b.shape() {
        return Err(SocialContextError::shape_mismatch(
            "dot_last_axis",
            a.shape(),
            b.shape(),
        ));
    }
    if a.ndim() == 0 {
        return Err(SocialContextError::invalid_input(
            "dot_last_axis needs at least one axis",
        ));
    }
    let last = Axis(a.ndim() - 1);
    let mut product = a.to_owned();
    product *= &b;
    Ok(product.sum_axis(last))
}

/// Scale every vector on the last axis to unit length.
///
/// Vectors with norm below [`NORM_EPS`] become zero vectors.
#[must_use]
pub fn normalize_last_axis<D>(a: ArrayView<'_, f64, D>) -> Array<f64, D>
where
    D: Dimension + RemoveAxis,
{
    let mut out = a.to_owned();
    if out.ndim() == 0 {
        return out;
    }
    let last = Axis(out.ndim() - 1);
    for mut lane in out.lanes_mut(last) {
        let norm = lane.dot(&lane).sqrt();
        if norm < NORM_EPS {
            lane.fill(0.0);
        } else {
            lane.mapv_inplace(|x| x / norm);
        }
    }
    out
}

/// Euclidean distance between two equally long vectors.
#[must_use]
pub fn distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    Zip::from(&a)
        .and(&b)
        .fold(0.0, |acc, &x, &y| acc + (x - y) * (x - y))
        .sqrt()
}
