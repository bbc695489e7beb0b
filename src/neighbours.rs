//! Neighbour restriction: gathering each individual's neighbours per frame.
//!
//! A neighbour-index array has shape `(time, individual, slot)` and holds, for
//! every individual at every frame, the identities of the individuals it
//! attends to. [`restrict`] replaces the individual axis of a data array by
//! those gathered rows. [`nearest_neighbour_indices`] builds such an index
//! array from positions.

use ndarray::{s, Array3, Array4, ArrayView3};

use crate::error::{Result, SocialContextError};
use crate::math::linalg::distance;

/// Check that `indices` pairs frame-by-frame with `data` and only names
/// individuals of `data`.
pub(crate) fn validate_pairing<A>(
    data: &ArrayView3<'_, A>,
    indices: &ArrayView3<'_, usize>,
) -> Result<()> {
    let (frames, individuals, _) = data.dim();
    let (index_frames, index_individuals, _) = indices.dim();
    if frames != index_frames || individuals != index_individuals {
        return Err(SocialContextError::shape_mismatch(
            "restrict: data (time, individual) vs indices (time, individual)",
            &[frames, individuals],
            &[index_frames, index_individuals],
        ));
    }
    if let Some(&bad) = indices.iter().find(|&&j| j >= individuals) {
        return Err(SocialContextError::index_out_of_range(bad, individuals));
    }
    Ok(())
}

/// Restrict `data` to each individual's neighbours.
///
/// `data` is `(time, individual, coord)` and `indices` is
/// `(time, individual, slot)`. The result is `(time, individual, slot, coord)`
/// with `out[t, i, k, c] = data[t, indices[t, i, k], c]`. Time alignment is
/// kept exactly.
///
/// # Errors
///
/// Fails if the time or individual axes differ, or if an index names an
/// individual outside `data`.
pub fn restrict<A: Clone>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
) -> Result<Array4<A>> {
    validate_pairing(&data, &indices)?;
    let (frames, individuals, coords) = data.dim();
    let slots = indices.dim().2;
    Ok(Array4::from_shape_fn(
        (frames, individuals, slots, coords),
        |(t, i, k, c)| data[[t, indices[[t, i, k]], c]].clone(),
    ))
}

/// Restrict `data` to the neighbours of a single individual.
///
/// The result is `(time, slot, coord)`, equal to `restrict(data, indices)`
/// sliced at `individual`.
///
/// # Errors
///
/// Fails as [`restrict`] does, and if `individual` is out of range.
pub fn restrict_individual<A: Clone>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
    individual: usize,
) -> Result<Array3<A>> {
    validate_pairing(&data, &indices)?;
    let (frames, individuals, coords) = data.dim();
    if individual >= individuals {
        return Err(SocialContextError::individual_out_of_range(
            individual,
            individuals,
        ));
    }
    let own = indices.slice(s![.., individual, ..]);
    let slots = own.dim().1;
    Ok(Array3::from_shape_fn((frames, slots, coords), |(t, k, c)| {
        data[[t, own[[t, k]], c]].clone()
    }))
}

/// Indices of the `k` nearest other individuals for every frame.
///
/// `positions` is `(time, individual, coord)`. The result is
/// `(time, individual, k)`, nearest first, never containing the individual
/// itself. Equal distances are ordered by identity.
///
/// # Errors
///
/// Fails if `k` is zero or not smaller than the number of individuals.
pub fn nearest_neighbour_indices(
    positions: ArrayView3<'_, f64>,
    k: usize,
) -> Result<Array3<usize>> {
    let (frames, individuals, _) = positions.dim();
    if k == 0 || k >= individuals {
        return Err(SocialContextError::invalid_input(format!(
            "need 0 < k < {individuals} neighbours, got {k}"
        )));
    }

    let mut out = Array3::<usize>::zeros((frames, individuals, k));
    let mut candidates: Vec<(f64, usize)> = Vec::with_capacity(individuals - 1);
    for t in 0..frames {
        let frame = positions.slice(s![t, .., ..]);
        for i in 0..individuals {
            candidates.clear();
            candidates.extend(
                (0..individuals)
                    .filter(|&j| j != i)
                    .map(|j| (distance(frame.row(i), frame.row(j)), j)),
            );
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            for (slot, &(_, j)) in candidates.iter().take(k).enumerate() {
                out[[t, i, slot]] = j;
            }
        }
    }
    Ok(out)
}
