//! Fleshout: dense delay × individual × individual interaction matrices.
//!
//! For a frame `f`, every individual `i` and every neighbour slot `k` pointing
//! at `j = indices[f, i, k]`, the neighbour's swept orientation at each delay
//! is projected onto `i`'s reference orientation and added to `M[.., i, j]`:
//!
//! ```text
//! M[d, i, indices[f, i, k]] += Σ_c swept[d, f, i, k, c] · data[f, i, c]
//! ```
//!
//! Slots of `i` that name the same neighbour add up in the same cell.
//!
//! Three strategies compute the same matrix (see [`FleshoutStrategy`]); they
//! differ only in how the contraction over coordinates is batched.

use ndarray::{
    s, Array3, ArrayView1, ArrayView2, ArrayView3, ArrayView5, ArrayViewMut3, Axis, NewAxis,
};
use tracing::trace;

use crate::config::FleshoutStrategy;
use crate::error::{Result, SocialContextError};
use crate::math::dot_last_axis;

/// Check that one frame of `data`, `indices` and `swept` can be fleshed out,
/// returning `(max_delay, individuals)`.
pub(crate) fn validate_frame(
    data: &ArrayView3<'_, f64>,
    indices: &ArrayView3<'_, usize>,
    swept: &ArrayView5<'_, f64>,
    frame: usize,
) -> Result<(usize, usize)> {
    let (frames, individuals, coords) = data.dim();
    let (index_frames, index_individuals, slots) = indices.dim();
    let (max_delay, window, swept_individuals, swept_slots, swept_coords) = swept.dim();

    if index_individuals != individuals || swept_individuals != individuals {
        return Err(SocialContextError::shape_mismatch(
            "fleshout individuals (data, indices, swept)",
            &[individuals, individuals, individuals],
            &[individuals, index_individuals, swept_individuals],
        ));
    }
    if swept_slots != slots || swept_coords != coords {
        return Err(SocialContextError::shape_mismatch(
            "fleshout swept (slot, coord)",
            &[slots, coords],
            &[swept_slots, swept_coords],
        ));
    }
    let available = window.min(frames).min(index_frames);
    if frame >= available {
        return Err(SocialContextError::frame_out_of_range(frame, available));
    }
    if let Some(&bad) = indices
        .index_axis(Axis(0), frame)
        .iter()
        .find(|&&j| j >= individuals)
    {
        return Err(SocialContextError::index_out_of_range(bad, individuals));
    }
    Ok((max_delay, individuals))
}

/// Add contributions `(delay, slot)` of individual `i` into the columns of
/// its neighbours.
fn scatter(
    out: &mut ArrayViewMut3<'_, f64>,
    individual: usize,
    targets: ArrayView1<'_, usize>,
    contributions: ArrayView2<'_, f64>,
) {
    for (slot, &target) in targets.iter().enumerate() {
        let mut column = out.slice_mut(s![.., individual, target]);
        column += &contributions.column(slot);
    }
}

fn accumulate_loop(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frame: usize,
    out: &mut ArrayViewMut3<'_, f64>,
) {
    let individuals = data.dim().1;
    for i in 0..individuals {
        let orientation = data.slice(s![frame, i, ..]);
        for (slot, &target) in indices.slice(s![frame, i, ..]).iter().enumerate() {
            let per_delay = swept.slice(s![.., frame, i, slot, ..]);
            let mut column = out.slice_mut(s![.., i, target]);
            column += &per_delay.dot(&orientation);
        }
    }
}

fn accumulate_per_individual(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frame: usize,
    out: &mut ArrayViewMut3<'_, f64>,
) {
    let individuals = data.dim().1;
    for i in 0..individuals {
        let orientation = data.slice(s![frame, i, ..]);
        // (delay, slot, coord) -> (delay, slot)
        let contracted = swept
            .slice(s![.., frame, i, .., ..])
            .map_axis(Axis(2), |lane| lane.dot(&orientation));
        scatter(out, i, indices.slice(s![frame, i, ..]), contracted.view());
    }
}

fn accumulate_vectorized(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frame: usize,
    out: &mut ArrayViewMut3<'_, f64>,
) -> Result<()> {
    // (delay, individual, slot, coord)
    let frame_sweep = swept.index_axis_move(Axis(1), frame);
    let reference = data.slice(s![frame, NewAxis, .., NewAxis, ..]);
    let reference = reference.broadcast(frame_sweep.raw_dim()).ok_or_else(|| {
        SocialContextError::shape_mismatch(
            "fleshout reference broadcast",
            frame_sweep.shape(),
            reference.shape(),
        )
    })?;
    // (delay, individual, slot)
    let contracted = dot_last_axis(frame_sweep, reference)?;
    for (i, targets) in indices.index_axis(Axis(0), frame).outer_iter().enumerate() {
        scatter(out, i, targets, contracted.index_axis(Axis(1), i));
    }
    Ok(())
}

/// Add one frame's fleshout contributions into `out`.
///
/// `data` is `(time, individual, coord)` holding the reference orientations,
/// `indices` is `(time, individual, slot)` and `swept` is the delay sweep
/// `(delay, window, individual, slot, coord)`. `out` must be
/// `(delay, individual, individual)`.
///
/// # Errors
///
/// Fails on incompatible shapes, a frame outside the sweep window, or an
/// out-of-range neighbour index. Nothing is written on error.
pub fn fleshout_frame_into(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frame: usize,
    strategy: FleshoutStrategy,
    mut out: ArrayViewMut3<'_, f64>,
) -> Result<()> {
    let (max_delay, individuals) = validate_frame(&data, &indices, &swept, frame)?;
    if out.dim() != (max_delay, individuals, individuals) {
        return Err(SocialContextError::shape_mismatch(
            "fleshout accumulator",
            &[max_delay, individuals, individuals],
            out.shape(),
        ));
    }
    match strategy {
        FleshoutStrategy::Loop => accumulate_loop(data, indices, swept, frame, &mut out),
        FleshoutStrategy::PerIndividual => {
            accumulate_per_individual(data, indices, swept, frame, &mut out);
        }
        FleshoutStrategy::Vectorized => {
            accumulate_vectorized(data, indices, swept, frame, &mut out)?;
        }
    }
    Ok(())
}

/// Fleshout matrix of one frame, optionally accumulated into `accumulator`.
///
/// With no accumulator a zeroed `(delay, individual, individual)` matrix is
/// allocated; otherwise the frame is added into the given matrix, which is
/// returned.
///
/// # Errors
///
/// As [`fleshout_frame_into`]. The accumulator is consumed and dropped on
/// error; to keep a running total across a failed frame, accumulate through
/// [`fleshout_frame_into`] on a borrowed buffer instead.
pub fn fleshout_frame(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frame: usize,
    strategy: FleshoutStrategy,
    accumulator: Option<Array3<f64>>,
) -> Result<Array3<f64>> {
    let (max_delay, individuals) = validate_frame(&data, &indices, &swept, frame)?;
    let mut matrix = accumulator
        .unwrap_or_else(|| Array3::zeros((max_delay, individuals, individuals)));
    fleshout_frame_into(data, indices, swept, frame, strategy, matrix.view_mut())?;
    Ok(matrix)
}

/// Mean fleshout matrix over an explicit list of frames.
///
/// Frames are weighted equally; a frame listed twice counts twice.
///
/// # Errors
///
/// Fails with [`SocialContextError::EmptyFrames`] for an empty list, and as
/// [`fleshout_frame_into`] for any listed frame.
pub fn fleshout_with_delay(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    frames: &[usize],
    strategy: FleshoutStrategy,
) -> Result<Array3<f64>> {
    let (&first, rest) = frames.split_first().ok_or(SocialContextError::EmptyFrames)?;
    trace!(frames = frames.len(), ?strategy, "averaging fleshout over frames");

    let mut sum = fleshout_frame(data, indices, swept, first, strategy, None)?;
    for &frame in rest {
        fleshout_frame_into(data, indices, swept, frame, strategy, sum.view_mut())?;
    }
    sum /= frames.len() as f64;
    Ok(sum)
}
