//! Delayed restriction and delay sweeps.
//!
//! Applying a delay `d` pairs `data[t + d]` with `indices[t]`: the data stream
//! loses its first `d` frames and the index stream its last `d`, so both stay
//! frame-aligned before restriction.
//!
//! A sweep stacks the delayed restrictions for every delay in `0..max_delay`
//! along a new leading axis, each cut to the common window of
//! `T - max_delay` frames so the result is one rectangular tensor.

use ndarray::{s, Array3, Array4, Array5, ArrayView3, Axis};
use tracing::debug;

use crate::error::{Result, SocialContextError};
use crate::neighbours::{restrict, restrict_individual};

/// Align `data` and `indices` for a non-negative delay.
fn delayed_streams<'d, 'i, A>(
    data: ArrayView3<'d, A>,
    indices: ArrayView3<'i, usize>,
    delay: usize,
) -> Result<(ArrayView3<'d, A>, ArrayView3<'i, usize>)> {
    let frames = data.dim().0;
    let index_frames = indices.dim().0;
    if delay > frames || delay > index_frames {
        return Err(SocialContextError::empty_time_window(
            frames.min(index_frames),
            delay,
        ));
    }
    let delayed_data = data.slice_move(s![delay.., .., ..]);
    let restricted_indices = if delay == 0 {
        indices
    } else {
        indices.slice_move(s![..index_frames - delay, .., ..])
    };
    Ok((delayed_data, restricted_indices))
}

fn non_negative(delay: isize) -> Result<usize> {
    usize::try_from(delay)
        .map_err(|_| SocialContextError::unsupported(format!("negative delay {delay}")))
}

/// Restrict `data` to neighbours after applying `delay`.
///
/// Works as [`restrict`] on `data[delay..]` and `indices[..T - delay]`, so
/// `out[t]` gathers `data[t + delay]` through `indices[t]`. A zero delay
/// passes the indices through unchanged.
///
/// # Errors
///
/// A negative delay is not supported and fails immediately with
/// [`SocialContextError::UnsupportedOperation`]. Restriction errors are
/// propagated.
///
/// # Example
///
/// ```
/// use ndarray::Array3;
/// use social_context::{restrict, restrict_with_delay};
///
/// let data = Array3::from_shape_fn((4, 2, 2), |(t, i, c)| (t * 10 + i * 2 + c) as f64);
/// let indices = Array3::from_shape_fn((4, 2, 1), |(_, i, _)| 1 - i);
///
/// let undelayed = restrict_with_delay(data.view(), indices.view(), 0)?;
/// assert_eq!(undelayed, restrict(data.view(), indices.view())?);
///
/// let delayed = restrict_with_delay(data.view(), indices.view(), 1)?;
/// assert_eq!(delayed.dim(), (3, 2, 1, 2));
/// assert_eq!(delayed[[0, 0, 0, 0]], data[[1, 1, 0]]);
/// # Ok::<(), social_context::SocialContextError>(())
/// ```
pub fn restrict_with_delay<A: Clone>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
    delay: isize,
) -> Result<Array4<A>> {
    let delay = non_negative(delay)?;
    let (delayed_data, restricted_indices) = delayed_streams(data, indices, delay)?;
    restrict(delayed_data, restricted_indices)
}

/// Single-individual form of [`restrict_with_delay`], `(time', slot, coord)`.
///
/// # Errors
///
/// As [`restrict_with_delay`], plus an out-of-range `individual`.
pub fn restrict_individual_with_delay<A: Clone>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
    individual: usize,
    delay: isize,
) -> Result<Array3<A>> {
    let delay = non_negative(delay)?;
    let (delayed_data, restricted_indices) = delayed_streams(data, indices, delay)?;
    restrict_individual(delayed_data, restricted_indices, individual)
}

/// Number of frames common to every delay of a sweep.
///
/// # Errors
///
/// Fails if `max_delay` is zero or leaves no frames.
pub fn sweep_window(frames: usize, max_delay: usize) -> Result<usize> {
    if max_delay == 0 {
        return Err(SocialContextError::invalid_input(
            "max_delay must be positive",
        ));
    }
    if max_delay >= frames {
        return Err(SocialContextError::empty_time_window(frames, max_delay));
    }
    Ok(frames - max_delay)
}

/// Lazy delay sweep yielding one `(window, individual, slot, coord)` slab per
/// delay, in increasing delay order.
///
/// Only one slab is alive at a time, which bounds peak memory to a single
/// delay instead of `max_delay` of them. Collecting the iterator and stacking
/// the slabs gives exactly [`sweep_delays`]. A new sweep restarts from delay
/// zero.
#[derive(Debug, Clone)]
pub struct DelaySweep<'a, A> {
    data: ArrayView3<'a, A>,
    indices: ArrayView3<'a, usize>,
    max_delay: usize,
    window: usize,
    next_delay: usize,
}

impl<'a, A: Clone> DelaySweep<'a, A> {
    /// Create a sweep over delays `0..max_delay`.
    ///
    /// # Errors
    ///
    /// Fails if `max_delay` leaves no common window, or if `data` and
    /// `indices` do not pair frame by frame.
    pub fn new(
        data: ArrayView3<'a, A>,
        indices: ArrayView3<'a, usize>,
        max_delay: usize,
    ) -> Result<Self> {
        let window = sweep_window(data.dim().0, max_delay)?;
        if indices.dim().0 != data.dim().0 {
            return Err(SocialContextError::shape_mismatch(
                "sweep: data time vs indices time",
                &[data.dim().0],
                &[indices.dim().0],
            ));
        }
        Ok(Self {
            data,
            indices,
            max_delay,
            window,
            next_delay: 0,
        })
    }

    /// Frames per slab, `T - max_delay`.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Number of delays swept.
    #[must_use]
    pub const fn max_delay(&self) -> usize {
        self.max_delay
    }

    /// Delayed restriction for `delay`, cut to the common window.
    ///
    /// Restricting the already cut streams gives the same frames as cutting
    /// the full delayed restriction, without building the discarded tail.
    fn slab(&self, delay: usize) -> Result<Array4<A>> {
        let data = self.data.slice(s![delay..delay + self.window, .., ..]);
        let indices = self.indices.slice(s![..self.window, .., ..]);
        restrict(data, indices)
    }
}

impl<A: Clone> Iterator for DelaySweep<'_, A> {
    type Item = Result<Array4<A>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_delay >= self.max_delay {
            return None;
        }
        let delay = self.next_delay;
        self.next_delay += 1;
        Some(self.slab(delay))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.max_delay - self.next_delay;
        (remaining, Some(remaining))
    }
}

impl<A: Clone> ExactSizeIterator for DelaySweep<'_, A> {}

/// Sweep delays `0..max_delay` over `data`, stacked on a new leading axis.
///
/// The output has shape `(max_delay, T - max_delay, individual, slot, coord)`
/// and `out[d, t] == restrict_with_delay(data, indices, d)[t]` for every `t`
/// in the common window.
///
/// # Errors
///
/// Fails if `max_delay` is zero or `>= T`, or if restriction fails.
pub fn sweep_delays<A: Clone + Default>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
    max_delay: usize,
) -> Result<Array5<A>> {
    let sweep = DelaySweep::new(data.view(), indices.view(), max_delay)?;
    let (_, individuals, coords) = data.dim();
    let slots = indices.dim().2;
    debug!(
        max_delay,
        window = sweep.window(),
        individuals,
        slots,
        "sweeping delays"
    );

    let mut output = Array5::<A>::default((max_delay, sweep.window(), individuals, slots, coords));
    for (delay, slab) in sweep.enumerate() {
        output.index_axis_mut(Axis(0), delay).assign(&slab?);
    }
    Ok(output)
}

/// Single-individual form of [`sweep_delays`], shaped
/// `(max_delay, T - max_delay, slot, coord)`.
///
/// # Errors
///
/// As [`sweep_delays`], plus an out-of-range `individual`.
pub fn sweep_delays_individual<A: Clone + Default>(
    data: ArrayView3<'_, A>,
    indices: ArrayView3<'_, usize>,
    max_delay: usize,
    individual: usize,
) -> Result<Array4<A>> {
    let window = sweep_window(data.dim().0, max_delay)?;
    let coords = data.dim().2;
    let slots = indices.dim().2;

    let mut output = Array4::<A>::default((max_delay, window, slots, coords));
    for delay in 0..max_delay {
        let (delayed_data, restricted_indices) = delayed_streams(data, indices, delay)?;
        let delayed = restrict_individual(delayed_data, restricted_indices, individual)?;
        output
            .index_axis_mut(Axis(0), delay)
            .assign(&delayed.slice(s![..window, .., ..]));
    }
    Ok(output)
}
