//! Sliding-window averages of fleshout matrices.
//!
//! For each window start `w` the per-frame fleshout matrices of frames
//! `w..w + num_frames_to_average` are summed and then either divided by the
//! window length ([`WindowNormalization::Uniform`]) or divided element-wise by
//! the summed connection counts of the same frames
//! ([`WindowNormalization::ConnectionCount`]). Cells that saw no connection in
//! the window keep their raw sum rather than dividing by zero.
//!
//! Intermediates are built either up front (the `sliding_*` functions) or
//! frame by frame with [`SlidingFleshout`], which keeps only one window of
//! matrices alive. Both sum a window in frame order, so they agree exactly.

use std::collections::VecDeque;
use std::ops::Range;

use ndarray::{Array2, Array3, ArrayView3, ArrayView5, Axis, Zip};
use tracing::debug;

use crate::config::{FleshoutStrategy, LeadershipConfig, Materialization, WindowNormalization};
use crate::connection::give_connection_matrix;
use crate::error::{Result, SocialContextError};
use crate::fleshout::fleshout_frame;

/// Resolve the window starts for `available` fleshout-able frames.
///
/// `end` defaults to the last start whose window still fits.
fn window_starts(
    available: usize,
    start: usize,
    end: Option<usize>,
    window: usize,
) -> Result<Range<usize>> {
    if window == 0 {
        return Err(SocialContextError::invalid_input(
            "num_frames_to_average must be positive",
        ));
    }
    let last_start = available.checked_sub(window).map(|slack| slack + 1).ok_or_else(|| {
        SocialContextError::invalid_input(format!(
            "a window of {window} frames does not fit in {available} frames"
        ))
    })?;
    let end = end.unwrap_or(last_start);
    if start > end {
        return Err(SocialContextError::invalid_input(format!(
            "start frame {start} is after end frame {end}"
        )));
    }
    if end > last_start {
        return Err(SocialContextError::frame_out_of_range(
            end + window - 2,
            available,
        ));
    }
    Ok(start..end)
}

/// Frames that a fleshout can be computed for: the sweep window, bounded by
/// the data and index lengths.
fn available_frames(
    data: &ArrayView3<'_, f64>,
    indices: &ArrayView3<'_, usize>,
    swept: &ArrayView5<'_, f64>,
) -> usize {
    swept.dim().1.min(data.dim().0).min(indices.dim().0)
}

/// Sum a window of fleshout matrices in order and normalize it.
fn reduce_window<'m>(
    fleshouts: impl Iterator<Item = &'m Array3<f64>>,
    connections: Option<impl Iterator<Item = &'m Array2<f64>>>,
    window: usize,
    shape: (usize, usize, usize),
) -> Array3<f64> {
    let mut sum = Array3::<f64>::zeros(shape);
    for matrix in fleshouts {
        sum += matrix;
    }
    match connections {
        None => sum / window as f64,
        Some(connections) => {
            let mut counts = Array2::<f64>::zeros((shape.1, shape.2));
            for matrix in connections {
                counts += matrix;
            }
            for mut per_delay in sum.axis_iter_mut(Axis(0)) {
                Zip::from(&mut per_delay).and(&counts).for_each(|value, &count| {
                    if count > 0.0 {
                        *value /= count;
                    }
                });
            }
            sum
        }
    }
}

fn sliding_eager(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    starts: Range<usize>,
    window: usize,
    strategy: FleshoutStrategy,
    normalization: WindowNormalization,
) -> Result<Vec<Array3<f64>>> {
    if starts.is_empty() {
        return Ok(Vec::new());
    }
    let individuals = data.dim().1;
    let shape = (swept.dim().0, individuals, individuals);
    let frames = starts.start..starts.end + window - 1;

    let fleshouts = frames
        .clone()
        .map(|frame| fleshout_frame(data, indices, swept, frame, strategy, None))
        .collect::<Result<Vec<_>>>()?;
    let connections = match normalization {
        WindowNormalization::Uniform => Vec::new(),
        WindowNormalization::ConnectionCount => frames
            .map(|frame| give_connection_matrix(indices.index_axis(Axis(0), frame), None))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok((0..starts.len())
        .map(|offset| {
            let range = offset..offset + window;
            let counts = match normalization {
                WindowNormalization::Uniform => None,
                WindowNormalization::ConnectionCount => Some(connections[range.clone()].iter()),
            };
            reduce_window(fleshouts[range].iter(), counts, window, shape)
        })
        .collect())
}

/// Uniform sliding average of fleshout matrices.
///
/// Returns one `(delay, individual, individual)` matrix per window start in
/// `start_frame..end_frame`, each the mean of `num_frames_to_average`
/// consecutive per-frame matrices. `end_frame = None` runs to the last window
/// that fits in the sweep.
///
/// # Errors
///
/// Fails on a zero window, `start_frame > end_frame`, a window reaching past
/// the sweep, or any per-frame fleshout error.
pub fn sliding_average_fleshout_with_delay(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    start_frame: usize,
    end_frame: Option<usize>,
    num_frames_to_average: usize,
    strategy: FleshoutStrategy,
) -> Result<Vec<Array3<f64>>> {
    let available = available_frames(&data, &indices, &swept);
    let starts = window_starts(available, start_frame, end_frame, num_frames_to_average)?;
    sliding_eager(
        data,
        indices,
        swept,
        starts,
        num_frames_to_average,
        strategy,
        WindowNormalization::Uniform,
    )
}

/// Connection-normalized sliding average of fleshout matrices.
///
/// Windows are as in [`sliding_average_fleshout_with_delay`], but each window
/// sum is divided, per delay, by the summed connection matrix of the window
/// wherever that count is positive. Cells without any connection keep their
/// raw sum, which is zero unless the accumulated contributions say otherwise.
///
/// # Errors
///
/// As [`sliding_average_fleshout_with_delay`].
pub fn sliding_connection_normalized_fleshout_with_delay(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    start_frame: usize,
    end_frame: Option<usize>,
    num_frames_to_average: usize,
    strategy: FleshoutStrategy,
) -> Result<Vec<Array3<f64>>> {
    let available = available_frames(&data, &indices, &swept);
    let starts = window_starts(available, start_frame, end_frame, num_frames_to_average)?;
    sliding_eager(
        data,
        indices,
        swept,
        starts,
        num_frames_to_average,
        strategy,
        WindowNormalization::ConnectionCount,
    )
}

/// Lazy sliding-window fleshout.
///
/// Yields the same matrices as the eager functions, one window start at a
/// time, holding at most `num_frames_to_average` per-frame matrices (and
/// connection matrices) in a rolling buffer.
///
/// # Example
///
/// ```
/// use ndarray::Array3;
/// use social_context::{sweep_delays, LeadershipConfig, Materialization, SlidingFleshout};
///
/// let data = Array3::from_shape_fn((8, 3, 2), |(t, i, c)| ((t + i + c) % 4) as f64 - 1.5);
/// let indices = Array3::from_shape_fn((8, 3, 1), |(_, i, _)| (i + 1) % 3);
/// let swept = sweep_delays(data.view(), indices.view(), 2)?;
///
/// let config = LeadershipConfig::default()
///     .with_max_delay(2)
///     .with_num_frames_to_average(3)
///     .with_materialization(Materialization::Lazy);
/// let windows = SlidingFleshout::new(data.view(), indices.view(), swept.view(), &config)?;
/// assert_eq!(windows.len(), 4);
/// for matrix in windows {
///     assert_eq!(matrix?.dim(), (2, 3, 3));
/// }
/// # Ok::<(), social_context::SocialContextError>(())
/// ```
#[derive(Debug)]
pub struct SlidingFleshout<'a> {
    data: ArrayView3<'a, f64>,
    indices: ArrayView3<'a, usize>,
    swept: ArrayView5<'a, f64>,
    strategy: FleshoutStrategy,
    normalization: WindowNormalization,
    window: usize,
    starts: Range<usize>,
    /// Next frame to flesh out; the buffers hold the frames just before it.
    next_frame: usize,
    fleshouts: VecDeque<Array3<f64>>,
    connections: VecDeque<Array2<f64>>,
}

impl<'a> SlidingFleshout<'a> {
    /// Create a lazy sliding aggregation using the window, strategy and
    /// normalization of `config`.
    ///
    /// # Errors
    ///
    /// Fails if the configured window range does not fit in the sweep.
    pub fn new(
        data: ArrayView3<'a, f64>,
        indices: ArrayView3<'a, usize>,
        swept: ArrayView5<'a, f64>,
        config: &LeadershipConfig,
    ) -> Result<Self> {
        let window = config.num_frames_to_average;
        let available = available_frames(&data, &indices, &swept);
        let starts = window_starts(available, config.start_frame, config.end_frame, window)?;
        Ok(Self {
            data,
            indices,
            swept,
            strategy: config.strategy,
            normalization: config.normalization,
            window,
            next_frame: starts.start,
            starts,
            fleshouts: VecDeque::with_capacity(window),
            connections: VecDeque::with_capacity(window),
        })
    }

    /// Compute frames until the buffers cover `start..start + window`.
    fn fill_window(&mut self, start: usize) -> Result<()> {
        while self.next_frame < start + self.window {
            let frame = self.next_frame;
            self.fleshouts.push_back(fleshout_frame(
                self.data,
                self.indices,
                self.swept,
                frame,
                self.strategy,
                None,
            )?);
            if self.normalization == WindowNormalization::ConnectionCount {
                self.connections.push_back(give_connection_matrix(
                    self.indices.index_axis(Axis(0), frame),
                    None,
                )?);
            }
            self.next_frame += 1;
        }
        self.enforce_window();
        Ok(())
    }

    /// Drop matrices of frames that left the window.
    fn enforce_window(&mut self) {
        while self.fleshouts.len() > self.window {
            self.fleshouts.pop_front();
        }
        while self.connections.len() > self.window {
            self.connections.pop_front();
        }
    }

    fn current(&self) -> Array3<f64> {
        let individuals = self.data.dim().1;
        let shape = (self.swept.dim().0, individuals, individuals);
        let counts = match self.normalization {
            WindowNormalization::Uniform => None,
            WindowNormalization::ConnectionCount => Some(self.connections.iter()),
        };
        reduce_window(self.fleshouts.iter(), counts, self.window, shape)
    }
}

impl Iterator for SlidingFleshout<'_> {
    type Item = Result<Array3<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.starts.next()?;
        if let Err(err) = self.fill_window(start) {
            // A failed frame poisons every later window.
            self.starts = self.starts.end..self.starts.end;
            return Some(Err(err));
        }
        Some(Ok(self.current()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.starts.size_hint()
    }
}

impl ExactSizeIterator for SlidingFleshout<'_> {}

/// Sliding fleshout as configured: normalization, strategy, frame range and
/// eager or lazy materialization all come from `config`.
///
/// # Errors
///
/// As [`sliding_average_fleshout_with_delay`].
pub fn sliding_fleshout(
    data: ArrayView3<'_, f64>,
    indices: ArrayView3<'_, usize>,
    swept: ArrayView5<'_, f64>,
    config: &LeadershipConfig,
) -> Result<Vec<Array3<f64>>> {
    let window = config.num_frames_to_average;
    let available = available_frames(&data, &indices, &swept);
    let starts = window_starts(available, config.start_frame, config.end_frame, window)?;
    debug!(
        windows = starts.len(),
        window,
        normalization = ?config.normalization,
        materialization = ?config.materialization,
        "sliding fleshout"
    );
    match config.materialization {
        Materialization::Eager => sliding_eager(
            data,
            indices,
            swept,
            starts,
            window,
            config.strategy,
            config.normalization,
        ),
        Materialization::Lazy => {
            SlidingFleshout::new(data.view(), indices.view(), swept.view(), config)?.collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::sweep_delays;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array5};

    fn instance() -> (Array3<f64>, Array3<usize>, Array5<f64>) {
        let data = Array3::from_shape_fn((10, 3, 2), |(t, i, c)| {
            let angle = 0.45 * t as f64 + 2.0 * i as f64;
            if c == 0 {
                angle.cos()
            } else {
                angle.sin()
            }
        });
        // Individual 2 is never anyone's neighbour before frame 5.
        let indices = Array3::from_shape_fn((10, 3, 1), |(t, i, _)| match (i, t < 5) {
            (0, true) => 1,
            (1, true) => 0,
            (2, true) => 0,
            (0, false) => 2,
            (1, false) => 2,
            _ => 1,
        });
        let swept = sweep_delays(data.view(), indices.view(), 2).unwrap();
        (data, indices, swept)
    }

    #[test]
    fn test_window_starts() {
        assert_eq!(window_starts(8, 0, None, 3).unwrap(), 0..6);
        assert_eq!(window_starts(8, 2, Some(4), 3).unwrap(), 2..4);
        assert_eq!(window_starts(8, 6, None, 3).unwrap(), 6..6);
        assert!(window_starts(8, 0, Some(7), 3).is_err());
        assert!(window_starts(8, 5, Some(4), 3).is_err());
        assert!(window_starts(8, 0, None, 0).is_err());
        assert!(window_starts(2, 0, None, 3).is_err());
    }

    #[test]
    fn test_uniform_windows_are_means() {
        let (data, indices, swept) = instance();
        let strategy = FleshoutStrategy::Vectorized;
        let windows = sliding_average_fleshout_with_delay(
            data.view(),
            indices.view(),
            swept.view(),
            1,
            Some(4),
            3,
            strategy,
        )
        .unwrap();
        assert_eq!(windows.len(), 3);
        for (offset, window) in windows.iter().enumerate() {
            let start = 1 + offset;
            let mut expected = Array3::<f64>::zeros((2, 3, 3));
            for frame in start..start + 3 {
                expected = fleshout_frame(
                    data.view(),
                    indices.view(),
                    swept.view(),
                    frame,
                    strategy,
                    Some(expected),
                )
                .unwrap();
            }
            assert_abs_diff_eq!(*window, expected / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_connection_normalized_leaves_unseen_cells_at_zero() {
        let (data, indices, swept) = instance();
        let windows = sliding_connection_normalized_fleshout_with_delay(
            data.view(),
            indices.view(),
            swept.view(),
            0,
            Some(2),
            3,
            FleshoutStrategy::Loop,
        )
        .unwrap();
        for window in &windows {
            assert!(window.iter().all(|v| v.is_finite()));
            for d in 0..2 {
                // Nobody attends to individual 2 in frames 0..5.
                assert_eq!(window[[d, 0, 2]], 0.0);
                assert_eq!(window[[d, 1, 2]], 0.0);
                assert_eq!(window[[d, 2, 2]], 0.0);
                assert_eq!(window[[d, 1, 1]], 0.0);
            }
        }
    }

    #[test]
    fn test_connection_normalized_divides_by_counts() {
        let (data, indices, swept) = instance();
        let start = 3;
        let window = 4;
        let windows = sliding_connection_normalized_fleshout_with_delay(
            data.view(),
            indices.view(),
            swept.view(),
            start,
            Some(start + 1),
            window,
            FleshoutStrategy::PerIndividual,
        )
        .unwrap();

        let mut raw = Array3::<f64>::zeros((2, 3, 3));
        let mut counts = Array2::<f64>::zeros((3, 3));
        for frame in start..start + window {
            raw = fleshout_frame(
                data.view(),
                indices.view(),
                swept.view(),
                frame,
                FleshoutStrategy::PerIndividual,
                Some(raw),
            )
            .unwrap();
            counts =
                give_connection_matrix(indices.index_axis(Axis(0), frame), Some(counts)).unwrap();
        }
        // Frames 3, 4 use the early neighbours and 5, 6 the late ones.
        assert_eq!(counts[[0, 1]], 2.0);
        assert_eq!(counts[[0, 2]], 2.0);
        assert_eq!(counts[[2, 0]], 2.0);
        assert_eq!(counts[[2, 1]], 2.0);
        assert_eq!(counts[[1, 1]], 0.0);
        for d in 0..2 {
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if counts[[i, j]] > 0.0 {
                        raw[[d, i, j]] / counts[[i, j]]
                    } else {
                        raw[[d, i, j]]
                    };
                    assert_abs_diff_eq!(windows[0][[d, i, j]], expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_lazy_matches_eager_exactly() {
        let (data, indices, swept) = instance();
        for normalization in [WindowNormalization::Uniform, WindowNormalization::ConnectionCount] {
            let eager = LeadershipConfig::default()
                .with_max_delay(2)
                .with_num_frames_to_average(3)
                .with_normalization(normalization);
            let lazy = eager.clone().with_materialization(Materialization::Lazy);

            let a = sliding_fleshout(data.view(), indices.view(), swept.view(), &eager).unwrap();
            let b = sliding_fleshout(data.view(), indices.view(), swept.view(), &lazy).unwrap();
            assert_eq!(a.len(), 6);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_lazy_buffer_stays_bounded() {
        let (data, indices, swept) = instance();
        let config = LeadershipConfig::default()
            .with_max_delay(2)
            .with_num_frames_to_average(3)
            .with_normalization(WindowNormalization::ConnectionCount)
            .with_materialization(Materialization::Lazy);
        let mut windows =
            SlidingFleshout::new(data.view(), indices.view(), swept.view(), &config).unwrap();
        while let Some(window) = windows.next() {
            window.unwrap();
            assert!(windows.fleshouts.len() <= 3);
            assert!(windows.connections.len() <= 3);
        }
    }

    #[test]
    fn test_empty_range_yields_nothing() {
        let (data, indices, swept) = instance();
        let windows = sliding_average_fleshout_with_delay(
            data.view(),
            indices.view(),
            swept.view(),
            2,
            Some(2),
            3,
            FleshoutStrategy::Loop,
        )
        .unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_reduce_window_guards_zero_counts() {
        let fleshouts = [array![[[2.0, 3.0], [4.0, 0.0]]]];
        let counts = [array![[2.0, 0.0], [4.0, 0.0]]];
        let reduced = reduce_window(fleshouts.iter(), Some(counts.iter()), 1, (1, 2, 2));
        assert_eq!(reduced, array![[[1.0, 3.0], [1.0, 0.0]]]);
    }
}
