//! Configuration for leadership (delayed social-context) analysis.
//!
//! This module provides the [`LeadershipConfig`] struct which centralizes the
//! tunable parameters of the sweep/fleshout pipeline, along with presets.
//!
//! # Example
//!
//! ```
//! use social_context::{FleshoutStrategy, LeadershipConfig};
//!
//! // Use default configuration
//! let config = LeadershipConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // Start from a preset and adjust it
//! let config = LeadershipConfig::fast_response()
//!     .with_max_delay(4)
//!     .with_strategy(FleshoutStrategy::Loop);
//! assert_eq!(config.max_delay, 4);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SocialContextError};

/// Configuration for leadership analysis.
///
/// # Parameters
///
/// - `max_delay`: number of delays swept, `0..max_delay`.
/// - `num_frames_to_average`: sliding-window length in frames.
/// - `strategy`: how per-frame fleshout matrices are computed.
/// - `normalization`: how a window of fleshout matrices is reduced.
/// - `materialization`: whether intermediates are built up front or streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeadershipConfig {
    /// Number of delays to sweep (delays `0..max_delay`).
    pub max_delay: usize,

    /// Number of consecutive frames averaged by the sliding aggregators.
    pub num_frames_to_average: usize,

    /// First window start of the sliding aggregation.
    pub start_frame: usize,

    /// One past the last window start. `None` runs to the last full window.
    pub end_frame: Option<usize>,

    /// Strategy used to compute per-frame fleshout matrices.
    pub strategy: FleshoutStrategy,

    /// Reduction applied to each window of fleshout matrices.
    pub normalization: WindowNormalization,

    /// Eager or lazy construction of intermediates.
    pub materialization: Materialization,
}

/// Strategy for computing one frame's fleshout matrix.
///
/// All strategies agree to floating-point tolerance; they differ in how
/// much work is batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FleshoutStrategy {
    /// Explicit double loop over individuals and neighbour slots.
    Loop,
    /// One contraction per individual over (delay, slot, coordinate).
    PerIndividual,
    /// One contraction over all individuals, then a scatter per individual.
    #[default]
    Vectorized,
}

/// Reduction applied to a window of per-frame fleshout matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowNormalization {
    /// Sum divided by the number of frames in the window.
    #[default]
    Uniform,
    /// Sum divided element-wise by the summed connection counts, where positive.
    ConnectionCount,
}

/// How large intermediates are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Materialization {
    /// Build every per-delay slab and per-frame matrix before reducing.
    #[default]
    Eager,
    /// Stream per-delay slabs and keep only one window of per-frame matrices.
    Lazy,
}

impl Default for LeadershipConfig {
    fn default() -> Self {
        Self {
            max_delay: 10,
            num_frames_to_average: 50,
            start_frame: 0,
            end_frame: None,
            strategy: FleshoutStrategy::Vectorized,
            normalization: WindowNormalization::Uniform,
            materialization: Materialization::Eager,
        }
    }
}

impl LeadershipConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.max_delay == 0 {
            return Err(SocialContextError::invalid_config(
                "max_delay must be positive",
            ));
        }
        if self.num_frames_to_average == 0 {
            return Err(SocialContextError::invalid_config(
                "num_frames_to_average must be positive",
            ));
        }
        if let Some(end) = self.end_frame {
            if end < self.start_frame {
                return Err(SocialContextError::invalid_config(format!(
                    "end_frame {end} precedes start_frame {}",
                    self.start_frame
                )));
            }
        }
        Ok(())
    }

    /// Preset for short reaction times: few delays, short windows.
    #[must_use]
    pub fn fast_response() -> Self {
        Self {
            max_delay: 5,
            num_frames_to_average: 10,
            ..Self::default()
        }
    }

    /// Preset for long recordings: many delays, connection-normalized
    /// windows, streamed intermediates to bound peak memory.
    #[must_use]
    pub fn long_memory() -> Self {
        Self {
            max_delay: 30,
            num_frames_to_average: 100,
            normalization: WindowNormalization::ConnectionCount,
            materialization: Materialization::Lazy,
            ..Self::default()
        }
    }

    /// Set the number of swept delays.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: usize) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the sliding-window length.
    #[must_use]
    pub const fn with_num_frames_to_average(mut self, frames: usize) -> Self {
        self.num_frames_to_average = frames;
        self
    }

    /// Set the window start range.
    #[must_use]
    pub const fn with_frame_range(mut self, start_frame: usize, end_frame: Option<usize>) -> Self {
        self.start_frame = start_frame;
        self.end_frame = end_frame;
        self
    }

    /// Set the fleshout strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: FleshoutStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the window normalization.
    #[must_use]
    pub const fn with_normalization(mut self, normalization: WindowNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the materialization mode.
    #[must_use]
    pub const fn with_materialization(mut self, materialization: Materialization) -> Self {
        self.materialization = materialization;
        self
    }
}
