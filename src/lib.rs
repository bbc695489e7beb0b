//! Social Context Library
//!
//! Delayed, neighbour-restricted aggregation of multi-individual trajectories
//! for leadership analysis of animal-tracking data.
//!
//! Trajectory arrays are `(time, individual, coord)` and neighbour-index
//! arrays are `(time, individual, slot)`. From those the crate builds:
//!
//! - **Restrictions**: each individual's neighbours' values, optionally
//!   shifted by a delay
//! - **Delay sweeps**: restrictions for every delay `0..max_delay`, aligned to
//!   a common window of `T - max_delay` frames
//! - **Projections**: each individual's orientation projected onto its
//!   delayed neighbours' polarization
//! - **Fleshouts**: dense `(delay, individual, individual)` interaction
//!   matrices, averaged over sliding windows
//!
//! # Quick Start
//!
//! ```
//! use ndarray::Array3;
//! use social_context::{compute_leadership_profile, LeadershipConfig, WindowNormalization};
//!
//! let orientation = Array3::from_shape_fn((30, 4, 2), |(t, i, c)| {
//!     let angle = 0.1 * t as f64 - 0.4 * i as f64;
//!     if c == 0 { angle.cos() } else { angle.sin() }
//! });
//! // Two neighbours per individual, never the individual itself.
//! let indices = Array3::from_shape_fn((30, 4, 2), |(_, i, k)| (i + k + 1) % 4);
//!
//! let config = LeadershipConfig::default()
//!     .with_max_delay(5)
//!     .with_num_frames_to_average(10)
//!     .with_normalization(WindowNormalization::ConnectionCount);
//! let profile = compute_leadership_profile(orientation.view(), indices.view(), &config)?;
//!
//! assert_eq!(profile.projection.dim(), (5, 25, 4));
//! assert_eq!(profile.windows.len(), 16);
//! # Ok::<(), social_context::SocialContextError>(())
//! ```
//!
//! # Building Blocks
//!
//! | Function | Output shape |
//! |----------|--------------|
//! | [`restrict`] | `(T, N, K, C)` |
//! | [`restrict_with_delay`] | `(T - d, N, K, C)` |
//! | [`sweep_delays`] | `(D, T - D, N, K, C)` |
//! | [`sweep_delayed_orientation_with_neighbours`] | `(D, T - D, N)` |
//! | [`fleshout_with_delay`] | `(D, N, N)` |
//! | [`give_connection_matrix`] | `(N, N)` |
//!
//! Large recordings can stream intermediates instead of building them up
//! front, see [`DelaySweep`], [`SlidingFleshout`] and [`Materialization`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod connection;
pub mod delay;
pub mod error;
pub mod fleshout;
pub mod leadership;
pub mod math;
pub mod neighbours;
pub mod projection;
pub mod sliding;
pub mod trajectories;

// Re-exports for convenient access
pub use config::{FleshoutStrategy, LeadershipConfig, Materialization, WindowNormalization};
pub use connection::{give_connection_matrix, give_connection_matrix_into};
pub use delay::{
    restrict_individual_with_delay, restrict_with_delay, sweep_delays, sweep_delays_individual,
    DelaySweep,
};
pub use error::{Result, SocialContextError};
pub use fleshout::{fleshout_frame, fleshout_frame_into, fleshout_with_delay};
pub use leadership::{compute_leadership_profile, leadership_profile_of, LeadershipProfile};
pub use math::{dot_last_axis, polarization};
pub use neighbours::{nearest_neighbour_indices, restrict, restrict_individual};
pub use projection::{
    sweep_delayed_orientation_streamed, sweep_delayed_orientation_with,
    sweep_delayed_orientation_with_neighbours, DelayedProjection,
};
pub use sliding::{
    sliding_average_fleshout_with_delay, sliding_connection_normalized_fleshout_with_delay,
    sliding_fleshout, SlidingFleshout,
};
pub use trajectories::{CenterOfMass, Trajectories};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
