//! Array utilities shared by the social-context pipeline.
//!
//! This module provides:
//! - [`linalg`]: dot products and normalization along the coordinate axis
//! - [`collective`]: group reductions (polarization)

pub mod collective;
pub mod linalg;

pub use collective::polarization;
pub use linalg::{dot_last_axis, normalize_last_axis};
