//! Error types for social-context operations.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors abort the
//! whole call; no partial results are ever returned.

use thiserror::Error;

/// Main error type for social-context operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialContextError {
    /// The requested operation is intentionally not implemented (negative delays).
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Two arrays that must agree on an axis do not.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A neighbour identity does not name an individual of the paired array.
    #[error("Neighbour index {index} out of range for {individuals} individuals")]
    IndexOutOfRange { index: usize, individuals: usize },

    /// An individual selector is out of range.
    #[error("Individual {individual} out of range for {individuals} individuals")]
    IndividualOutOfRange { individual: usize, individuals: usize },

    /// A frame selector is out of range.
    #[error("Frame {frame} out of range for {frames} frames")]
    FrameOutOfRange { frame: usize, frames: usize },

    /// Trimming the time axis left no frames.
    #[error("Empty time window: {time_steps} time steps cannot cover a delay of {max_delay}")]
    EmptyTimeWindow { time_steps: usize, max_delay: usize },

    /// An average was requested over no frames.
    #[error("Cannot average over an empty list of frames")]
    EmptyFrames,

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for social-context operations.
pub type Result<T> = std::result::Result<T, SocialContextError>;

impl SocialContextError {
    /// Create an unsupported operation error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// Create a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(
        context: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a neighbour index out of range error.
    #[must_use]
    pub const fn index_out_of_range(index: usize, individuals: usize) -> Self {
        Self::IndexOutOfRange { index, individuals }
    }

    /// Create an individual out of range error.
    #[must_use]
    pub const fn individual_out_of_range(individual: usize, individuals: usize) -> Self {
        Self::IndividualOutOfRange {
            individual,
            individuals,
        }
    }

    /// Create a frame out of range error.
    #[must_use]
    pub const fn frame_out_of_range(frame: usize, frames: usize) -> Self {
        Self::FrameOutOfRange { frame, frames }
    }

    /// Create an empty time window error.
    #[must_use]
    pub const fn empty_time_window(time_steps: usize, max_delay: usize) -> Self {
        Self::EmptyTimeWindow {
            time_steps,
            max_delay,
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SocialContextError::empty_time_window(10, 12);
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("12"));

        let err = SocialContextError::index_out_of_range(7, 3);
        assert_eq!(
            err.to_string(),
            "Neighbour index 7 out of range for 3 individuals"
        );
    }

    #[test]
    fn test_shape_mismatch_keeps_shapes() {
        let err = SocialContextError::shape_mismatch("restrict", &[4, 3], &[5, 3]);
        match err {
            SocialContextError::ShapeMismatch {
                context,
                expected,
                actual,
            } => {
                assert_eq!(context, "restrict");
                assert_eq!(expected, vec![4, 3]);
                assert_eq!(actual, vec![5, 3]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_error_constructors() {
        assert_eq!(
            SocialContextError::unsupported("negative delay -1"),
            SocialContextError::UnsupportedOperation("negative delay -1".to_string())
        );
        assert_eq!(
            SocialContextError::unsupported("negative delay -1").to_string(),
            "Unsupported operation: negative delay -1"
        );
        assert_eq!(
            SocialContextError::individual_out_of_range(4, 3).to_string(),
            "Individual 4 out of range for 3 individuals"
        );
        assert_eq!(
            SocialContextError::frame_out_of_range(9, 8),
            SocialContextError::FrameOutOfRange { frame: 9, frames: 8 }
        );
        assert_eq!(
            SocialContextError::frame_out_of_range(9, 8).to_string(),
            "Frame 9 out of range for 8 frames"
        );
        assert_eq!(
            SocialContextError::EmptyFrames.to_string(),
            "Cannot average over an empty list of frames"
        );
        assert_eq!(
            SocialContextError::invalid_input("window must be positive").to_string(),
            "Invalid input: window must be positive"
        );
        assert!(matches!(
            SocialContextError::invalid_config("max_delay must be positive"),
            SocialContextError::InvalidConfig(msg) if msg == "max_delay must be positive"
        ));
    }
}
