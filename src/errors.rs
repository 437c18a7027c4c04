// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth sensing
//!
//! Per-frame failures are recoverable: the ingestor logs them and keeps the
//! last known good state. Only configuration loading surfaces errors to callers.

use std::fmt;

/// Result type alias using DepthError
pub type DepthResult<T> = Result<T, DepthError>;

/// Depth sensing error type
#[derive(Debug, Clone, PartialEq)]
pub enum DepthError {
    /// The viewer pose could not be resolved against the reference space
    PoseUnavailable,
    /// A required view delivered no raw depth this frame
    MissingViewData {
        /// Index of the view that had no data
        view: usize,
    },
    /// Raw depth buffer length does not match `width * height`
    InvalidSample {
        /// Index of the offending view
        view: usize,
        /// Expected number of samples
        expected: usize,
        /// Number of samples actually delivered
        actual: usize,
    },
    /// GPU to CPU depth conversion is not available on this platform
    UnsupportedConversion(String),
    /// Configuration errors
    Config(String),
    /// Filesystem errors
    Io(String),
}

impl fmt::Display for DepthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthError::PoseUnavailable => write!(f, "Viewer pose unavailable"),
            DepthError::MissingViewData { view } => {
                write!(f, "No depth data for view {}", view)
            }
            DepthError::InvalidSample {
                view,
                expected,
                actual,
            } => write!(
                f,
                "Invalid depth sample for view {}: expected {} values, got {}",
                view, expected, actual
            ),
            DepthError::UnsupportedConversion(msg) => {
                write!(f, "GPU depth conversion unsupported: {}", msg)
            }
            DepthError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DepthError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DepthError {}

impl From<std::io::Error> for DepthError {
    fn from(err: std::io::Error) -> Self {
        DepthError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DepthError {
    fn from(err: serde_json::Error) -> Self {
        DepthError::Config(err.to_string())
    }
}

impl From<image::ImageError> for DepthError {
    fn from(err: image::ImageError) -> Self {
        DepthError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_view() {
        let msg = DepthError::InvalidSample {
            view: 2,
            expected: 16,
            actual: 8,
        }
        .to_string();
        assert!(msg.contains("view 2"));
        assert!(msg.contains("16"));
    }
}
