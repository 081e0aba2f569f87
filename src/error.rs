//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use thiserror::Error;

/// Main error type for embin operations
#[derive(Error, Debug)]
pub enum EmbinError {
    /// Invalid input data or configuration (K out of range, empty matrix,
    /// dimension mismatches, bad k-mer length)
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A deliberately unimplemented code path was requested
    /// (e.g. starting EM from fixed centroids)
    #[error("unsupported mode: {message}")]
    UnsupportedMode { message: String },

    /// Non-finite likelihood or other unrecoverable numerical failure
    #[error("numerical anomaly: {message}")]
    NumericalAnomaly { message: String },

    /// A run was aborted between iterations via a `CancelToken`
    #[error("run cancelled")]
    Cancelled,
}

/// Type alias for Results using EmbinError
pub type Result<T> = std::result::Result<T, EmbinError>;

impl EmbinError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an unsupported mode error
    pub fn unsupported_mode(message: impl Into<String>) -> Self {
        Self::UnsupportedMode {
            message: message.into(),
        }
    }

    /// Create a numerical anomaly error
    pub fn numerical_anomaly(message: impl Into<String>) -> Self {
        Self::NumericalAnomaly {
            message: message.into(),
        }
    }
}
