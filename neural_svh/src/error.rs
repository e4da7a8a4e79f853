//! Error types for neural_svh.

use thiserror::Error;

/// Errors that can occur while building or evaluating the encoder and decoder.
#[derive(Error, Debug)]
pub enum NeuralSvhError {
    /// The decoder was configured with an aggregation mode it does not implement.
    #[error("unsupported aggregation mode '{mode}': expected 'cat' or 'sum'")]
    UnsupportedAggregation {
        /// The rejected mode string.
        mode: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// No grid is built at a depth the caller needs.
    #[error("grid structure is not built at depth {depth}")]
    GridNotBuilt {
        /// The hierarchy depth.
        depth: usize,
    },

    /// A grid exists at this depth but no latent code tensor was supplied for it.
    #[error("no voxel features supplied for depth {depth}")]
    MissingFeatures {
        /// The hierarchy depth.
        depth: usize,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Error from the voxel coordinate maths.
    #[error("voxel coordinate error: {0}")]
    Core(#[from] svh_core::SvhCoreError),

    /// Invalid or corrupted data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type for neural_svh operations.
pub type Result<T> = std::result::Result<T, NeuralSvhError>;
