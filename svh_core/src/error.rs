//! Error types for svh_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Error types that can occur during svh_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvhCoreError {
    /// A voxel size component was zero, negative, or not finite.
    InvalidVoxelSize {
        /// The offending component.
        value: f32,
    },
}

impl fmt::Display for SvhCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvhCoreError::InvalidVoxelSize { value } => {
                write!(f, "voxel size {} must be finite and positive", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SvhCoreError {}
