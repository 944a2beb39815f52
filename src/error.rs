use thiserror::Error;

/// Error type for cutout operations
///
/// A buffer without an alpha channel is never an error: every stage treats
/// it as a pass-through. The variants below are precondition violations by
/// the caller or failures reported by the segmentation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutoutError {
    /// Two buffers that must share a size do not
    ///
    /// This error occurs when an alpha mask is merged into a color image of
    /// a different size, or when a segmenter returns a matte whose size
    /// differs from its input.
    #[error("Image dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The sample layout is not 8-bit RGB or 8-bit RGBA
    #[error("Unsupported sample format: {0}")]
    InvalidSampleFormat(String),

    /// A raw sample vector does not fit the declared shape
    #[error("Sample buffer has {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        /// Byte count implied by width, height and channel count
        expected: usize,
        /// Byte count actually supplied
        actual: usize,
    },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a configuration value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The segmentation collaborator failed
    #[error("Segmentation failed: {0}")]
    Segmentation(String),
}
