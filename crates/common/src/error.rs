//! Error types shared across slit-scan crates.

/// Top-level error type for slit-scan operations.
#[derive(Debug, thiserror::Error)]
pub enum SlitScanError {
    /// Capacity arithmetic would leave the signed 32-bit range.
    #[error("Arithmetic overflow: {message}")]
    ArithmeticOverflow { message: String },

    /// The host allocator could not provide the requested bytes.
    #[error("Allocation failed: {message}")]
    Allocation { message: String },

    #[error("Invalid dimensions: {message}")]
    InvalidDimensions { message: String },

    /// Malformed input reported by a frame source or output surface.
    /// Recovered at the frame boundary; never fatal to a session.
    #[error("Frame processing error: {message}")]
    FrameProcessing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using SlitScanError.
pub type SlitScanResult<T> = Result<T, SlitScanError>;

impl SlitScanError {
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            message: msg.into(),
        }
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation {
            message: msg.into(),
        }
    }

    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            message: msg.into(),
        }
    }

    pub fn frame_processing(msg: impl Into<String>) -> Self {
        Self::FrameProcessing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error belongs to a single frame rather than the session.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::FrameProcessing { .. })
    }
}
