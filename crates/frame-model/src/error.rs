//! Errors raised by frame sources and output surfaces.

use slitscan_common::SlitScanError;

use crate::channel::YuvChannel;

/// A malformed-input condition observed while reading a frame or writing
/// a surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("{channel:?} plane holds {actual} bytes but {required} are required")]
    PlaneTooShort {
        channel: YuvChannel,
        required: usize,
        actual: usize,
    },

    #[error("{channel:?} plane strides ({row_stride}, {pixel_stride}) overflow the address space")]
    StrideOverflow {
        channel: YuvChannel,
        row_stride: usize,
        pixel_stride: usize,
    },

    #[error("expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("surface rejected write: {message}")]
    Surface { message: String },
}

impl From<AccessError> for SlitScanError {
    fn from(err: AccessError) -> Self {
        SlitScanError::frame_processing(err.to_string())
    }
}
