//! Ring-buffer capacity arithmetic.
//!
//! Capacity is computed in a signed 32-bit accumulator, matching what
//! host allocators with `int`-sized length parameters can accept. Every
//! multiplication is checked before it happens so that very large sensor
//! resolutions fail loudly instead of wrapping into an undersized buffer.

use slitscan_common::{SlitScanError, SlitScanResult};

/// Largest byte count the capacity accumulator may hold.
pub const CAPACITY_LIMIT: i32 = i32::MAX;

/// Reject dimensions the YUV 4:2:0 layout cannot represent.
///
/// Both sides must be positive, even (chroma is subsampled in 2x2 blocks)
/// and fit the signed 32-bit accumulator.
pub fn validate_dimensions(width: u32, height: u32) -> SlitScanResult<()> {
    if width == 0 || height == 0 {
        return Err(SlitScanError::invalid_dimensions(format!(
            "{width}x{height}: both sides must be positive"
        )));
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(SlitScanError::invalid_dimensions(format!(
            "{width}x{height}: YUV 4:2:0 frames need even sides"
        )));
    }
    if width > CAPACITY_LIMIT as u32 || height > CAPACITY_LIMIT as u32 {
        return Err(SlitScanError::overflow(format!(
            "{width}x{height}: side exceeds {CAPACITY_LIMIT}"
        )));
    }
    Ok(())
}

/// Byte capacity of a ring holding `max(width, height)` YUV 4:2:0 frames.
///
/// Returns `ArithmeticOverflow` when any intermediate product would exceed
/// [`CAPACITY_LIMIT`].
pub fn ring_capacity(width: u32, height: u32) -> SlitScanResult<usize> {
    validate_dimensions(width, height)?;

    let (w, h) = (width as i32, height as i32);
    let depth = w.max(h);

    let area = checked_product(w, h, "width * height")?;
    let half_plane = area / 2;
    let frame_bytes = checked_product(half_plane, 3, "frame bytes")?;
    let total = checked_product(frame_bytes, depth, "ring capacity")?;

    Ok(total as usize)
}

fn checked_product(a: i32, b: i32, what: &str) -> SlitScanResult<i32> {
    if a > CAPACITY_LIMIT / b {
        return Err(SlitScanError::overflow(format!(
            "{what} ({a} * {b}) exceeds {CAPACITY_LIMIT}"
        )));
    }
    Ok(a * b)
}
