//! Colour channel discriminators.

use serde::{Deserialize, Serialize};

/// A component of a YUV (YCbCr) sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YuvChannel {
    /// Luma, one byte per pixel.
    Y,
    /// Blue-difference chroma (Cb), one byte per 2x2 block.
    U,
    /// Red-difference chroma (Cr), one byte per 2x2 block.
    V,
}

impl YuvChannel {
    pub const ALL: [YuvChannel; 3] = [YuvChannel::Y, YuvChannel::U, YuvChannel::V];

    pub fn is_chroma(self) -> bool {
        !matches!(self, YuvChannel::Y)
    }
}

/// A component of an output RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RgbChannel {
    R,
    G,
    B,
}

impl RgbChannel {
    pub const ALL: [RgbChannel; 3] = [RgbChannel::R, RgbChannel::G, RgbChannel::B];

    /// Byte index of this channel within an RGB or RGBX pixel.
    pub fn index(self) -> usize {
        match self {
            RgbChannel::R => 0,
            RgbChannel::G => 1,
            RgbChannel::B => 2,
        }
    }
}
