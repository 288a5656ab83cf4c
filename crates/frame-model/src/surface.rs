//! Output surfaces receiving composited RGB pixels.

use crate::channel::RgbChannel;
use crate::error::AccessError;

/// Write access to an RGB destination.
pub trait OutputSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn set_pixel(&mut self, x: u32, y: u32, channel: RgbChannel, value: u8)
        -> Result<(), AccessError>;
}

const RGBX_BYTES_PER_PIXEL: usize = 4;

/// An owned R8G8B8X8 surface, the layout display compositors usually hand
/// out for texture-backed windows. The padding byte is kept at 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbxSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbxSurface {
    /// A black surface.
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * RGBX_BYTES_PER_PIXEL];
        for px in pixels.chunks_exact_mut(RGBX_BYTES_PER_PIXEL) {
            px[3] = 0xFF;
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// The RGB triple at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Raw RGBX bytes, row-major with no padding between rows.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Packed RGB bytes, dropping the padding channel.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(RGBX_BYTES_PER_PIXEL)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * RGBX_BYTES_PER_PIXEL
    }
}

impl OutputSurface for RgbxSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(
        &mut self,
        x: u32,
        y: u32,
        channel: RgbChannel,
        value: u8,
    ) -> Result<(), AccessError> {
        if x >= self.width || y >= self.height {
            return Err(AccessError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let i = self.index(x, y) + channel.index();
        self.pixels[i] = value;
        Ok(())
    }
}
