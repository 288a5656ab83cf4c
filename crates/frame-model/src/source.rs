//! Incoming YUV 4:2:0 camera frames.
//!
//! Camera APIs hand out three planes with independent row and pixel
//! strides (Android's YUV_420_888 being the common case). [`Yuv420Frame`]
//! borrows such planes without copying; packed NV21 and I420 buffers are
//! just particular stride choices.

use crate::channel::YuvChannel;
use crate::error::AccessError;

/// Read access to one incoming frame.
///
/// The frame must stay immutable for the duration of a composite pass;
/// implementations shared across worker threads must also be `Sync`.
pub trait FrameSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Sample one channel at pixel `(x, y)`. Chroma channels resolve to the
    /// 2x2 block containing the pixel.
    fn sample(&self, x: u32, y: u32, channel: YuvChannel) -> Result<u8, AccessError>;
}

/// One plane of a strided image.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Bytes between the starts of consecutive rows.
    pub row_stride: usize,
    /// Bytes between horizontally adjacent samples.
    pub pixel_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Bytes needed to address a `cols` x `rows` sample grid, or `None`
    /// when the strides overflow `usize`.
    pub fn required_len(&self, cols: usize, rows: usize) -> Option<usize> {
        if cols == 0 || rows == 0 {
            return Some(0);
        }
        self.offset(cols - 1, rows - 1)?.checked_add(1)
    }

    fn stride_overflow(&self, channel: YuvChannel) -> AccessError {
        AccessError::StrideOverflow {
            channel,
            row_stride: self.row_stride,
            pixel_stride: self.pixel_stride,
        }
    }

    fn offset(&self, col: usize, row: usize) -> Option<usize> {
        row.checked_mul(self.row_stride)?
            .checked_add(col.checked_mul(self.pixel_stride)?)
    }
}

/// A borrowed three-plane YUV 4:2:0 frame.
#[derive(Debug, Clone, Copy)]
pub struct Yuv420Frame<'a> {
    width: u32,
    height: u32,
    y: Plane<'a>,
    u: Plane<'a>,
    v: Plane<'a>,
}

impl<'a> Yuv420Frame<'a> {
    /// Wrap explicit planes. Plane lengths are only checked on access or by
    /// [`Yuv420Frame::validate`].
    pub fn from_planes(width: u32, height: u32, y: Plane<'a>, u: Plane<'a>, v: Plane<'a>) -> Self {
        Self {
            width,
            height,
            y,
            u,
            v,
        }
    }

    /// Packed NV21: a luma plane followed by interleaved V/U pairs.
    pub fn nv21(width: u32, height: u32, data: &'a [u8]) -> Self {
        let w = width as usize;
        let luma_len = w * height as usize;
        let (luma, chroma) = data.split_at(luma_len.min(data.len()));
        let u = chroma.get(1..).unwrap_or(&[]);
        Self::from_planes(
            width,
            height,
            Plane::new(luma, w, 1),
            Plane::new(u, w, 2),
            Plane::new(chroma, w, 2),
        )
    }

    /// Packed I420: luma, then the full U plane, then the full V plane.
    pub fn i420(width: u32, height: u32, data: &'a [u8]) -> Self {
        let w = width as usize;
        let chroma_w = w / 2;
        let luma_len = w * height as usize;
        let chroma_len = chroma_w * (height as usize / 2);
        let (luma, rest) = data.split_at(luma_len.min(data.len()));
        let (u, v) = rest.split_at(chroma_len.min(rest.len()));
        Self::from_planes(
            width,
            height,
            Plane::new(luma, w, 1),
            Plane::new(u, chroma_w, 1),
            Plane::new(v, chroma_w, 1),
        )
    }

    /// Check every plane is long enough for the frame geometry.
    pub fn validate(&self) -> Result<(), AccessError> {
        let (w, h) = (self.width as usize, self.height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        for (channel, plane, cols, rows) in [
            (YuvChannel::Y, &self.y, w, h),
            (YuvChannel::U, &self.u, cw, ch),
            (YuvChannel::V, &self.v, cw, ch),
        ] {
            let required = plane
                .required_len(cols, rows)
                .ok_or_else(|| plane.stride_overflow(channel))?;
            if plane.data.len() < required {
                return Err(AccessError::PlaneTooShort {
                    channel,
                    required,
                    actual: plane.data.len(),
                });
            }
        }
        Ok(())
    }

    fn plane(&self, channel: YuvChannel) -> &Plane<'a> {
        match channel {
            YuvChannel::Y => &self.y,
            YuvChannel::U => &self.u,
            YuvChannel::V => &self.v,
        }
    }
}

impl FrameSource for Yuv420Frame<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn sample(&self, x: u32, y: u32, channel: YuvChannel) -> Result<u8, AccessError> {
        if x >= self.width || y >= self.height {
            return Err(AccessError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let (col, row) = if channel.is_chroma() {
            (x as usize >> 1, y as usize >> 1)
        } else {
            (x as usize, y as usize)
        };
        let plane = self.plane(channel);
        let offset = plane
            .offset(col, row)
            .ok_or_else(|| plane.stride_overflow(channel))?;
        plane
            .data
            .get(offset)
            .copied()
            .ok_or(AccessError::PlaneTooShort {
                channel,
                required: offset + 1,
                actual: plane.data.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x2 NV21 frame: luma 0..8, then one V/U pair per 2x2 block.
    fn nv21_fixture() -> Vec<u8> {
        vec![0, 1, 2, 3, 4, 5, 6, 7, 200, 100, 201, 101]
    }

    #[test]
    fn nv21_reads_luma_per_pixel() {
        let data = nv21_fixture();
        let frame = Yuv420Frame::nv21(4, 2, &data);
        assert_eq!(frame.sample(3, 1, YuvChannel::Y), Ok(7));
        assert_eq!(frame.sample(0, 1, YuvChannel::Y), Ok(4));
    }

    #[test]
    fn nv21_shares_chroma_across_block() {
        let data = nv21_fixture();
        let frame = Yuv420Frame::nv21(4, 2, &data);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(frame.sample(x, y, YuvChannel::V), Ok(200));
            assert_eq!(frame.sample(x, y, YuvChannel::U), Ok(100));
        }
        assert_eq!(frame.sample(2, 1, YuvChannel::V), Ok(201));
        assert_eq!(frame.sample(3, 0, YuvChannel::U), Ok(101));
    }

    #[test]
    fn i420_reads_separate_planes() {
        let data = vec![0, 1, 2, 3, 4, 5, 6, 7, 10, 11, 20, 21];
        let frame = Yuv420Frame::i420(4, 2, &data);
        assert!(frame.validate().is_ok());
        assert_eq!(frame.sample(2, 0, YuvChannel::U), Ok(11));
        assert_eq!(frame.sample(1, 1, YuvChannel::V), Ok(20));
    }

    #[test]
    fn strided_planes_skip_padding() {
        // Row stride 6 for a 4-wide frame: two padding bytes per row.
        let luma = [1, 2, 3, 4, 0, 0, 5, 6, 7, 8, 0, 0];
        let u = [9, 0, 10];
        let v = [11, 0, 12];
        let frame = Yuv420Frame::from_planes(
            4,
            2,
            Plane::new(&luma, 6, 1),
            Plane::new(&u, 4, 2),
            Plane::new(&v, 4, 2),
        );
        assert!(frame.validate().is_ok());
        assert_eq!(frame.sample(0, 1, YuvChannel::Y), Ok(5));
        assert_eq!(frame.sample(3, 1, YuvChannel::U), Ok(10));
    }

    #[test]
    fn truncated_plane_reports_error() {
        let data = nv21_fixture();
        let frame = Yuv420Frame::nv21(4, 2, &data[..10]);
        assert!(matches!(
            frame.validate(),
            Err(AccessError::PlaneTooShort { .. })
        ));
        assert!(matches!(
            frame.sample(3, 1, YuvChannel::U),
            Err(AccessError::PlaneTooShort {
                channel: YuvChannel::U,
                ..
            })
        ));
        // Luma is intact and still readable.
        assert_eq!(frame.sample(3, 1, YuvChannel::Y), Ok(7));
    }

    #[test]
    fn oversized_stride_reports_error() {
        let luma = [0u8; 16];
        let chroma = [128u8; 4];
        let stride = usize::MAX / 2 + 1;
        let frame = Yuv420Frame::from_planes(
            4,
            4,
            Plane::new(&luma, stride, 1),
            Plane::new(&chroma, 2, 1),
            Plane::new(&chroma, 2, 1),
        );
        assert!(matches!(
            frame.sample(0, 2, YuvChannel::Y),
            Err(AccessError::StrideOverflow {
                channel: YuvChannel::Y,
                ..
            })
        ));
        assert!(matches!(
            frame.validate(),
            Err(AccessError::StrideOverflow { .. })
        ));
        // Row 0 never multiplies the stride.
        assert_eq!(frame.sample(1, 0, YuvChannel::Y), Ok(0));
        assert_eq!(Plane::new(&luma, stride, 1).required_len(1, 3), None);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let data = nv21_fixture();
        let frame = Yuv420Frame::nv21(4, 2, &data);
        assert_eq!(
            frame.sample(4, 0, YuvChannel::Y),
            Err(AccessError::OutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 2
            })
        );
    }
}
