//! The slit-scan sweep.
//!
//! For every output pixel, sample the frame `k` frames in the past where
//! `k` grows along the scan axis (rows in landscape, columns in portrait).
//! One pass runs in four phases:
//!
//! 1. **Stage** the incoming frame into scratch, row-parallel.
//! 2. **Sweep** destination rows in parallel: map each back to its source
//!    pixel, pick the historical slot, convert to RGB.
//! 3. **Present** the RGB scratch on the output surface.
//! 4. **Commit** the staged frame into the ring and advance the cursor.
//!
//! Phases 1-3 only read the ring, so a failure in any of them leaves the
//! ring and cursor exactly as they were. Every parallel task writes a
//! disjoint row of scratch memory; no locks are taken.

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

use rayon::prelude::*;
use slitscan_common::SlitScanResult;
use slitscan_frame_model::{
    AccessError, FrameSource, Orientation, OutputSurface, RgbChannel, YuvChannel,
};

use crate::color::ColorConverter;
use crate::ring_buffer::{FrameGeometry, FrameRingBuffer, U_BYTE, V_BYTE};
use crate::transform::CoordinateTransformer;

const RGB_BYTES_PER_PIXEL: usize = 3;

/// Where the row loops run.
#[derive(Debug, Clone, Copy)]
pub enum Schedule<'a> {
    /// On the calling thread.
    Sequential,
    /// On a rayon pool; the call returns after every row has joined.
    Parallel(&'a rayon::ThreadPool),
}

/// Memory reused across frames: the staged incoming slot and the RGB image.
#[derive(Debug, Default)]
pub struct CompositeScratch {
    staged: Vec<u8>,
    rgb: Vec<u8>,
}

impl CompositeScratch {
    pub fn for_geometry(geometry: FrameGeometry) -> Self {
        Self {
            staged: vec![0; geometry.slot_len()],
            rgb: vec![0; geometry.luma_len() * RGB_BYTES_PER_PIXEL],
        }
    }

    /// Destination-ordered RGB bytes of the last swept frame.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    fn fit(&mut self, geometry: FrameGeometry) {
        self.staged.resize(geometry.slot_len(), 0);
        self.rgb.resize(geometry.luma_len() * RGB_BYTES_PER_PIXEL, 0);
    }
}

/// Runs composite passes under a fixed schedule.
#[derive(Debug, Clone, Copy)]
pub struct SlitScanCompositor<'a> {
    schedule: Schedule<'a>,
}

impl<'a> SlitScanCompositor<'a> {
    pub fn new(schedule: Schedule<'a>) -> Self {
        Self { schedule }
    }

    pub fn sequential() -> Self {
        Self::new(Schedule::Sequential)
    }

    pub fn parallel(pool: &'a rayon::ThreadPool) -> Self {
        Self::new(Schedule::Parallel(pool))
    }

    /// Composite one incoming frame onto `surface`.
    ///
    /// On error nothing in `ring` has changed. The surface may hold a
    /// partial image only if the surface itself rejected a write; the
    /// no-partial-write guarantee covers the ring, not the surface.
    pub fn composite<B, F, S>(
        &self,
        frame: &F,
        ring: &mut FrameRingBuffer<B>,
        surface: &mut S,
        orientation: Orientation,
        scratch: &mut CompositeScratch,
    ) -> SlitScanResult<()>
    where
        B: Deref<Target = [u8]> + DerefMut + Sync,
        F: FrameSource + Sync + ?Sized,
        S: OutputSurface + ?Sized,
    {
        let geometry = ring.geometry();
        if frame.width() != geometry.width || frame.height() != geometry.height {
            return Err(AccessError::DimensionMismatch {
                expected_width: geometry.width,
                expected_height: geometry.height,
                width: frame.width(),
                height: frame.height(),
            }
            .into());
        }

        let transformer =
            CoordinateTransformer::new(geometry.width, geometry.height, orientation)
                .centered_in(surface.width(), surface.height())?;

        scratch.fit(geometry);
        let CompositeScratch { staged, rgb } = scratch;

        self.stage(frame, geometry, staged)?;
        self.sweep(ring, staged, &transformer, rgb);
        present(surface, &transformer, rgb)?;

        ring.pending_slot_mut().copy_from_slice(staged);
        ring.advance();
        Ok(())
    }

    /// Copy the incoming frame into ring-slot layout.
    fn stage<F>(
        &self,
        frame: &F,
        geometry: FrameGeometry,
        staged: &mut [u8],
    ) -> Result<(), AccessError>
    where
        F: FrameSource + Sync + ?Sized,
    {
        let width = geometry.width as usize;
        let (luma, chroma) = staged.split_at_mut(geometry.luma_len());

        self.for_each_row::<AccessError, _>(luma, width, |y, row| {
            for (x, byte) in row.iter_mut().enumerate() {
                *byte = frame.sample(x as u32, y as u32, YuvChannel::Y)?;
            }
            Ok(())
        })?;

        // One chroma row serves two luma rows; one pair serves two columns.
        self.for_each_row::<AccessError, _>(chroma, width, |cy, row| {
            let y = (cy * 2) as u32;
            for (bx, pair) in row.chunks_exact_mut(2).enumerate() {
                let x = (bx * 2) as u32;
                pair[V_BYTE] = frame.sample(x, y, YuvChannel::V)?;
                pair[U_BYTE] = frame.sample(x, y, YuvChannel::U)?;
            }
            Ok(())
        })
    }

    /// Fill `rgb` in destination order from the staged frame and history.
    fn sweep<B>(
        &self,
        ring: &FrameRingBuffer<B>,
        staged: &[u8],
        transformer: &CoordinateTransformer,
        rgb: &mut [u8],
    ) where
        B: Deref<Target = [u8]> + DerefMut + Sync,
    {
        let geometry = ring.geometry();
        let depth = geometry.depth();
        let orientation = transformer.orientation();
        let (dest_width, _) = transformer.destination_size();

        let row_len = dest_width as usize * RGB_BYTES_PER_PIXEL;
        self.for_each_row(rgb, row_len, |dy, row| {
            for (dx, px) in row.chunks_exact_mut(RGB_BYTES_PER_PIXEL).enumerate() {
                let (x, y) = transformer.source_of(dx as u32, dy as u32);
                let back = orientation.scan_offset(x, y) as usize % depth;
                // Offset 0 is the frame being composited; it is not in the
                // ring until commit.
                let slot = match back {
                    0 => staged,
                    k => ring.committed_slot(k - 1),
                };
                let sample = |channel| slot[geometry.channel_offset(x, y, channel)];
                let out = ColorConverter::convert_raw(
                    sample(YuvChannel::Y),
                    sample(YuvChannel::U),
                    sample(YuvChannel::V),
                );
                px.copy_from_slice(&out);
            }
            Ok::<(), Infallible>(())
        })
        .unwrap_or_else(|never| match never {})
    }

    fn for_each_row<E, Op>(&self, buf: &mut [u8], row_len: usize, op: Op) -> Result<(), E>
    where
        E: Send,
        Op: Fn(usize, &mut [u8]) -> Result<(), E> + Sync + Send,
    {
        match self.schedule {
            Schedule::Sequential => buf
                .chunks_mut(row_len)
                .enumerate()
                .try_for_each(|(i, row)| op(i, row)),
            Schedule::Parallel(pool) => pool.install(|| {
                buf.par_chunks_mut(row_len)
                    .enumerate()
                    .try_for_each(|(i, row)| op(i, row))
            }),
        }
    }
}

fn present<S>(
    surface: &mut S,
    transformer: &CoordinateTransformer,
    rgb: &[u8],
) -> Result<(), AccessError>
where
    S: OutputSurface + ?Sized,
{
    let (dest_width, _) = transformer.destination_size();
    let (ox, oy) = transformer.origin();
    let rows = rgb.chunks_exact(dest_width as usize * RGB_BYTES_PER_PIXEL);
    for (dy, row) in rows.enumerate() {
        for (dx, px) in row.chunks_exact(RGB_BYTES_PER_PIXEL).enumerate() {
            let (sx, sy) = (ox + dx as u32, oy + dy as u32);
            for channel in RgbChannel::ALL {
                surface.set_pixel(sx, sy, channel, px[channel.index()])?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring_buffer::SystemAllocator;
    use slitscan_frame_model::{RgbxSurface, Yuv420Frame};

    fn grey_nv21(width: u32, height: u32, luma: u8) -> Vec<u8> {
        let luma_len = (width * height) as usize;
        let mut data = vec![luma; luma_len];
        data.resize(luma_len * 3 / 2, 128);
        data
    }

    #[test]
    fn first_row_shows_current_frame() {
        let mut ring = FrameRingBuffer::allocate(4, 2, &SystemAllocator).unwrap();
        let mut scratch = CompositeScratch::default();
        let mut surface = RgbxSurface::new(4, 2);
        let data = grey_nv21(4, 2, 90);
        let frame = Yuv420Frame::nv21(4, 2, &data);

        SlitScanCompositor::sequential()
            .composite(
                &frame,
                &mut ring,
                &mut surface,
                Orientation::Landscape,
                &mut scratch,
            )
            .unwrap();

        assert_eq!(surface.pixel(2, 0), Some([90, 90, 90]));
        // Row 1 samples the previous frame, which was never written.
        assert_eq!(surface.pixel(2, 1), Some([0, 0, 0]));
        assert_eq!(ring.cursor(), 1);
        assert_eq!(ring.read_channel(0, 3, 1, YuvChannel::Y), 90);
    }

    #[test]
    fn stage_interleaves_v_then_u() {
        let geometry = FrameGeometry::new(4, 2);
        let data = vec![0, 1, 2, 3, 4, 5, 6, 7, 200, 100, 201, 101];
        let frame = Yuv420Frame::nv21(4, 2, &data);
        let mut staged = vec![0; geometry.slot_len()];

        SlitScanCompositor::sequential()
            .stage(&frame, geometry, &mut staged)
            .unwrap();

        assert_eq!(staged, data);
    }

    #[test]
    fn mismatched_frame_is_rejected_without_commit() {
        let mut ring = FrameRingBuffer::allocate(4, 2, &SystemAllocator).unwrap();
        let mut scratch = CompositeScratch::default();
        let mut surface = RgbxSurface::new(4, 2);
        let data = grey_nv21(2, 2, 90);
        let frame = Yuv420Frame::nv21(2, 2, &data);

        let result = SlitScanCompositor::sequential().composite(
            &frame,
            &mut ring,
            &mut surface,
            Orientation::Landscape,
            &mut scratch,
        );

        assert!(result.is_err());
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn surface_too_small_for_portrait() {
        let mut ring = FrameRingBuffer::allocate(4, 2, &SystemAllocator).unwrap();
        let mut scratch = CompositeScratch::default();
        let mut surface = RgbxSurface::new(4, 2);
        let data = grey_nv21(4, 2, 90);
        let frame = Yuv420Frame::nv21(4, 2, &data);

        let result = SlitScanCompositor::sequential().composite(
            &frame,
            &mut ring,
            &mut surface,
            Orientation::Portrait,
            &mut scratch,
        );

        assert!(result.is_err());
        assert_eq!(ring.cursor(), 0);
    }
}
