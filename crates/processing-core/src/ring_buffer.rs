//! Fixed-capacity circular store of YUV 4:2:0 frames.
//!
//! One contiguous byte block holds `N = max(width, height)` slots. Each slot
//! is a luma plane (`width * height` bytes) followed by an interleaved
//! chroma plane (`width * height / 2` bytes) holding one V/U byte pair per
//! 2x2 block, V first (NV21 order).
//!
//! ```text
//! slot k:  [ Y: width*height ][ VU VU VU ...: width*height/2 ]
//! block:   [ slot 0 ][ slot 1 ] ... [ slot N-1 ]
//! ```
//!
//! `cursor` is the slot most recently committed. New frames are written to
//! the pending slot `cursor + 1` and become visible through
//! [`FrameRingBuffer::advance`].

use std::ops::{Deref, DerefMut};

use slitscan_common::{SlitScanError, SlitScanResult};
use slitscan_frame_model::YuvChannel;

use crate::size::ring_capacity;

/// Neutral chroma level; keeps unwarmed slots grey instead of green.
pub const NEUTRAL_CHROMA: u8 = 128;

/// Byte position of V within an interleaved chroma pair.
pub const V_BYTE: usize = 0;
/// Byte position of U within an interleaved chroma pair.
pub const U_BYTE: usize = 1;

/// Source of the ring's backing memory.
///
/// Blocks must keep a stable address while alive; the ring never resizes
/// or moves them.
pub trait HostAllocator {
    type Block: Deref<Target = [u8]> + DerefMut + Send + Sync;

    fn allocate(&self, len: usize) -> SlitScanResult<Self::Block>;

    fn release(&self, block: Self::Block) {
        drop(block);
    }
}

/// Heap allocator that reports exhaustion instead of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl HostAllocator for SystemAllocator {
    type Block = Box<[u8]>;

    fn allocate(&self, len: usize) -> SlitScanResult<Self::Block> {
        let mut store: Vec<u8> = Vec::new();
        store
            .try_reserve_exact(len)
            .map_err(|e| SlitScanError::allocation(format!("{len} bytes: {e}")))?;
        store.resize(len, 0);
        Ok(store.into_boxed_slice())
    }
}

/// Frame dimensions and the byte layout derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of slots, `max(width, height)`: one per possible time offset.
    pub fn depth(&self) -> usize {
        self.width.max(self.height) as usize
    }

    pub fn luma_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn slot_len(&self) -> usize {
        self.luma_len() * 3 / 2
    }

    /// Offset of one channel of pixel `(x, y)` within a slot.
    pub fn channel_offset(&self, x: u32, y: u32, channel: YuvChannel) -> usize {
        let (x, y, w) = (x as usize, y as usize, self.width as usize);
        let pair = self.luma_len() + (y >> 1) * w + ((x >> 1) << 1);
        match channel {
            YuvChannel::Y => y * w + x,
            YuvChannel::V => pair + V_BYTE,
            YuvChannel::U => pair + U_BYTE,
        }
    }
}

/// The circular frame store.
pub struct FrameRingBuffer<B> {
    store: B,
    geometry: FrameGeometry,
    cursor: usize,
}

impl<B> std::fmt::Debug for FrameRingBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRingBuffer")
            .field("geometry", &self.geometry)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<B> FrameRingBuffer<B>
where
    B: Deref<Target = [u8]> + DerefMut,
{
    /// Allocate a ring for `width` x `height` frames.
    ///
    /// Capacity is validated before the allocator is asked for memory.
    /// Chroma planes start neutral; luma content is whatever the allocator
    /// returned until each slot has been written once.
    pub fn allocate<A>(width: u32, height: u32, allocator: &A) -> SlitScanResult<Self>
    where
        A: HostAllocator<Block = B>,
    {
        let capacity = ring_capacity(width, height)?;
        let mut store = allocator.allocate(capacity)?;
        if store.len() != capacity {
            let got = store.len();
            allocator.release(store);
            return Err(SlitScanError::allocation(format!(
                "requested {capacity} bytes, allocator returned {got}"
            )));
        }

        let geometry = FrameGeometry::new(width, height);
        let (luma_len, slot_len) = (geometry.luma_len(), geometry.slot_len());
        for slot in store.chunks_exact_mut(slot_len) {
            slot[luma_len..].fill(NEUTRAL_CHROMA);
        }

        tracing::debug!(
            width,
            height,
            slots = geometry.depth(),
            bytes = capacity,
            "allocated frame ring"
        );

        Ok(Self {
            store,
            geometry,
            cursor: 0,
        })
    }

    /// Return the backing block to the allocator.
    pub fn release<A>(self, allocator: &A)
    where
        A: HostAllocator<Block = B>,
    {
        allocator.release(self.store);
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn depth(&self) -> usize {
        self.geometry.depth()
    }

    /// Slot most recently committed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity_bytes(&self) -> usize {
        self.store.len()
    }

    /// Slot the next frame is written into.
    pub fn pending_index(&self) -> usize {
        (self.cursor + 1) % self.depth()
    }

    /// Slot holding the frame committed `back` frames before the cursor.
    /// `back` is reduced modulo the depth.
    pub fn slot_index(&self, back: usize) -> usize {
        let n = self.depth();
        (self.cursor + n - back % n) % n
    }

    /// Bytes of the frame committed `back` frames before the cursor.
    pub fn committed_slot(&self, back: usize) -> &[u8] {
        self.slot(self.slot_index(back))
    }

    pub fn pending_slot_mut(&mut self) -> &mut [u8] {
        let index = self.pending_index();
        let len = self.geometry.slot_len();
        &mut self.store[index * len..(index + 1) * len]
    }

    /// Store one byte of the pending frame.
    ///
    /// # Panics
    /// If `(x, y)` is outside the frame.
    pub fn write_channel(&mut self, x: u32, y: u32, channel: YuvChannel, value: u8) {
        let offset = self.checked_offset(x, y, channel);
        self.pending_slot_mut()[offset] = value;
    }

    /// Read one byte of the frame committed `back` frames before the cursor.
    ///
    /// # Panics
    /// If `(x, y)` is outside the frame.
    pub fn read_channel(&self, back: usize, x: u32, y: u32, channel: YuvChannel) -> u8 {
        let offset = self.checked_offset(x, y, channel);
        self.committed_slot(back)[offset]
    }

    /// Commit the pending slot.
    pub fn advance(&mut self) {
        self.cursor = self.pending_index();
    }

    fn slot(&self, index: usize) -> &[u8] {
        let len = self.geometry.slot_len();
        &self.store[index * len..(index + 1) * len]
    }

    fn checked_offset(&self, x: u32, y: u32, channel: YuvChannel) -> usize {
        assert!(
            x < self.geometry.width && y < self.geometry.height,
            "pixel ({x}, {y}) outside {}x{} ring",
            self.geometry.width,
            self.geometry.height
        );
        self.geometry.channel_offset(x, y, channel)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use proptest::prelude::*;

    struct FailingAllocator;

    impl HostAllocator for FailingAllocator {
        type Block = Box<[u8]>;

        fn allocate(&self, len: usize) -> SlitScanResult<Self::Block> {
            Err(SlitScanError::allocation(format!("{len} bytes refused")))
        }
    }

    struct ShortAllocator;

    impl HostAllocator for ShortAllocator {
        type Block = Box<[u8]>;

        fn allocate(&self, len: usize) -> SlitScanResult<Self::Block> {
            Ok(vec![0u8; len / 2].into_boxed_slice())
        }
    }

    fn ring(width: u32, height: u32) -> FrameRingBuffer<Box<[u8]>> {
        FrameRingBuffer::allocate(width, height, &SystemAllocator).unwrap()
    }

    #[test]
    fn allocation_sizes_match_geometry() {
        let ring = ring(6, 4);
        assert_eq!(ring.depth(), 6);
        assert_eq!(ring.geometry().slot_len(), 36);
        assert_eq!(ring.capacity_bytes(), 6 * 36);
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn chroma_starts_neutral_in_every_slot() {
        let ring = ring(4, 2);
        for back in 0..ring.depth() {
            for (x, y) in [(0, 0), (3, 1)] {
                assert_eq!(ring.read_channel(back, x, y, YuvChannel::U), NEUTRAL_CHROMA);
                assert_eq!(ring.read_channel(back, x, y, YuvChannel::V), NEUTRAL_CHROMA);
            }
        }
    }

    #[test]
    fn chroma_pairs_are_v_then_u() {
        let geometry = FrameGeometry::new(4, 2);
        assert_eq!(geometry.channel_offset(2, 1, YuvChannel::V), 8 + 2);
        assert_eq!(geometry.channel_offset(3, 1, YuvChannel::U), 8 + 3);
        assert_eq!(geometry.channel_offset(3, 1, YuvChannel::Y), 7);
    }

    #[test]
    fn write_becomes_visible_after_advance() {
        let mut ring = ring(4, 2);
        ring.write_channel(1, 1, YuvChannel::Y, 42);
        ring.write_channel(1, 1, YuvChannel::U, 17);
        assert_ne!(ring.read_channel(0, 1, 1, YuvChannel::U), 17);

        ring.advance();
        assert_eq!(ring.cursor(), 1);
        assert_eq!(ring.read_channel(0, 1, 1, YuvChannel::Y), 42);
        // Chroma is shared by the whole 2x2 block.
        assert_eq!(ring.read_channel(0, 0, 0, YuvChannel::U), 17);
    }

    #[test]
    fn back_offsets_wrap_around() {
        let mut ring = ring(4, 2);
        let depth = ring.depth();
        for ordinal in 0..depth as u8 {
            ring.write_channel(0, 0, YuvChannel::Y, ordinal);
            ring.advance();
        }
        assert_eq!(ring.cursor(), 0);
        assert_eq!(ring.read_channel(0, 0, 0, YuvChannel::Y), depth as u8 - 1);
        assert_eq!(ring.read_channel(depth - 1, 0, 0, YuvChannel::Y), 0);
        // Offsets are taken modulo the depth.
        assert_eq!(ring.read_channel(depth, 0, 0, YuvChannel::Y), depth as u8 - 1);
    }

    #[test]
    fn allocator_failure_is_surfaced() {
        let err = FrameRingBuffer::allocate(4, 2, &FailingAllocator).unwrap_err();
        assert!(matches!(err, SlitScanError::Allocation { .. }));
    }

    #[test]
    fn short_block_is_rejected() {
        let err = FrameRingBuffer::allocate(4, 2, &ShortAllocator).unwrap_err();
        assert!(err.to_string().contains("allocator returned"));
    }

    #[test]
    #[should_panic(expected = "outside 4x2 ring")]
    fn out_of_frame_read_panics() {
        ring(4, 2).read_channel(0, 4, 0, YuvChannel::Y);
    }

    proptest! {
        #[test]
        fn slot_addressing_is_a_bijection(half_w in 1u32..12, half_h in 1u32..12) {
            let geometry = FrameGeometry::new(half_w * 2, half_h * 2);
            let mut seen = HashSet::new();
            for y in 0..geometry.height {
                for x in 0..geometry.width {
                    let luma = geometry.channel_offset(x, y, YuvChannel::Y);
                    prop_assert!(luma < geometry.luma_len());
                    prop_assert!(seen.insert(luma));
                    // Chroma offsets are unique per 2x2 block, not per pixel.
                    if x % 2 == 0 && y % 2 == 0 {
                        for channel in [YuvChannel::U, YuvChannel::V] {
                            let offset = geometry.channel_offset(x, y, channel);
                            prop_assert!(offset < geometry.slot_len());
                            prop_assert!(seen.insert(offset));
                        }
                    }
                }
            }
            prop_assert_eq!(seen.len(), geometry.slot_len());
        }
    }
}
