//! Session lifecycle: the handle a host application drives.
//!
//! ```text
//! Uninitialized --initialize--> Ready --process_frame--> Ready ...
//!                                 |
//!                              shutdown
//!                                 v
//!                              Released --initialize--> Ready
//! ```
//!
//! Setup errors are returned to the caller. Per-frame errors are logged and
//! the frame is dropped; the ring and cursor stay untouched so the next
//! frame proceeds normally.

use slitscan_common::{CompositorSettings, SlitScanError, SlitScanResult};
use slitscan_frame_model::{FrameSource, Orientation, OutputSurface};

use crate::compositor::{CompositeScratch, Schedule, SlitScanCompositor};
use crate::ring_buffer::{FrameGeometry, FrameRingBuffer, HostAllocator, SystemAllocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Released,
}

/// What happened to a frame handed to [`SlitScanSession::process_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    Dropped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub presented: u64,
    pub dropped: u64,
}

/// An explicitly owned slit-scan session.
pub struct SlitScanSession<A: HostAllocator = SystemAllocator> {
    allocator: A,
    settings: CompositorSettings,
    pool: Option<rayon::ThreadPool>,
    ring: Option<FrameRingBuffer<A::Block>>,
    scratch: CompositeScratch,
    state: SessionState,
    stats: SessionStats,
}

impl SlitScanSession<SystemAllocator> {
    /// Create a session backed by the process heap.
    pub fn new(settings: CompositorSettings) -> SlitScanResult<Self> {
        Self::with_allocator(settings, SystemAllocator)
    }
}

impl<A: HostAllocator> SlitScanSession<A> {
    /// Create a session whose ring memory comes from `allocator`.
    ///
    /// Builds the worker pool up front; `threads = Some(0)` is rejected.
    pub fn with_allocator(settings: CompositorSettings, allocator: A) -> SlitScanResult<Self> {
        let pool = if settings.parallel {
            Some(build_thread_pool(settings.threads)?)
        } else {
            None
        };

        Ok(Self {
            allocator,
            settings,
            pool,
            ring: None,
            scratch: CompositeScratch::default(),
            state: SessionState::Uninitialized,
            stats: SessionStats::default(),
        })
    }

    /// Allocate the frame ring for `width` x `height` frames.
    ///
    /// An existing ring is released first. Capacity is validated before any
    /// memory is requested.
    pub fn initialize(&mut self, width: u32, height: u32) -> SlitScanResult<()> {
        if self.ring.is_some() {
            tracing::info!("re-initializing session, releasing previous ring");
            self.shutdown();
        }

        let ring = FrameRingBuffer::allocate(width, height, &self.allocator)?;
        self.scratch = CompositeScratch::for_geometry(ring.geometry());
        self.stats = SessionStats::default();
        tracing::info!(
            width,
            height,
            slots = ring.depth(),
            bytes = ring.capacity_bytes(),
            parallel = self.pool.is_some(),
            "slit-scan session ready"
        );
        self.ring = Some(ring);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Composite one frame. Never fails: a frame that cannot be processed
    /// is dropped and logged.
    pub fn process_frame<F, S>(
        &mut self,
        frame: &F,
        surface: &mut S,
        orientation: Orientation,
    ) -> FrameOutcome
    where
        F: FrameSource + Sync + ?Sized,
        S: OutputSurface + ?Sized,
    {
        match self.try_process_frame(frame, surface, orientation) {
            Ok(()) => FrameOutcome::Presented,
            Err(e) => {
                tracing::warn!(error = %e, "dropping frame");
                FrameOutcome::Dropped
            }
        }
    }

    /// Composite one frame, surfacing the reason a frame was dropped.
    pub fn try_process_frame<F, S>(
        &mut self,
        frame: &F,
        surface: &mut S,
        orientation: Orientation,
    ) -> SlitScanResult<()>
    where
        F: FrameSource + Sync + ?Sized,
        S: OutputSurface + ?Sized,
    {
        let result = self.composite(frame, surface, orientation);
        match result {
            Ok(()) => self.stats.presented += 1,
            Err(_) => self.stats.dropped += 1,
        }
        result
    }

    /// Release the ring. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(ring) = self.ring.take() {
            tracing::info!(
                presented = self.stats.presented,
                dropped = self.stats.dropped,
                "releasing slit-scan session"
            );
            ring.release(&self.allocator);
            self.scratch = CompositeScratch::default();
            self.state = SessionState::Released;
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// The ring while the session is ready.
    pub fn ring(&self) -> Option<&FrameRingBuffer<A::Block>> {
        self.ring.as_ref()
    }

    pub fn geometry(&self) -> Option<FrameGeometry> {
        self.ring.as_ref().map(FrameRingBuffer::geometry)
    }

    fn composite<F, S>(
        &mut self,
        frame: &F,
        surface: &mut S,
        orientation: Orientation,
    ) -> SlitScanResult<()>
    where
        F: FrameSource + Sync + ?Sized,
        S: OutputSurface + ?Sized,
    {
        let Some(ring) = self.ring.as_mut() else {
            return Err(SlitScanError::frame_processing(format!(
                "session is {:?}",
                self.state
            )));
        };

        let schedule = match &self.pool {
            Some(pool) => Schedule::Parallel(pool),
            None => Schedule::Sequential,
        };
        SlitScanCompositor::new(schedule).composite(
            frame,
            ring,
            surface,
            orientation,
            &mut self.scratch,
        )?;

        tracing::debug!(cursor = ring.cursor(), ?orientation, "frame composited");
        Ok(())
    }
}

impl<A: HostAllocator> Drop for SlitScanSession<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_thread_pool(threads: Option<usize>) -> SlitScanResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(SlitScanError::config(
            "compositor 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("slitscan-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SlitScanError::config(format!("failed to build rayon thread pool: {e}")))
}
