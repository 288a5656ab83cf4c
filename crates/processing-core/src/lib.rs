//! Slit-scan Processing Core
//!
//! Composites a live YUV 4:2:0 camera feed so that each output pixel shows
//! a different moment in the recent past:
//! - **Size validation:** Overflow-checked ring capacity
//! - **Frame ring:** `max(width, height)` frames addressed by a rolling cursor
//! - **Colour:** BT.601 YCbCr to RGB
//! - **Transform:** Sensor-to-display rotation for landscape and portrait
//! - **Compositor:** The data-parallel per-pixel sweep
//! - **Session:** `initialize` / `process_frame` / `shutdown`
//!
//! This crate is pure computation. Frames and surfaces arrive through the
//! traits in `slitscan-frame-model`; memory through [`HostAllocator`].

pub mod color;
pub mod compositor;
pub mod ring_buffer;
pub mod session;
pub mod size;
pub mod transform;

pub use color::ColorConverter;
pub use compositor::{CompositeScratch, Schedule, SlitScanCompositor};
pub use ring_buffer::{FrameGeometry, FrameRingBuffer, HostAllocator, SystemAllocator};
pub use session::{FrameOutcome, SessionState, SessionStats, SlitScanSession};
pub use size::ring_capacity;
pub use transform::{fit_buffer_size, CoordinateTransformer};
