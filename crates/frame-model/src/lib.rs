//! Slit-scan Frame Model
//!
//! Defines the data contracts between the compositor and the platform:
//! - **Channels:** Closed tags for YUV and RGB components
//! - **Orientation:** Landscape/portrait display mode and its scan axis
//! - **Sources:** Read-only access to one incoming YUV 4:2:0 camera frame
//! - **Surfaces:** Write-only RGB destinations for composited pixels
//!
//! Access failures are reported as [`AccessError`] and never panic, so a
//! malformed frame can be dropped without taking the session down.

pub mod channel;
pub mod error;
pub mod orientation;
pub mod source;
pub mod surface;

pub use channel::*;
pub use error::*;
pub use orientation::*;
pub use source::*;
pub use surface::*;
