//! Show ring-buffer sizing for a resolution.

use slitscan_common::SlitScanError;
use slitscan_processing_core::{ring_capacity, FrameGeometry};

pub fn run(width: u32, height: u32) -> anyhow::Result<()> {
    println!("Slit-scan ring for {width}x{height}");
    println!("{}", "=".repeat(50));

    match ring_capacity(width, height) {
        Ok(bytes) => {
            let geometry = FrameGeometry::new(width, height);
            println!("[OK] Slots: {}", geometry.depth());
            println!("[OK] Bytes per slot: {}", geometry.slot_len());
            println!(
                "[OK] Total: {} bytes ({:.1} MiB)",
                bytes,
                bytes as f64 / (1024.0 * 1024.0)
            );
            Ok(())
        }
        Err(e @ SlitScanError::ArithmeticOverflow { .. }) => {
            println!("[FAIL] {e}");
            println!("Pick a smaller resolution; the ring must fit in {} bytes.", i32::MAX);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
