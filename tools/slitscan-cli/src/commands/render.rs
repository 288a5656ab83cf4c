//! Composite a synthetic feed and write PNG stills.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use image::RgbImage;
use slitscan_common::CompositorSettings;
use slitscan_frame_model::{Orientation, RgbxSurface, Yuv420Frame};
use slitscan_processing_core::{
    fit_buffer_size, CoordinateTransformer, FrameOutcome, SlitScanSession,
};

use crate::synthetic::{self, Pattern};

pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub frames: usize,
    pub orientation: Orientation,
    pub pattern: Pattern,
    pub output: PathBuf,
    pub every: usize,
    pub view: Option<(u32, u32)>,
}

pub fn run(opts: RenderOptions, settings: CompositorSettings) -> anyhow::Result<()> {
    println!(
        "Rendering {} {:?} frames at {}x{} ({:?})",
        opts.frames, opts.pattern, opts.width, opts.height, opts.orientation
    );

    std::fs::create_dir_all(&opts.output)
        .with_context(|| format!("creating {}", opts.output.display()))?;

    let mut session = SlitScanSession::new(settings)?;
    session.initialize(opts.width, opts.height)?;

    let (surface_w, surface_h) = match opts.view {
        Some((view_w, view_h)) => {
            fit_buffer_size(opts.width, opts.height, view_w, view_h, opts.orientation)
        }
        None => {
            CoordinateTransformer::new(opts.width, opts.height, opts.orientation).destination_size()
        }
    };
    let mut surface = RgbxSurface::new(surface_w, surface_h);
    println!("  Surface: {surface_w}x{surface_h}");
    println!("  Output: {}", opts.output.display());

    let started = Instant::now();
    let mut written = 0usize;
    for t in 0..opts.frames {
        let rgb = synthetic::render_pattern(opts.pattern, opts.width, opts.height, t);
        let nv21 = synthetic::rgb_to_nv21(&rgb);
        let frame = Yuv420Frame::nv21(opts.width, opts.height, &nv21);

        if session.process_frame(&frame, &mut surface, opts.orientation) == FrameOutcome::Dropped {
            continue;
        }

        let is_last = t + 1 == opts.frames;
        let on_interval = opts.every > 0 && (t + 1) % opts.every == 0;
        if is_last || on_interval {
            let path = opts.output.join(format!("frame_{t:05}.png"));
            write_png(&surface, &path)?;
            tracing::debug!(frame = t, path = %path.display(), "wrote still");
            written += 1;
        }
    }

    let elapsed = started.elapsed();
    let stats = session.stats();
    session.shutdown();

    println!();
    println!("Done in {:.2}s", elapsed.as_secs_f64());
    println!("  Presented: {}", stats.presented);
    println!("  Dropped: {}", stats.dropped);
    println!("  Stills written: {written}");
    if stats.presented > 0 {
        println!(
            "  Mean frame time: {:.2} ms",
            elapsed.as_secs_f64() * 1000.0 / stats.presented as f64
        );
    }

    Ok(())
}

/// Parse a `WIDTHxHEIGHT` size.
pub fn parse_size(text: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let w = w.trim().parse().with_context(|| format!("bad width in '{text}'"))?;
    let h = h.trim().parse().with_context(|| format!("bad height in '{text}'"))?;
    Ok((w, h))
}

fn write_png(surface: &RgbxSurface, path: &Path) -> anyhow::Result<()> {
    use slitscan_frame_model::OutputSurface;

    let img = RgbImage::from_raw(surface.width(), surface.height(), surface.to_rgb_bytes())
        .context("surface buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}
