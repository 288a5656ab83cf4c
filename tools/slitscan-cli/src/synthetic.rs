//! Synthetic camera feeds.
//!
//! Patterns are drawn in RGB and converted to NV21, the layout most camera
//! stacks deliver, so the full ingest path is exercised.

use image::{ImageBuffer, Rgb, RgbImage};

/// Moving test pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Pattern {
    /// A bright bar sweeping across a dark field, with an orbiting disc
    Sweep,
    /// Scrolling colour bars crossed by a falling line
    Bars,
}

/// Draw frame `t` of a pattern.
pub fn render_pattern(pattern: Pattern, width: u32, height: u32, t: usize) -> RgbImage {
    match pattern {
        Pattern::Sweep => sweep(width, height, t),
        Pattern::Bars => bars(width, height, t),
    }
}

fn sweep(width: u32, height: u32, t: usize) -> RgbImage {
    let mut img = ImageBuffer::from_pixel(width, height, Rgb([30, 30, 40]));

    let bar_width = (width / 16).max(2);
    let bar_x = (t as u32 * 2) % width;
    for y in 0..height {
        for x in bar_x..(bar_x + bar_width).min(width) {
            img.put_pixel(x, y, Rgb([240, 240, 230]));
        }
    }

    // Disc orbiting the centre, one revolution per 120 frames.
    let angle = t as f64 * std::f64::consts::TAU / 120.0;
    let orbit = f64::from(width.min(height)) * 0.3;
    let cx = f64::from(width) / 2.0 + orbit * angle.cos();
    let cy = f64::from(height) / 2.0 + orbit * angle.sin();
    let radius = f64::from(width.min(height)) / 10.0;
    fill_disc(&mut img, cx, cy, radius, Rgb([230, 40, 40]));

    img
}

fn bars(width: u32, height: u32, t: usize) -> RgbImage {
    const COLORS: [Rgb<u8>; 6] = [
        Rgb([255, 0, 0]),   // Red
        Rgb([0, 255, 0]),   // Green
        Rgb([0, 0, 255]),   // Blue
        Rgb([255, 255, 0]), // Yellow
        Rgb([255, 0, 255]), // Magenta
        Rgb([0, 255, 255]), // Cyan
    ];
    let bar_width = (width / COLORS.len() as u32).max(1);
    let line_y = (t as u32) % height;

    ImageBuffer::from_fn(width, height, |x, y| {
        if y.abs_diff(line_y) < 2 {
            return Rgb([255, 255, 255]);
        }
        let shifted = (x + t as u32) % width;
        COLORS[(shifted / bar_width) as usize % COLORS.len()]
    })
}

fn fill_disc(img: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
    let (width, height) = img.dimensions();
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(width);
    let y1 = ((cy + radius).ceil() as u32).min(height);
    for y in y0..y1 {
        for x in x0..x1 {
            let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Convert to NV21 with BT.601 full-range coefficients. Chroma is the
/// average of each 2x2 block. Width and height must be even.
pub fn rgb_to_nv21(img: &RgbImage) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let luma_len = (width * height) as usize;
    let mut out = vec![0u8; luma_len * 3 / 2];

    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b] = px.0.map(f64::from);
        out[(y * width + x) as usize] = to_byte(0.299 * r + 0.587 * g + 0.114 * b);
    }

    for by in (0..height).step_by(2) {
        for bx in (0..width).step_by(2) {
            let mut sum = [0.0f64; 3];
            for (x, y) in [(bx, by), (bx + 1, by), (bx, by + 1), (bx + 1, by + 1)] {
                for (acc, c) in sum.iter_mut().zip(img.get_pixel(x, y).0) {
                    *acc += f64::from(c) / 4.0;
                }
            }
            let [r, g, b] = sum;
            let u = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
            let v = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;
            let pair = luma_len + (by / 2 * width + bx) as usize;
            out[pair] = to_byte(v);
            out[pair + 1] = to_byte(u);
        }
    }

    out
}

fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
