//! Sensor-to-display coordinate mapping.
//!
//! Camera sensors are landscape-native. In landscape the image is copied
//! as-is; in portrait it is rotated 90 degrees clockwise so the top of the
//! sensor lands on the right edge of the display. The rotated image is
//! centred on the output surface.

use slitscan_frame_model::{AccessError, Orientation};

/// Maps source pixels to surface pixels for one frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateTransformer {
    width: u32,
    height: u32,
    orientation: Orientation,
    origin: (u32, u32),
}

impl CoordinateTransformer {
    pub fn new(width: u32, height: u32, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
            origin: (0, 0),
        }
    }

    /// Centre the destination rectangle on a `surface_width` x
    /// `surface_height` surface. Fails when the surface is too small.
    pub fn centered_in(self, surface_width: u32, surface_height: u32) -> Result<Self, AccessError> {
        let (dw, dh) = self.destination_size();
        if surface_width < dw || surface_height < dh {
            return Err(AccessError::DimensionMismatch {
                expected_width: dw,
                expected_height: dh,
                width: surface_width,
                height: surface_height,
            });
        }
        Ok(Self {
            origin: ((surface_width - dw) / 2, (surface_height - dh) / 2),
            ..self
        })
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Extent of the rotated image.
    pub fn destination_size(&self) -> (u32, u32) {
        match self.orientation {
            Orientation::Landscape => (self.width, self.height),
            Orientation::Portrait => (self.height, self.width),
        }
    }

    /// Top-left corner of the destination rectangle on the surface.
    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Surface coordinate of source pixel `(x, y)`.
    pub fn map(&self, x: u32, y: u32) -> (u32, u32) {
        let (dx, dy) = match self.orientation {
            Orientation::Landscape => (x, y),
            Orientation::Portrait => (self.height - 1 - y, x),
        };
        (self.origin.0 + dx, self.origin.1 + dy)
    }

    /// Source pixel for a coordinate relative to the destination origin.
    /// `(dx, dy)` must lie inside [`CoordinateTransformer::destination_size`].
    pub fn source_of(&self, dx: u32, dy: u32) -> (u32, u32) {
        match self.orientation {
            Orientation::Landscape => (dx, dy),
            Orientation::Portrait => (dy, self.height - 1 - dx),
        }
    }

    /// Source pixel shown at surface coordinate `(sx, sy)`, if any.
    pub fn inverse(&self, sx: u32, sy: u32) -> Option<(u32, u32)> {
        let (dw, dh) = self.destination_size();
        let dx = sx.checked_sub(self.origin.0).filter(|&dx| dx < dw)?;
        let dy = sy.checked_sub(self.origin.1).filter(|&dy| dy < dh)?;
        Some(self.source_of(dx, dy))
    }
}

/// Size of a display buffer that covers a `view_width` x `view_height`
/// view while keeping the camera image at full resolution.
///
/// The view is scaled by the larger of the two image/view ratios, with the
/// view's axes swapped against the image in portrait.
pub fn fit_buffer_size(
    image_width: u32,
    image_height: u32,
    view_width: u32,
    view_height: u32,
    orientation: Orientation,
) -> (u32, u32) {
    if view_width == 0 || view_height == 0 {
        return CoordinateTransformer::new(image_width, image_height, orientation)
            .destination_size();
    }

    let (iw, ih) = (f64::from(image_width), f64::from(image_height));
    let (vw, vh) = (f64::from(view_width), f64::from(view_height));
    let magnification = match orientation {
        Orientation::Landscape => (iw / vw).max(ih / vh),
        Orientation::Portrait => (iw / vh).max(ih / vw),
    };

    (
        (vw * magnification).ceil() as u32,
        (vh * magnification).ceil() as u32,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn landscape_is_identity() {
        let ct = CoordinateTransformer::new(8, 4, Orientation::Landscape);
        assert_eq!(ct.destination_size(), (8, 4));
        assert_eq!(ct.map(5, 3), (5, 3));
    }

    #[test]
    fn portrait_rotates_clockwise() {
        let ct = CoordinateTransformer::new(8, 4, Orientation::Portrait);
        assert_eq!(ct.destination_size(), (4, 8));
        // Top-left of the sensor goes to the top-right of the display.
        assert_eq!(ct.map(0, 0), (3, 0));
        assert_eq!(ct.map(7, 3), (0, 7));
    }

    #[test]
    fn centred_on_larger_surface() {
        let ct = CoordinateTransformer::new(8, 4, Orientation::Landscape)
            .centered_in(12, 10)
            .unwrap();
        assert_eq!(ct.origin(), (2, 3));
        assert_eq!(ct.map(0, 0), (2, 3));
        assert_eq!(ct.inverse(2, 3), Some((0, 0)));
        assert_eq!(ct.inverse(1, 3), None);
        assert_eq!(ct.inverse(10, 3), None);
    }

    #[test]
    fn small_surface_is_rejected() {
        let err = CoordinateTransformer::new(8, 4, Orientation::Portrait)
            .centered_in(8, 4)
            .unwrap_err();
        assert!(matches!(err, AccessError::DimensionMismatch { .. }));
    }

    #[test]
    fn buffer_covers_landscape_view() {
        // 640x480 image on a 1280x720 view: height is the tighter ratio.
        assert_eq!(
            fit_buffer_size(640, 480, 1280, 720, Orientation::Landscape),
            (854, 480)
        );
    }

    #[test]
    fn buffer_covers_portrait_view() {
        let (w, h) = fit_buffer_size(640, 480, 720, 1280, Orientation::Portrait);
        assert_eq!((w, h), (480, 854));
        let (dw, dh) = CoordinateTransformer::new(640, 480, Orientation::Portrait)
            .destination_size();
        assert!(w >= dw && h >= dh);
    }

    #[test]
    fn degenerate_view_falls_back_to_image_extent() {
        assert_eq!(
            fit_buffer_size(640, 480, 0, 720, Orientation::Portrait),
            (480, 640)
        );
    }

    proptest! {
        #[test]
        fn map_is_a_bijection_onto_destination(
            w in 1u32..24,
            h in 1u32..24,
            landscape in any::<bool>(),
            pad_x in 0u32..4,
            pad_y in 0u32..4,
        ) {
            let orientation = Orientation::from_landscape_flag(landscape);
            let base = CoordinateTransformer::new(w, h, orientation);
            let (dw, dh) = base.destination_size();
            let ct = base.centered_in(dw + pad_x, dh + pad_y).unwrap();
            let (ox, oy) = ct.origin();

            let mut seen = HashSet::new();
            for y in 0..h {
                for x in 0..w {
                    let (sx, sy) = ct.map(x, y);
                    prop_assert!(sx >= ox && sx < ox + dw);
                    prop_assert!(sy >= oy && sy < oy + dh);
                    prop_assert!(seen.insert((sx, sy)));
                    prop_assert_eq!(ct.inverse(sx, sy), Some((x, y)));
                }
            }
            prop_assert_eq!(seen.len() as u32, dw * dh);
        }
    }
}
