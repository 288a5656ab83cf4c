//! YCbCr to RGB conversion (BT.601, full range).
//!
//! Fixed-point with 16 fractional bits:
//!
//! ```text
//! R = Y + 1.402    * Cr
//! G = Y - 0.344136 * Cb - 0.714136 * Cr
//! B = Y + 1.772    * Cb
//! ```

const FRAC_BITS: u32 = 16;
const HALF: i32 = 1 << (FRAC_BITS - 1);

const CR_TO_R: i32 = 91_881; // 1.402
const CB_TO_G: i32 = 22_554; // 0.344136
const CR_TO_G: i32 = 46_802; // 0.714136
const CB_TO_B: i32 = 116_130; // 1.772

/// Stateless BT.601 converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    /// Convert one sample. `cb` and `cr` are chroma bytes already shifted
    /// by -128.
    #[inline]
    pub fn convert(y: u8, cb: i16, cr: i16) -> [u8; 3] {
        let (y, cb, cr) = (i32::from(y), i32::from(cb), i32::from(cr));
        let r = y + ((CR_TO_R * cr + HALF) >> FRAC_BITS);
        let g = y + ((-CB_TO_G * cb - CR_TO_G * cr + HALF) >> FRAC_BITS);
        let b = y + ((CB_TO_B * cb + HALF) >> FRAC_BITS);
        [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
    }

    /// Convert raw stored bytes, applying the chroma bias.
    #[inline]
    pub fn convert_raw(y: u8, u: u8, v: u8) -> [u8; 3] {
        Self::convert(y, i16::from(u) - 128, i16::from(v) - 128)
    }
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(y: u8, u: u8, v: u8) -> [f64; 3] {
        let (y, cb, cr) = (f64::from(y), f64::from(u) - 128.0, f64::from(v) - 128.0);
        [
            (y + 1.402 * cr).clamp(0.0, 255.0),
            (y - 0.344136 * cb - 0.714136 * cr).clamp(0.0, 255.0),
            (y + 1.772 * cb).clamp(0.0, 255.0),
        ]
    }

    #[test]
    fn neutral_chroma_is_grey() {
        assert_eq!(ColorConverter::convert(128, 0, 0), [128, 128, 128]);
        assert_eq!(ColorConverter::convert_raw(0, 128, 128), [0, 0, 0]);
        assert_eq!(ColorConverter::convert_raw(255, 128, 128), [255, 255, 255]);
    }

    #[test]
    fn saturated_red_sample() {
        let [r, g, b] = ColorConverter::convert_raw(76, 84, 255);
        assert!(r > g && r > b, "expected red-dominant, got {:?}", [r, g, b]);
        let expected = reference(76, 84, 255);
        for (got, want) in [r, g, b].iter().zip(expected) {
            assert!((f64::from(*got) - want).abs() <= 2.0);
        }
    }

    #[test]
    fn extremes_clamp_instead_of_wrapping() {
        assert_eq!(ColorConverter::convert_raw(255, 255, 255)[0], 255);
        assert_eq!(ColorConverter::convert_raw(0, 0, 0)[2], 0);
    }

    proptest! {
        #[test]
        fn matches_float_reference(y in any::<u8>(), u in any::<u8>(), v in any::<u8>()) {
            let got = ColorConverter::convert_raw(y, u, v);
            let want = reference(y, u, v);
            for i in 0..3 {
                prop_assert!((f64::from(got[i]) - want[i]).abs() <= 1.0);
            }
        }
    }
}
