//! Color space conversions on BGR images
//!
//! Gray: Y = 0.114*B + 0.587*G + 0.299*R, rounded to the nearest byte.
//! HSV is stored on the 8-bit scale: hue in half degrees (0-180),
//! saturation and value scaled from percent by 2.55 and truncated.

use crate::models::{BgrImage, GrayImage, HsvImage};
use rayon::prelude::*;

const COEF_B: f64 = 0.114;
const COEF_G: f64 = 0.587;
const COEF_R: f64 = 0.299;

#[inline]
fn luminance(b: u8, g: u8, r: u8) -> u8 {
    let y = COEF_B * b as f64 + COEF_G * g as f64 + COEF_R * r as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert a BGR image to grayscale
pub fn to_gray(bgr: &BgrImage) -> GrayImage {
    bgr.map(|[b, g, r]| [luminance(b, g, r)])
}

/// Convert BGR to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn to_gray_parallel(bgr: &BgrImage) -> GrayImage {
    let width = bgr.width();
    let mut gray = GrayImage::new(width, bgr.height());
    if gray.is_empty() {
        return gray;
    }

    let src = bgr.as_slice();
    gray.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let row_start = y * width * 3;
            for (x, out) in row.iter_mut().enumerate() {
                let idx = row_start + x * 3;
                *out = luminance(src[idx], src[idx + 1], src[idx + 2]);
            }
        });

    gray
}

/// HSV triple for one BGR pixel
#[inline]
pub fn pixel_to_hsv(b: u8, g: u8, r: u8) -> [u8; 3] {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    // Red wins ties, then green
    let hue = if max == min {
        0.0
    } else if max == r {
        (60.0 * ((g - b) / diff) + 360.0) % 360.0
    } else if max == g {
        (60.0 * ((b - r) / diff) + 120.0) % 360.0
    } else {
        (60.0 * ((r - g) / diff) + 240.0) % 360.0
    };

    let saturation = if max == 0.0 { 0.0 } else { diff / max * 100.0 };
    let value = max * 100.0;

    [
        (hue / 2.0) as u8,
        (saturation * 2.55) as u8,
        (value * 2.55) as u8,
    ]
}

/// Convert a BGR image to HSV
pub fn to_hsv(bgr: &BgrImage) -> HsvImage {
    bgr.map(|[b, g, r]| pixel_to_hsv(b, g, r))
}

/// BGR pixel for one 8-bit HSV triple
pub fn pixel_to_bgr(h: u8, s: u8, v: u8) -> [u8; 3] {
    let hue = (h as f64 * 2.0) % 360.0;
    let s = s as f64 / 255.0;
    let v = v as f64 / 255.0;

    let c = v * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |channel: f64| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(b), to_byte(g), to_byte(r)]
}

/// Convert an HSV image back to BGR
pub fn hsv_to_bgr(hsv: &HsvImage) -> BgrImage {
    hsv.map(|[h, s, v]| pixel_to_bgr(h, s, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(b: u8, g: u8, r: u8) -> BgrImage {
        BgrImage::from_fn(3, 2, |_, _| [b, g, r])
    }

    #[test]
    fn test_gray_weights() {
        assert_eq!(to_gray(&solid(255, 255, 255)).get(0, 0, 0), 255);
        assert_eq!(to_gray(&solid(0, 0, 0)).get(0, 0, 0), 0);
        // 0.299 * 255 = 76.245
        assert_eq!(to_gray(&solid(0, 0, 255)).get(1, 2, 0), 76);
        // 0.587 * 255 = 149.685
        assert_eq!(to_gray(&solid(0, 255, 0)).get(1, 2, 0), 150);
        // 0.114 * 255 = 29.07
        assert_eq!(to_gray(&solid(255, 0, 0)).get(0, 1, 0), 29);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let img = BgrImage::from_fn(17, 9, |r, c| [(r * 13) as u8, (c * 7) as u8, (r * c) as u8]);
        assert_eq!(to_gray(&img), to_gray_parallel(&img));
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(pixel_to_hsv(0, 0, 255), [0, 254, 254]); // red
        assert_eq!(pixel_to_hsv(0, 255, 0), [60, 254, 254]); // green
        assert_eq!(pixel_to_hsv(255, 0, 0), [120, 254, 254]); // blue
        assert_eq!(pixel_to_hsv(0, 255, 255), [30, 254, 254]); // yellow
    }

    #[test]
    fn test_hsv_gray_has_no_hue_or_saturation() {
        assert_eq!(pixel_to_hsv(255, 255, 255), [0, 0, 254]);
        assert_eq!(pixel_to_hsv(0, 0, 0), [0, 0, 0]);
        let [h, s, _] = pixel_to_hsv(128, 128, 128);
        assert_eq!((h, s), (0, 0));
    }

    #[test]
    fn test_hsv_red_wraps_high() {
        // Magenta-ish red lands near the top of the hue circle
        assert_eq!(pixel_to_hsv(128, 0, 255)[0], 164);
        assert_eq!(pixel_to_hsv(0, 165, 255)[0], 19);
    }

    #[test]
    fn test_hsv_image_shape() {
        let hsv = to_hsv(&solid(0, 255, 0));
        assert_eq!((hsv.width(), hsv.height()), (3, 2));
        assert_eq!(hsv.pixel(1, 1), [60, 254, 254]);
    }

    #[test]
    fn test_bgr_roundtrip_is_close() {
        for &(b, g, r) in &[(0u8, 0u8, 255u8), (0, 255, 0), (255, 0, 0), (40, 120, 200), (200, 200, 200)] {
            let [h, s, v] = pixel_to_hsv(b, g, r);
            let back = pixel_to_bgr(h, s, v);
            for (a, e) in back.iter().zip([b, g, r]) {
                assert!((*a as i32 - e as i32).abs() <= 4, "{:?} vs {:?}", back, (b, g, r));
            }
        }
    }
}
