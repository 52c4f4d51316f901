//! Optional clean-up passes run before edge detection
//!
//! - Vector-median denoising (impulse noise, specular glints)
//! - Contrast stretch of the HSV value channel
//! - Per-channel and cumulative histograms

use crate::models::{BgrImage, GrayImage};
use crate::utils::color_space::{hsv_to_bgr, to_hsv};
use crate::utils::filters::{BorderPolicy, reflect_index};

/// Side length of the vector-median window
pub const DENOISE_WINDOW: usize = 5;

/// Fraction of pixels clipped at each end by [`equalize_value`]
pub const EQUALIZE_CLIP: f32 = 0.01;

#[inline]
fn color_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let mut sum = 0.0f32;
    for c in 0..3 {
        let d = a[c] as f32 - b[c] as f32;
        sum += d * d;
    }
    sum.sqrt()
}

/// The window pixel with the smallest summed distance to all others
///
/// Ties keep the first pixel in raster order.
fn vector_median(window: &[[u8; 3]]) -> [u8; 3] {
    let mut best = 0;
    let mut best_sum = f32::INFINITY;
    for (i, &candidate) in window.iter().enumerate() {
        let sum: f32 = window.iter().map(|&other| color_distance(candidate, other)).sum();
        if sum < best_sum {
            best_sum = sum;
            best = i;
        }
    }
    window.get(best).copied().unwrap_or_default()
}

/// Replace every pixel with the vector median of its 5x5 neighborhood
pub fn denoise(bgr: &BgrImage, border: BorderPolicy) -> BgrImage {
    let (width, height) = (bgr.width(), bgr.height());
    let mut out = match border {
        BorderPolicy::Copy => bgr.clone(),
        BorderPolicy::Zero | BorderPolicy::Reflect => BgrImage::new(width, height),
    };
    let half = DENOISE_WINDOW / 2;
    let reflect = border == BorderPolicy::Reflect;

    let (y_range, x_range) = if reflect {
        (0..height, 0..width)
    } else if height <= 2 * half || width <= 2 * half {
        return out;
    } else {
        (half..height - half, half..width - half)
    };

    let mut window = Vec::with_capacity(DENOISE_WINDOW * DENOISE_WINDOW);
    for y in y_range {
        for x in x_range.clone() {
            window.clear();
            for dy in 0..DENOISE_WINDOW {
                let sy = y as isize + dy as isize - half as isize;
                let sy = if reflect { reflect_index(sy, height) } else { sy as usize };
                for dx in 0..DENOISE_WINDOW {
                    let sx = x as isize + dx as isize - half as isize;
                    let sx = if reflect { reflect_index(sx, width) } else { sx as usize };
                    window.push(bgr.pixel(sy, sx));
                }
            }
            out.set_pixel(y, x, vector_median(&window));
        }
    }

    out
}

/// Pixel counts per intensity for each color channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHistograms {
    /// Blue channel
    pub blue: [u32; 256],
    /// Green channel
    pub green: [u32; 256],
    /// Red channel
    pub red: [u32; 256],
}

impl ChannelHistograms {
    /// Intensity with the highest count in each channel, as `[b, g, r]`
    pub fn peaks(&self) -> [u8; 3] {
        let peak = |h: &[u32; 256]| {
            let mut best = 0usize;
            for (i, &count) in h.iter().enumerate() {
                if count > h[best] {
                    best = i;
                }
            }
            best as u8
        };
        [peak(&self.blue), peak(&self.green), peak(&self.red)]
    }
}

/// Histogram of each BGR channel
pub fn channel_histograms(bgr: &BgrImage) -> ChannelHistograms {
    let mut hist = ChannelHistograms {
        blue: [0; 256],
        green: [0; 256],
        red: [0; 256],
    };
    for px in bgr.as_slice().chunks_exact(3) {
        hist.blue[px[0] as usize] += 1;
        hist.green[px[1] as usize] += 1;
        hist.red[px[2] as usize] += 1;
    }
    hist
}

/// Fraction of pixels at each intensity
pub fn relative_histogram(gray: &GrayImage) -> [f32; 256] {
    let mut hist = [0.0f32; 256];
    if gray.is_empty() {
        return hist;
    }
    for &v in gray.as_slice() {
        hist[v as usize] += 1.0;
    }
    let n = gray.as_slice().len() as f32;
    for h in hist.iter_mut() {
        *h /= n;
    }
    hist
}

/// Running sum of a relative histogram
pub fn cumulative_histogram(relative: &[f32; 256]) -> [f32; 256] {
    let mut out = [0.0f32; 256];
    let mut acc = 0.0f32;
    for (dst, &v) in out.iter_mut().zip(relative) {
        acc += v;
        *dst = acc;
    }
    out
}

/// Stretch the HSV value channel so the darkest and brightest 1% saturate
///
/// Images whose value channel is too narrow to stretch come back unchanged.
pub fn equalize_value(bgr: &BgrImage) -> BgrImage {
    let mut hsv = to_hsv(bgr);
    let value = hsv.channel(2);
    let cumulative = cumulative_histogram(&relative_histogram(&value));

    let mut lower = 0usize;
    while lower < 255 && cumulative[lower] < EQUALIZE_CLIP {
        lower += 1;
    }
    let mut upper = 255usize;
    while upper > 0 && cumulative[upper] > 1.0 - EQUALIZE_CLIP {
        upper -= 1;
    }
    if upper <= lower {
        return bgr.clone();
    }

    let scale = 255.0f32 / (upper - lower) as f32;
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = if i < lower {
            0
        } else if i > upper {
            255
        } else {
            ((i - lower) as f32 * scale) as u8
        };
    }

    for px in hsv.as_mut_slice().chunks_exact_mut(3) {
        px[2] = lut[px[2] as usize];
    }
    hsv_to_bgr(&hsv)
}
