//! Local-mean binarization backed by a summed-area table

use crate::models::{GrayImage, Mask};
use crate::utils::filters::{BorderPolicy, reflect_index};

/// Summed-area table with a zero first row and column
struct Integral {
    stride: usize,
    sums: Vec<u64>,
}

impl Integral {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = (gray.width(), gray.height());
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += gray.get(y, x, 0) as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { stride, sums }
    }

    /// Sum over the inclusive rectangle `[y0, y1] x [x0, x1]`
    fn sum(&self, y0: usize, x0: usize, y1: usize, x1: usize) -> u64 {
        let s = self.stride;
        self.sums[(y1 + 1) * s + x1 + 1] + self.sums[y0 * s + x0] - self.sums[y0 * s + x1 + 1] - self.sums[(y1 + 1) * s + x0]
    }
}

/// Local-mean binarization
///
/// Each pixel is compared with `bias` times the mean of the `dim x dim`
/// window around it, clipped to the image. The product is truncated to a
/// byte and the pixel becomes 255 only when strictly greater.
pub fn adaptive_threshold(gray: &GrayImage, dim: usize, bias: f64) -> Mask {
    let (width, height) = (gray.width(), gray.height());
    let mut out = Mask::new(width, height);
    if gray.is_empty() {
        return out;
    }

    let integral = Integral::new(gray);
    let half = dim / 2;

    for y in 0..height {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(width - 1);

            let area = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
            let mean = integral.sum(y0, x0, y1, x1) as f64 / area;
            let threshold = (bias * mean).clamp(0.0, 255.0) as u8;

            if gray.get(y, x, 0) > threshold {
                out.set(y, x, 0, 255);
            }
        }
    }

    out
}

/// Box-mean binarization: 255 where the pixel exceeds the window mean minus `c`
pub fn mean_threshold(gray: &GrayImage, window: usize, c: f64, border: BorderPolicy) -> Mask {
    let (width, height) = (gray.width(), gray.height());
    let mut out = match border {
        BorderPolicy::Copy => gray.clone(),
        BorderPolicy::Zero | BorderPolicy::Reflect => Mask::new(width, height),
    };
    let window = window.max(1);
    let half = window / 2;
    let reflect = border == BorderPolicy::Reflect;

    let (y_range, x_range) = if reflect {
        (0..height, 0..width)
    } else if height <= 2 * half || width <= 2 * half {
        return out;
    } else {
        (half..height - half, half..width - half)
    };

    let count = (window * window) as f64;
    for y in y_range {
        for x in x_range.clone() {
            let mut sum = 0u64;
            for dy in 0..window {
                let sy = y as isize + dy as isize - half as isize;
                let sy = if reflect { reflect_index(sy, height) } else { sy as usize };
                for dx in 0..window {
                    let sx = x as isize + dx as isize - half as isize;
                    let sx = if reflect { reflect_index(sx, width) } else { sx as usize };
                    sum += gray.get(sy, sx, 0) as u64;
                }
            }
            let threshold = sum as f64 / count - c;
            let value = if gray.get(y, x, 0) as f64 > threshold { 255 } else { 0 };
            out.set(y, x, 0, value);
        }
    }

    out
}
