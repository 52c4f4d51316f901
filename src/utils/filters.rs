//! Gaussian kernels and sliding-window blur
//!
//! Every operator here allocates its output; inputs are never mutated.
//! Pixels whose window would leave the image are handled according to a
//! [`BorderPolicy`] chosen per call.

use crate::models::Image;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// How sliding-window operators treat pixels whose window leaves the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderPolicy {
    /// Border pixels are left at zero
    #[default]
    Zero,
    /// Border pixels copy the input unchanged
    Copy,
    /// Every pixel is computed, sampling mirrored across the edge (`dcb|abcd|cba`)
    Reflect,
}

/// Reflect `i` into `0..len` without repeating the edge sample
#[inline]
pub(crate) fn reflect_index(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let period = 2 * (len - 1);
    let mut i = i.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as usize
}

/// Square matrix of filter weights
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build from row-major weights; `weights.len()` must be `size * size`
    pub fn from_weights(size: usize, weights: Vec<f64>) -> Option<Self> {
        (size > 0 && weights.len() == size * size).then_some(Self { size, weights })
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the anchor to the first row or column
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weight at `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Normalized 2-D Gaussian centered at `size / 2`
pub fn gaussian_kernel(size: usize, sigma: f64) -> Kernel {
    let size = size.max(1);
    let center = (size / 2) as f64;
    let norm = 2.0 * std::f64::consts::PI * sigma * sigma;

    let mut weights = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f64 - center) / sigma;
            let dy = (y as f64 - center) / sigma;
            weights.push((-0.5 * (dx * dx + dy * dy)).exp() / norm);
        }
    }

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }

    Kernel { size, weights }
}

type KernelCache = RwLock<HashMap<(usize, u64), Arc<Kernel>>>;

static KERNEL_CACHE: OnceLock<KernelCache> = OnceLock::new();

/// Shared Gaussian kernel, built once per `(size, sigma)` for the whole process
pub fn cached_gaussian_kernel(size: usize, sigma: f64) -> Arc<Kernel> {
    let cache = KERNEL_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    let key = (size, sigma.to_bits());

    if let Ok(map) = cache.read() {
        if let Some(kernel) = map.get(&key) {
            return Arc::clone(kernel);
        }
    }

    let kernel = Arc::new(gaussian_kernel(size, sigma));
    if let Ok(mut map) = cache.write() {
        return Arc::clone(map.entry(key).or_insert(kernel));
    }
    kernel
}

/// Element types a kernel can be applied to
pub trait Sample: Copy + Default + Send + Sync {
    /// Widen to the accumulator type
    fn to_f64(self) -> f64;
    /// Narrow an accumulated value back
    fn from_f64(value: f64) -> Self;
}

impl Sample for u8 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.clamp(0.0, 255.0) as u8
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Correlate every channel with `kernel`
pub fn convolve<T: Sample, const C: usize>(
    image: &Image<T, C>,
    kernel: &Kernel,
    border: BorderPolicy,
) -> Image<T, C> {
    let (width, height) = (image.width(), image.height());
    let mut out = match border {
        BorderPolicy::Copy => image.clone(),
        BorderPolicy::Zero | BorderPolicy::Reflect => Image::new(width, height),
    };
    let size = kernel.size();
    let radius = kernel.radius();

    let reflect = border == BorderPolicy::Reflect;
    let (y_range, x_range) = if reflect {
        (0..height, 0..width)
    } else if height < size || width < size {
        return out;
    } else {
        (radius..height - (size - 1 - radius), radius..width - (size - 1 - radius))
    };

    for y in y_range {
        for x in x_range.clone() {
            let mut acc = [0.0f64; C];
            for ky in 0..size {
                let sy = y as isize + ky as isize - radius as isize;
                let sy = if reflect { reflect_index(sy, height) } else { sy as usize };
                for kx in 0..size {
                    let sx = x as isize + kx as isize - radius as isize;
                    let sx = if reflect { reflect_index(sx, width) } else { sx as usize };
                    let w = kernel.get(ky, kx);
                    let px = image.pixel(sy, sx);
                    for c in 0..C {
                        acc[c] += px[c].to_f64() * w;
                    }
                }
            }
            let mut value = [T::default(); C];
            for c in 0..C {
                value[c] = T::from_f64(acc[c]);
            }
            out.set_pixel(y, x, value);
        }
    }

    out
}

/// Gaussian blur of an 8-bit image, each channel independently
pub fn gaussian_blur<const C: usize>(
    image: &Image<u8, C>,
    size: usize,
    sigma: f64,
    border: BorderPolicy,
) -> Image<u8, C> {
    convolve(image, &cached_gaussian_kernel(size, sigma), border)
}

/// Gaussian smoothing of a floating point image
pub fn gaussian_smooth(image: &Image<f32, 1>, size: usize, sigma: f64, border: BorderPolicy) -> Image<f32, 1> {
    convolve(image, &cached_gaussian_kernel(size, sigma), border)
}
