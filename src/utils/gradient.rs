//! Sobel gradients and the Canny edge stages built on them

use crate::config::BlurParams;
use crate::models::{BgrImage, FloatImage, GrayImage, Image, Mask};
use crate::utils::filters::{BorderPolicy, gaussian_blur};

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Pixels this close to any border never survive non-maximum suppression
pub const NMS_MARGIN: usize = 10;

/// Hysteresis marker for a pixel between the two thresholds
pub const WEAK: u8 = 25;
/// Hysteresis marker for an accepted edge pixel
pub const STRONG: u8 = 255;

/// Edge strength and orientation at one pixel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient {
    /// `sqrt(gx^2 + gy^2)`
    pub magnitude: f64,
    /// `atan2(gy, gx)` in degrees, within `(-180, 180]`
    pub direction: f64,
}

impl Gradient {
    /// Build from the two Sobel responses
    pub fn from_components(gx: f64, gy: f64) -> Self {
        Self {
            magnitude: (gx * gx + gy * gy).sqrt(),
            direction: gy.atan2(gx).to_degrees(),
        }
    }
}

/// Per-pixel gradients of a color image
pub type GradientField = Image<Gradient, 1>;

#[inline]
fn sobel_at<const C: usize>(image: &Image<u8, C>, y: usize, x: usize, channel: usize) -> (i32, i32) {
    let mut gx = 0;
    let mut gy = 0;
    for ky in 0..3 {
        for kx in 0..3 {
            let v = image.get(y + ky - 1, x + kx - 1, channel) as i32;
            gx += v * SOBEL_X[ky][kx];
            gy += v * SOBEL_Y[ky][kx];
        }
    }
    (gx, gy)
}

/// Horizontal and vertical Sobel responses of a grayscale image
///
/// The one-pixel frame is left at zero.
pub fn sobel_gray(gray: &GrayImage) -> (FloatImage, FloatImage) {
    let (width, height) = (gray.width(), gray.height());
    let mut ix = FloatImage::new(width, height);
    let mut iy = FloatImage::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let (gx, gy) = sobel_at(gray, y, x, 0);
            ix.set(y, x, 0, gx as f32);
            iy.set(y, x, 0, gy as f32);
        }
    }

    (ix, iy)
}

/// Sobel gradients summed over the three color channels
pub fn color_gradients(bgr: &BgrImage) -> GradientField {
    let (width, height) = (bgr.width(), bgr.height());
    let mut field = GradientField::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0;
            let mut gy = 0;
            for channel in 0..3 {
                let (cx, cy) = sobel_at(bgr, y, x, channel);
                gx += cx;
                gy += cy;
            }
            field.set(y, x, 0, Gradient::from_components(gx as f64, gy as f64));
        }
    }

    field
}

/// Thin edges to one pixel by comparing against the two neighbors across the edge
///
/// Neighbors are blended with weight `|tan(direction)|`; a pixel is kept,
/// clamped to a byte, when its magnitude is at least the blend.
pub fn non_maximum_suppression(gradients: &GradientField) -> GrayImage {
    let (width, height) = (gradients.width(), gradients.height());
    let mut out = GrayImage::new(width, height);
    if width <= 2 * NMS_MARGIN || height <= 2 * NMS_MARGIN {
        return out;
    }

    let mag = |y: usize, x: usize| gradients.get(y, x, 0).magnitude;

    for y in NMS_MARGIN + 1..height - NMS_MARGIN {
        for x in NMS_MARGIN + 1..width - NMS_MARGIN {
            let Gradient { magnitude, direction } = gradients.get(y, x, 0);
            let weight = direction.to_radians().tan().abs();

            let (g1, g2) = if (-22.5..22.5).contains(&direction) || direction >= 157.5 || direction < -157.5 {
                (mag(y, x - 1), mag(y, x + 1))
            } else if (22.5..67.5).contains(&direction) || (-157.5..-112.5).contains(&direction) {
                (mag(y - 1, x + 1), mag(y + 1, x - 1))
            } else if (67.5..112.5).contains(&direction) || (-112.5..-67.5).contains(&direction) {
                (mag(y - 1, x), mag(y + 1, x))
            } else {
                (mag(y - 1, x - 1), mag(y + 1, x + 1))
            };

            let interpolated = g1 * (1.0 - weight) + g2 * weight;
            if magnitude >= interpolated {
                out.set(y, x, 0, magnitude.clamp(0.0, 255.0) as u8);
            }
        }
    }

    out
}

/// Double-threshold edge linking
///
/// Pixels at or above `high` are strong, at or above `low` weak. A single
/// raster pass promotes weak pixels touching a strong one; promotions are
/// visible to later pixels of the same pass. Remaining weak pixels are dropped.
pub fn hysteresis(suppressed: &GrayImage, low: f64, high: f64) -> Mask {
    let (width, height) = (suppressed.width(), suppressed.height());
    let mut edges = suppressed.map(|[v]| {
        let v = v as f64;
        if v >= high {
            [STRONG]
        } else if v >= low {
            [WEAK]
        } else {
            [0]
        }
    });

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if edges.get(y, x, 0) != WEAK {
                continue;
            }
            let touches_strong = (0..3).any(|ky| (0..3).any(|kx| edges.get(y + ky - 1, x + kx - 1, 0) == STRONG));
            edges.set(y, x, 0, if touches_strong { STRONG } else { 0 });
        }
    }

    for v in edges.as_mut_slice() {
        if *v == WEAK {
            *v = 0;
        }
    }

    edges
}

/// Full edge detector on a color image: blur, color Sobel, suppression, hysteresis
pub fn canny(bgr: &BgrImage, blur: BlurParams, low: u8, high: u8, border: BorderPolicy) -> Mask {
    let blurred = gaussian_blur(bgr, blur.size, blur.sigma, border);
    let gradients = color_gradients(&blurred);
    let suppressed = non_maximum_suppression(&gradients);
    hysteresis(&suppressed, low as f64, high as f64)
}

#[inline]
fn is_diagonal(angle: f64) -> bool {
    (-67.5..=-22.5).contains(&angle) || (112.5..=157.5).contains(&angle)
}

/// Strong Sobel edges whose orientation is close to one of the diagonals
pub fn diagonal_edges(gray: &GrayImage, threshold: f64) -> Mask {
    let (width, height) = (gray.width(), gray.height());
    let mut out = Mask::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let (gx, gy) = sobel_at(gray, y, x, 0);
            let g = Gradient::from_components(gx as f64, gy as f64);
            if is_diagonal(g.direction) && g.magnitude >= threshold {
                out.set(y, x, 0, 255);
            }
        }
    }

    out
}
