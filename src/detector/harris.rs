//! Harris corner detection with thresholding and local-maximum suppression
use crate::config::HarrisParams;
use crate::models::{FloatImage, GrayImage, Point};
use crate::utils::filters::{BorderPolicy, gaussian_smooth};
use crate::utils::gradient::sobel_gray;
use tracing::debug;

/// A pixel accepted as a corner, with its Harris response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Harris response at the pixel
    pub response: f32,
}

impl Corner {
    /// Corner at `(x, y)`
    pub fn new(x: usize, y: usize, response: f32) -> Self {
        Self { x, y, response }
    }

    /// Pixel position as a sub-pixel point
    pub fn to_point(&self) -> Point {
        Point::from_pixel(self.x, self.y)
    }
}

/// Harris detector configured with response and suppression parameters
pub struct HarrisDetector {
    params: HarrisParams,
    border: BorderPolicy,
}

impl HarrisDetector {
    /// Detector with zero-filled borders
    pub fn new(params: HarrisParams) -> Self {
        Self {
            params,
            border: BorderPolicy::Zero,
        }
    }

    /// Border handling for the smoothing of the gradient products
    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }

    /// Parameters in use
    pub fn params(&self) -> &HarrisParams {
        &self.params
    }

    /// Corner response `det(M) - k * trace(M)^2` for every pixel
    pub fn response(&self, gray: &GrayImage) -> FloatImage {
        let (ix, iy) = sobel_gray(gray);

        let ix2 = ix.map(|[x]| [x * x]);
        let iy2 = iy.map(|[y]| [y * y]);
        let mut ixy = FloatImage::new(gray.width(), gray.height());
        for (dst, (&x, &y)) in ixy.as_mut_slice().iter_mut().zip(ix.as_slice().iter().zip(iy.as_slice())) {
            *dst = x * y;
        }

        let smoothing = self.params.smoothing;
        let sxx = gaussian_smooth(&ix2, smoothing.size, smoothing.sigma, self.border);
        let syy = gaussian_smooth(&iy2, smoothing.size, smoothing.sigma, self.border);
        let sxy = gaussian_smooth(&ixy, smoothing.size, smoothing.sigma, self.border);

        let k = self.params.k;
        let mut response = FloatImage::new(gray.width(), gray.height());
        let out = response.as_mut_slice();
        for i in 0..out.len() {
            let (a, b, c) = (sxx.as_slice()[i], syy.as_slice()[i], sxy.as_slice()[i]);
            let det = a * b - c * c;
            let trace = a + b;
            out[i] = (det as f64 - k * trace as f64 * trace as f64) as f32;
        }
        response
    }

    /// Detect corners in a grayscale image, in raster order
    pub fn detect(&self, gray: &GrayImage) -> Vec<Corner> {
        let response = self.response(gray);
        let corners = self.select(&response);
        debug!(
            width = gray.width(),
            height = gray.height(),
            corners = corners.len(),
            "harris corners selected"
        );
        corners
    }

    /// Threshold a response map and keep dominant local maxima
    ///
    /// A candidate must lie at least `margin` pixels inside every border,
    /// exceed the threshold, have no strictly greater 8-neighbor and no
    /// strictly greater pixel within the `min_distance` square window.
    /// Equal responses inside one window all survive.
    pub fn select(&self, response: &FloatImage) -> Vec<Corner> {
        let (width, height) = (response.width(), response.height());
        let margin = self.params.margin.max(1);
        let mut corners = Vec::new();
        if width <= 2 * margin || height <= 2 * margin {
            return corners;
        }

        for y in margin..height - margin {
            for x in margin..width - margin {
                let value = response.get(y, x, 0);
                if (value as f64) > self.params.threshold
                    && Self::is_local_maximum(response, x, y, value)
                    && Self::is_strongest_within(response, x, y, value, self.params.min_distance)
                {
                    corners.push(Corner::new(x, y, value));
                }
            }
        }

        corners
    }

    fn is_local_maximum(response: &FloatImage, x: usize, y: usize, value: f32) -> bool {
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if response.get(ny, nx, 0) > value {
                    return false;
                }
            }
        }
        true
    }

    fn is_strongest_within(response: &FloatImage, x: usize, y: usize, value: f32, radius: usize) -> bool {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(response.height() - 1);
        let x0 = x.saturating_sub(radius);
        let x1 = (x + radius).min(response.width() - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                if response.get(ny, nx, 0) > value {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for HarrisDetector {
    fn default() -> Self {
        Self::new(HarrisParams::default())
    }
}

/// Detect corners with the given parameters and zero borders
pub fn detect_corners(gray: &GrayImage, params: &HarrisParams) -> Vec<Corner> {
    HarrisDetector::new(*params).detect(gray)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrant(size: usize, start: usize) -> GrayImage {
        GrayImage::from_fn(size, size, |r, c| [if r >= start && c >= start { 0 } else { 255 }])
    }

    #[test]
    fn test_single_corner_of_dark_quadrant() {
        let corners = HarrisDetector::default().detect(&quadrant(100, 50));
        assert_eq!(corners.len(), 1);
        let c = corners[0];
        assert_eq!((c.x, c.y), (51, 51));
        assert!(c.response > 1e7);
    }

    #[test]
    fn test_corner_inside_margin_is_ignored() {
        assert!(HarrisDetector::default().detect(&quadrant(100, 5)).is_empty());
    }

    #[test]
    fn test_flat_image_has_no_corners() {
        let flat = GrayImage::from_fn(60, 60, |_, _| [128]);
        assert!(HarrisDetector::default().detect(&flat).is_empty());
        let response = HarrisDetector::default().response(&flat);
        assert!(response.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_straight_edge_has_negative_response() {
        // k = 0.2 makes pure edges strongly negative
        let edge = GrayImage::from_fn(40, 40, |_, c| [if c >= 20 { 255 } else { 0 }]);
        let response = HarrisDetector::default().response(&edge);
        assert!(response.get(20, 20, 0) < 0.0);
    }

    #[test]
    fn test_select_keeps_equal_maxima() {
        let mut response = FloatImage::new(80, 80);
        response.set(20, 20, 0, 5e7);
        response.set(20, 25, 0, 5e7);
        response.set(60, 60, 0, 9e7);
        response.set(60, 65, 0, 2e7); // dominated within the window
        let corners = HarrisDetector::default().select(&response);
        let positions: Vec<(usize, usize)> = corners.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(positions, vec![(20, 20), (25, 20), (60, 60)]);
    }

    #[test]
    fn test_select_threshold_is_strict() {
        let mut response = FloatImage::new(40, 40);
        response.set(20, 20, 0, 1e7);
        assert!(HarrisDetector::default().select(&response).is_empty());
    }

    #[test]
    fn test_detect_corners_wrapper() {
        let params = HarrisParams::default();
        assert_eq!(detect_corners(&quadrant(100, 50), &params).len(), 1);
    }
}
