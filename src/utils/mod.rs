//! Image processing building blocks
//!
//! - Color space conversion (BGR to gray and HSV, HSV back to BGR)
//! - Convolution, Gaussian kernels and border handling
//! - Sobel gradients, non-maximum suppression, hysteresis and Canny
//! - Morphology and local-mean thresholding
//! - Polygon geometry for ranking face outlines
//! - Optional denoising and contrast passes

pub mod color_space;
pub mod filters;
pub mod geometry;
pub mod gradient;
pub mod morphology;
pub mod preprocess;
pub mod threshold;
