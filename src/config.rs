//! Pipeline tuning knobs
//!
//! `ScanConfig::default()` holds the values the scanner was calibrated with.
//! `ScanConfig::from_env()` lets the numeric knobs be overridden through
//! `CUBE_*` environment variables without recompiling.

use crate::models::ColorTable;
use crate::utils::filters::BorderPolicy;
use std::str::FromStr;
use std::sync::OnceLock;

fn parse_value<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn parse_env_f64(name: &str, default: f64) -> f64 {
    parse_value(std::env::var(name).ok(), default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    parse_value(std::env::var(name).ok(), default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    parse_value(std::env::var(name).ok(), default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static LOADER_MAX_DIM: OnceLock<usize> = OnceLock::new();

/// Longest side accepted by the file loader before downscaling, 0 disables
pub(crate) fn loader_max_dim() -> usize {
    *LOADER_MAX_DIM.get_or_init(|| parse_env_usize("CUBE_MAX_DIM", 0))
}

/// Square Gaussian blur parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurParams {
    /// Kernel side length
    pub size: usize,
    /// Standard deviation
    pub sigma: f64,
}

impl BlurParams {
    /// Create blur parameters
    pub const fn new(size: usize, sigma: f64) -> Self {
        Self { size, sigma }
    }
}

/// Harris corner detector parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarrisParams {
    /// Trace weight in `det - k * trace^2`
    pub k: f64,
    /// Minimum response for a candidate
    pub threshold: f64,
    /// Half side of the square suppression window
    pub min_distance: usize,
    /// Candidates closer than this to any border are ignored
    pub margin: usize,
    /// Smoothing applied to the gradient products
    pub smoothing: BlurParams,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            k: 0.2,
            threshold: 1e7,
            min_distance: 20,
            margin: 10,
            smoothing: BlurParams::new(5, 1.5),
        }
    }
}

/// Everything the pipeline needs to process a face
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Blur applied to the raw photo before edge detection
    pub pre_blur: BlurParams,
    /// Blur applied inside the Canny stage
    pub canny_blur: BlurParams,
    /// Hysteresis weak threshold
    pub canny_low: u8,
    /// Hysteresis strong threshold
    pub canny_high: u8,
    /// Corner detector parameters
    pub harris: HarrisParams,
    /// Side length of the rectified face image
    pub face_size: usize,
    /// Bias applied to the local mean in adaptive thresholding
    pub adaptive_bias: f64,
    /// Border handling for blur-like operators
    pub border: BorderPolicy,
    /// Fold red-low and red-high into one mask before encoding
    pub merge_split_ranges: bool,
    /// Vector-median denoise the photo before blurring
    pub denoise: bool,
    /// Stretch the HSV value channel of the rectified face before classification
    pub equalize: bool,
    /// Sticker color bands, applied in order
    pub colors: ColorTable,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pre_blur: BlurParams::new(7, 1.0),
            canny_blur: BlurParams::new(3, 1.0),
            canny_low: 170,
            canny_high: 250,
            harris: HarrisParams::default(),
            face_size: 200,
            adaptive_bias: 0.85,
            border: BorderPolicy::Zero,
            merge_split_ranges: false,
            denoise: false,
            equalize: false,
            colors: ColorTable::default(),
        }
    }
}

impl ScanConfig {
    /// Defaults overridden by any `CUBE_*` variables that parse
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.harris.threshold = parse_env_f64("CUBE_HARRIS_THRESHOLD", config.harris.threshold);
        config.harris.k = parse_env_f64("CUBE_HARRIS_K", config.harris.k);
        config.harris.min_distance = parse_env_usize("CUBE_MIN_DISTANCE", config.harris.min_distance);
        config.canny_low = parse_env_u8("CUBE_CANNY_LOW", config.canny_low);
        config.canny_high = parse_env_u8("CUBE_CANNY_HIGH", config.canny_high);
        config.face_size = parse_env_usize("CUBE_FACE_SIZE", config.face_size).max(3);
        config.merge_split_ranges = parse_env_bool_u8("CUBE_MERGE_RED", config.merge_split_ranges);
        config.denoise = parse_env_bool_u8("CUBE_DENOISE", config.denoise);
        config.equalize = parse_env_bool_u8("CUBE_EQUALIZE", config.equalize);
        config
    }
}
