//! cube_vision - read a Rubik's cube from six photographs
//!
//! A pure Rust vision pipeline: every stage from color conversion through
//! Canny, Harris, perspective correction and HSV classification is
//! implemented here on plain pixel buffers. The result is the 54-letter
//! facelet string a cube solver consumes.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Color masks and facelet encoding
pub mod classify;
/// Tuning knobs and environment overrides
pub mod config;
/// Corner detection, outline selection and perspective correction
pub mod detector;
/// Error type and result alias
pub mod error;
/// Tracing subscriber setup
pub mod logger;
/// Core data structures (images, faces, points, matrices, colors)
pub mod models;
/// Per-face chain and whole-cube scans
pub mod pipeline;
/// Image I/O, artifacts and diagnostics
pub mod tools;
/// Image processing building blocks
pub mod utils;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use models::{BgrImage, CubeString, Face, FaceString};
pub use pipeline::{CancelToken, FaceImages, PipelineContext, ScanHandle, ScanProgress, ScanReport};

use std::path::{Path, PathBuf};

/// Convenience front end for scanning a cube from files or memory
#[derive(Debug, Clone, Default)]
pub struct CubeScanner {
    ctx: PipelineContext,
}

impl CubeScanner {
    /// Scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner with `CUBE_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::with_config(ScanConfig::from_env())
    }

    /// Scanner with an explicit configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            ctx: PipelineContext::new(config),
        }
    }

    /// Save intermediate images under `root` after each scan
    pub fn artifacts<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.ctx = self.ctx.with_artifacts(tools::ArtifactSink::new(root));
        self
    }

    /// Write the cube string to `path` after each scan
    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ctx = self.ctx.with_output(path);
        self
    }

    /// Process faces one at a time
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.ctx = self.ctx.sequential(sequential);
        self
    }

    /// Pipeline context used for every scan
    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Scan in-memory images
    pub fn scan(&self, images: &FaceImages) -> Result<ScanReport> {
        pipeline::scan(&self.ctx, images)
    }

    /// Load one file per face and scan them
    pub fn scan_files<P: AsRef<Path>>(&self, paths: &[(Face, P)]) -> Result<ScanReport> {
        let images = tools::load_faces(paths)?;
        self.scan(&images)
    }

    /// Scan on a background thread with progress and cancellation
    pub fn spawn(&self, images: FaceImages) -> ScanHandle {
        pipeline::spawn_scan(self.ctx.clone(), images)
    }
}
