//! Face-by-face processing and whole-cube scans
//!
//! A face goes through blur, Canny, Harris on the edge map, outline
//! selection, perspective correction and color classification. A scan runs
//! the six faces in parallel, assembles the cube string and only then
//! touches the filesystem.

use crate::classify::{ColorMask, assemble_cube_string, color_masks, encode_face};
use crate::config::ScanConfig;
use crate::detector::{Corner, HarrisDetector, Quadrilateral, extract_face};
use crate::error::{Result, ScanError};
use crate::models::{BgrImage, CubeString, Face, FaceString, Mask};
use crate::tools::{ArtifactSink, write_cube_string};
use crate::utils::color_space::to_hsv;
use crate::utils::filters::gaussian_blur;
use crate::utils::gradient::canny;
use crate::utils::preprocess::{denoise, equalize_value};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// Input photos keyed by face
pub type FaceImages = BTreeMap<Face, BgrImage>;

/// Configuration and side outputs shared by every face of a scan
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Tuning knobs for every stage
    pub config: ScanConfig,
    /// Where intermediate images go, if anywhere
    pub artifacts: Option<ArtifactSink>,
    /// File receiving the cube string after a successful scan
    pub output: Option<PathBuf>,
    /// Process faces one after another instead of on the rayon pool
    pub sequential: bool,
}

impl PipelineContext {
    /// Context without artifacts or output file
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Write intermediate images to `sink`
    pub fn with_artifacts(mut self, sink: ArtifactSink) -> Self {
        self.artifacts = Some(sink);
        self
    }

    /// Write the cube string to `path`
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Run faces one at a time
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }
}

/// Everything computed for one face
#[derive(Debug, Clone)]
pub struct FaceResult {
    /// Face the photo shows
    pub face: Face,
    /// Canny edge map the corners were detected on
    pub edges: Mask,
    /// Harris candidates on the edge map
    pub corners: Vec<Corner>,
    /// Outline chosen among the candidates
    pub quad: Quadrilateral,
    /// Face warped upright and resized to the configured face size
    pub rectified: BgrImage,
    /// One mask per color range, in table order
    pub masks: Vec<ColorMask>,
    /// Letters read from the masks
    pub letters: FaceString,
}

/// Shared flag that stops a scan before its next face
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Completion count after each finished face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Faces finished so far
    pub completed: usize,
    /// Faces in the scan
    pub total: usize,
    /// `completed * 100 / total`, rounded down
    pub percent: u8,
}

impl ScanProgress {
    /// Progress after `completed` of `total` faces
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 { 100 } else { (completed * 100 / total).min(100) as u8 };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Progress reporting and cancellation for one scan
#[derive(Debug, Default)]
pub struct ScanControl {
    /// Receives one event per finished face
    pub progress: Option<Sender<ScanProgress>>,
    /// Checked before each face starts
    pub cancel: CancelToken,
}

impl ScanControl {
    fn report(&self, completed: usize, total: usize) {
        if let Some(tx) = &self.progress {
            // A dropped receiver only means nobody is listening
            let _ = tx.send(ScanProgress::new(completed, total));
        }
    }
}

/// Result of a full scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Assembled 54-letter cube string
    pub cube: CubeString,
    /// Per-face results in cube-string order
    pub faces: Vec<FaceResult>,
    /// Wall time of the scan
    pub elapsed: Duration,
}

impl ScanReport {
    /// Result for one face
    pub fn face(&self, face: Face) -> Option<&FaceResult> {
        self.faces.iter().find(|r| r.face == face)
    }
}

/// Run the whole per-face chain on one photo
pub fn process_face(ctx: &PipelineContext, face: Face, bgr: &BgrImage) -> Result<FaceResult> {
    let _span = info_span!("face", face = %face).entered();
    let cfg = &ctx.config;
    if bgr.is_empty() {
        return Err(ScanError::InvalidDimensions(bgr.width(), bgr.height()));
    }

    let denoised;
    let source = if cfg.denoise {
        denoised = denoise(bgr, cfg.border);
        &denoised
    } else {
        bgr
    };

    let blurred = gaussian_blur(source, cfg.pre_blur.size, cfg.pre_blur.sigma, cfg.border);
    let edges = canny(&blurred, cfg.canny_blur, cfg.canny_low, cfg.canny_high, cfg.border);
    debug!(edge_pixels = edges.count_set(), "canny finished");

    let corners = HarrisDetector::new(cfg.harris).with_border(cfg.border).detect(&edges);
    let (quad, mut rectified) = extract_face(source, &corners, face, cfg.face_size)?;
    if cfg.equalize {
        rectified = equalize_value(&rectified);
    }

    let masks = color_masks(&to_hsv(&rectified), &cfg.colors);
    let letters = encode_face(&masks, cfg.merge_split_ranges)?;
    info!(corners = corners.len(), letters = %letters, "face classified");

    Ok(FaceResult {
        face,
        edges,
        corners,
        quad,
        rectified,
        masks,
        letters,
    })
}

/// Scan all six faces without progress reporting
pub fn scan(ctx: &PipelineContext, images: &FaceImages) -> Result<ScanReport> {
    scan_with(ctx, images, &ScanControl::default())
}

/// Scan all six faces, reporting progress and honoring cancellation
///
/// Artifacts and the output file are written only after every face has
/// been classified and the cube string assembled.
pub fn scan_with(ctx: &PipelineContext, images: &FaceImages, control: &ScanControl) -> Result<ScanReport> {
    let start = Instant::now();
    let missing: Vec<Face> = Face::ALL.into_iter().filter(|f| !images.contains_key(f)).collect();
    if !missing.is_empty() {
        return Err(ScanError::MissingFaces(missing));
    }

    let total = Face::ALL.len();
    let completed = AtomicUsize::new(0);
    let run = |face: &Face| -> Result<FaceResult> {
        if control.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let bgr = images.get(face).ok_or_else(|| ScanError::MissingFaces(vec![*face]))?;
        let result = process_face(ctx, *face, bgr)?;
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        control.report(done, total);
        Ok(result)
    };

    let faces: Vec<FaceResult> = if ctx.sequential {
        Face::ALL.iter().map(&run).collect::<Result<_>>()?
    } else {
        Face::ALL.par_iter().map(&run).collect::<Result<_>>()?
    };

    let letters: Vec<(Face, FaceString)> = faces.iter().map(|r| (r.face, r.letters)).collect();
    let cube = assemble_cube_string(&letters)?;
    finalize(ctx, &faces, &cube)?;

    let elapsed = start.elapsed();
    info!(cube = %cube, elapsed_ms = elapsed.as_millis() as u64, "scan finished");
    Ok(ScanReport { cube, faces, elapsed })
}

fn finalize(ctx: &PipelineContext, faces: &[FaceResult], cube: &CubeString) -> Result<()> {
    if let Some(sink) = &ctx.artifacts {
        for result in faces {
            sink.write_face(result)?;
        }
        debug!(root = %sink.root().display(), "artifacts written");
    }
    if let Some(path) = &ctx.output {
        write_cube_string(path, cube)?;
        info!(path = %path.display(), "cube string saved");
    }
    Ok(())
}

/// A scan running on its own thread
pub struct ScanHandle {
    progress: Receiver<ScanProgress>,
    cancel: CancelToken,
    handle: JoinHandle<Result<ScanReport>>,
}

impl ScanHandle {
    /// Progress events; the channel closes when the scan ends
    pub fn progress(&self) -> &Receiver<ScanProgress> {
        &self.progress
    }

    /// Token that cancels this scan
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop the scan before its next face
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the scan to finish
    pub fn join(self) -> Result<ScanReport> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                warn!("scan worker panicked");
                Err(ScanError::WorkerPanicked)
            }
        }
    }
}

/// Start a scan on a background thread
pub fn spawn_scan(ctx: PipelineContext, images: FaceImages) -> ScanHandle {
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let control = ScanControl {
        progress: Some(tx),
        cancel: cancel.clone(),
    };
    let handle = std::thread::spawn(move || scan_with(&ctx, &images, &control));
    ScanHandle {
        progress: rx,
        cancel,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(ScanProgress::new(1, 6).percent, 16);
        assert_eq!(ScanProgress::new(3, 6).percent, 50);
        assert_eq!(ScanProgress::new(6, 6).percent, 100);
        assert_eq!(ScanProgress::new(0, 0).percent, 100);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_blank_face_has_no_corners() {
        let ctx = PipelineContext::default();
        let err = process_face(&ctx, Face::Back, &BgrImage::new(80, 80)).unwrap_err();
        assert!(matches!(err, ScanError::NotEnoughCorners { face: Face::Back, found: 0 }));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let ctx = PipelineContext::default();
        let err = process_face(&ctx, Face::Mid, &BgrImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, ScanError::InvalidDimensions(0, 0)));
    }

    #[test]
    fn test_optional_passes_keep_white_center() {
        let mut config = ScanConfig::default();
        config.denoise = true;
        config.equalize = true;
        let ctx = PipelineContext::new(config);
        let bgr = BgrImage::from_fn(120, 120, |r, c| {
            if (30..90).contains(&r) && (30..90).contains(&c) { [255, 255, 255] } else { [0, 0, 0] }
        });
        let result = process_face(&ctx, Face::Mid, &bgr).unwrap();
        assert_eq!(result.letters.get(1, 1), 'w');
        assert_eq!(result.masks.len(), 7);
    }

    #[test]
    fn test_scan_requires_all_faces() {
        let mut images = FaceImages::new();
        images.insert(Face::Mid, BgrImage::new(10, 10));
        match scan(&PipelineContext::default(), &images) {
            Err(ScanError::MissingFaces(missing)) => assert_eq!(missing.len(), 5),
            other => panic!("expected missing faces, got {:?}", other.map(|r| r.cube)),
        }
    }
}
