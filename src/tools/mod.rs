use crate::config::loader_max_dim;
use crate::error::{Result, ScanError};
use crate::models::{BgrImage, CubeString, Face, GrayImage};
use crate::pipeline::{FaceImages, FaceResult};
use crate::utils::preprocess::channel_histograms;
use image::GenericImageView;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load an image file as BGR, downscaling when `CUBE_MAX_DIM` asks for it.
pub fn load_bgr<P: AsRef<Path>>(path: P) -> Result<BgrImage> {
    let img = image::open(path.as_ref())?;
    let max_dim = loader_max_dim() as u32;
    let (orig_w, orig_h) = img.dimensions();
    let rgb = if max_dim > 0 && orig_w.max(orig_h) > max_dim {
        debug!(orig_w, orig_h, max_dim, "downscaling input");
        img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle).to_rgb8()
    } else {
        img.to_rgb8()
    };
    let (width, height) = rgb.dimensions();
    BgrImage::from_rgb_bytes(rgb.as_raw(), width as usize, height as usize)
}

/// Load one photo per face.
pub fn load_faces<P: AsRef<Path>>(paths: &[(Face, P)]) -> Result<FaceImages> {
    let mut images = FaceImages::new();
    for (face, path) in paths {
        images.insert(*face, load_bgr(path)?);
    }
    Ok(images)
}

/// Save a single-channel image as PNG (or whatever the extension says).
pub fn save_gray<P: AsRef<Path>>(path: P, gray: &GrayImage) -> Result<()> {
    let buffer = image::GrayImage::from_raw(gray.width() as u32, gray.height() as u32, gray.as_slice().to_vec())
        .ok_or(ScanError::BufferSize {
            len: gray.as_slice().len(),
            width: gray.width(),
            height: gray.height(),
            channels: 1,
        })?;
    buffer.save(path)?;
    Ok(())
}

/// Save a BGR image with channels swapped back to RGB.
pub fn save_bgr<P: AsRef<Path>>(path: P, bgr: &BgrImage) -> Result<()> {
    let rgb = bgr.to_rgb_bytes();
    let len = rgb.len();
    let buffer = image::RgbImage::from_raw(bgr.width() as u32, bgr.height() as u32, rgb).ok_or(
        ScanError::BufferSize {
            len,
            width: bgr.width(),
            height: bgr.height(),
            channels: 3,
        },
    )?;
    buffer.save(path)?;
    Ok(())
}

/// Draw a circle outline of the given thickness, clipped to the image.
pub fn draw_circle(image: &mut GrayImage, cx: usize, cy: usize, radius: usize, thickness: usize, value: u8) {
    let r = radius as f64;
    let half = thickness.max(1) as f64 / 2.0;
    let reach = (radius + thickness) as isize;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (y, x) = (cy as isize + dy, cx as isize + dx);
            if !image.in_bounds(y, x) {
                continue;
            }
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if (d - r).abs() <= half {
                image.set(y as usize, x as usize, 0, value);
            }
        }
    }
}

/// Write the cube string, creating parent directories as needed.
pub fn write_cube_string<P: AsRef<Path>>(path: P, cube: &CubeString) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, cube.as_str())?;
    Ok(())
}

/// Directory tree receiving per-stage images of a scan.
///
/// Layout under the root:
/// `canny/<face>.png`, `harris/<face>.png`, `cropped/<face>.png` and
/// `threshold/<face>/<color>.png`. The harris image circles every corner
/// candidate and rings the four selected outline corners in gray.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSink {
    root: PathBuf,
}

impl ArtifactSink {
    /// Sink rooted at `root`; nothing is created until the first write.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, parts: &[&str]) -> Result<PathBuf> {
        let mut dir = self.root.clone();
        for part in parts {
            dir.push(part);
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write every artifact of one face.
    pub fn write_face(&self, result: &FaceResult) -> Result<()> {
        let file = format!("{}.png", result.face.name());

        save_gray(self.dir(&["canny"])?.join(&file), &result.edges)?;

        let mut marked = result.edges.clone();
        for corner in &result.corners {
            draw_circle(&mut marked, corner.x, corner.y, 3, 2, 255);
        }
        for p in result.quad.corners() {
            if let Some((x, y)) = p.to_pixel(marked.width(), marked.height()) {
                draw_circle(&mut marked, x, y, 7, 1, 128);
            }
        }
        save_gray(self.dir(&["harris"])?.join(&file), &marked)?;

        save_bgr(self.dir(&["cropped"])?.join(&file), &result.rectified)?;

        let threshold_dir = self.dir(&["threshold", result.face.name()])?;
        for m in &result.masks {
            save_gray(threshold_dir.join(format!("{}.png", m.range.name)), &m.mask)?;
        }
        Ok(())
    }
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn gray_stats(gray: &GrayImage) -> GrayStats {
    let data = gray.as_slice();
    if data.is_empty() {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in data {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = (sum / data.len() as u64) as u8;
    GrayStats { min, max, avg }
}

/// Most frequent intensity per channel, as `[b, g, r]`.
pub fn dominant_channels(bgr: &BgrImage) -> [u8; 3] {
    channel_histograms(bgr).peaks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::color_masks;
    use crate::detector::{Corner, Quadrilateral};
    use crate::models::{ColorTable, FaceString, Mask, Point};
    use crate::utils::color_space::to_hsv;
    use tempfile::tempdir;

    fn sample_result(face: Face) -> FaceResult {
        let rectified = BgrImage::from_fn(30, 30, |_, _| [255, 0, 0]);
        FaceResult {
            face,
            edges: Mask::new(40, 40),
            corners: vec![Corner::new(20, 20, 5e7)],
            quad: Quadrilateral::from_ordered([
                Point::new(1.0, 1.0),
                Point::new(40.0, 1.0),
                Point::new(40.0, 40.0),
                Point::new(1.0, 40.0),
            ]),
            masks: color_masks(&to_hsv(&rectified), &ColorTable::default()),
            rectified,
            letters: FaceString::unknown(),
        }
    }

    #[test]
    fn test_artifact_layout() {
        let dir = tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.write_face(&sample_result(Face::Top)).unwrap();

        assert!(dir.path().join("canny/top.png").exists());
        assert!(dir.path().join("harris/top.png").exists());
        assert!(dir.path().join("cropped/top.png").exists());
        assert!(dir.path().join("threshold/top/blue.png").exists());
        assert!(dir.path().join("threshold/top/red-high.png").exists());
    }

    #[test]
    fn test_save_and_load_roundtrip_keeps_channel_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("face.png");
        let img = BgrImage::from_fn(8, 5, |r, c| [(r * 20) as u8, (c * 30) as u8, 200]);
        save_bgr(&path, &img).unwrap();
        assert_eq!(load_bgr(&path).unwrap(), img);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(load_bgr("/definitely/not/here/face.png").is_err());
    }

    #[test]
    fn test_write_cube_string_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solver/CubeString.txt");
        write_cube_string(&path, &CubeString::new()).unwrap();
        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved.len(), 54);
        assert!(saved.chars().all(|c| c == 'n'));
    }

    #[test]
    fn test_draw_circle_marks_ring_only() {
        let mut img = GrayImage::new(20, 20);
        draw_circle(&mut img, 10, 10, 3, 2, 255);
        assert_eq!(img.get(10, 13, 0), 255);
        assert_eq!(img.get(7, 10, 0), 255);
        assert_eq!(img.get(10, 10, 0), 0);
        assert_eq!(img.get(10, 17, 0), 0);

        // Clipped at the border without panicking
        draw_circle(&mut img, 0, 0, 3, 2, 255);
        assert_eq!(img.get(0, 3, 0), 255);
    }

    #[test]
    fn test_gray_stats() {
        let img = GrayImage::from_fn(4, 1, |_, c| [[10, 20, 30, 40][c]]);
        assert_eq!(gray_stats(&img), GrayStats { min: 10, max: 40, avg: 25 });
        assert_eq!(gray_stats(&GrayImage::new(0, 0)), GrayStats { min: 0, max: 0, avg: 0 });
    }
}
