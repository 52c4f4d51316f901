//! Projective correction of a detected face onto an upright square
//!
//! The transform is built from four point correspondences with the
//! classic three-point basis method: each point set is written in the
//! homogeneous basis of its first three points, and the fourth point
//! fixes the per-column scale. The resulting matrix maps destination
//! coordinates back to the source image, so every output pixel is
//! sampled exactly once.

use crate::detector::harris::Corner;
use crate::detector::quad::{Quadrilateral, Selection, select_quadrilateral};
use crate::error::{Result, ScanError};
use crate::models::{BgrImage, Face, Image, Matrix, Point};
use tracing::debug;

/// 3x3 homography from destination to source homogeneous coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectiveMatrix {
    m: Matrix,
}

/// Rows `[x0 x1 x2; y0 y1 y2; 1 1 1]` built from the first three points
fn basis_matrix(points: &[Point; 4]) -> Result<Matrix> {
    Matrix::from_rows(&[
        &[points[0].x, points[1].x, points[2].x],
        &[points[0].y, points[1].y, points[2].y],
        &[1.0, 1.0, 1.0],
    ])
}

impl ProjectiveMatrix {
    /// Homography taking `dst[i]` to `src[i]` for all four pairs
    ///
    /// Fails with [`ScanError::SingularMatrix`] when either basis matrix hits
    /// an exactly-zero pivot, which includes any point set with the first
    /// point at the origin.
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Result<Self> {
        let src_basis_inv = basis_matrix(src)?.invert()?;
        let dst_basis_inv = basis_matrix(dst)?.invert()?;

        let b_src = src_basis_inv.multiply(&Matrix::column3(src[3].x, src[3].y))?;
        let b_dst = dst_basis_inv.multiply(&Matrix::column3(dst[3].x, dst[3].y))?;

        let mut scaled = Matrix::zeros(3, 3);
        for (i, p) in src.iter().take(3).enumerate() {
            let factor = b_src.get(i, 0) / b_dst.get(i, 0);
            scaled.set(0, i, p.x * factor);
            scaled.set(1, i, p.y * factor);
            scaled.set(2, i, factor);
        }

        Ok(Self {
            m: scaled.multiply(&dst_basis_inv)?,
        })
    }

    /// Underlying 3x3 matrix
    pub fn matrix(&self) -> &Matrix {
        &self.m
    }

    /// Source position of destination point `(x, y)`, `None` at infinity
    pub fn map(&self, x: f64, y: f64) -> Option<Point> {
        let m = &self.m;
        let w = m.get(2, 0) * x + m.get(2, 1) * y + m.get(2, 2);
        if w == 0.0 {
            return None;
        }
        let sx = m.get(0, 0) * x + m.get(0, 1) * y + m.get(0, 2);
        let sy = m.get(1, 0) * x + m.get(1, 1) * y + m.get(1, 2);
        Some(Point::new(sx / w, sy / w))
    }

    /// Resample `src` into a `width x height` grid
    ///
    /// Bilinear interpolation over the 2x2 neighborhood, rounded half up.
    /// Pixels whose neighborhood leaves the source stay zero.
    pub fn warp<const C: usize>(&self, src: &Image<u8, C>, width: usize, height: usize) -> Image<u8, C> {
        let mut out = Image::<u8, C>::new(width, height);
        let (src_w, src_h) = (src.width() as i64, src.height() as i64);

        for y in 0..height {
            for x in 0..width {
                let Some(p) = self.map(x as f64, y as f64) else {
                    continue;
                };
                // Truncation toward zero, as a cast does
                let x0 = p.x as i64;
                let y0 = p.y as i64;
                let (x1, y1) = (x0 + 1, y0 + 1);
                if x0 < 0 || y0 < 0 || x1 >= src_w || y1 >= src_h {
                    continue;
                }
                let xr = p.x - x0 as f64;
                let yr = p.y - y0 as f64;
                let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);

                let mut px = [0u8; C];
                for (c, v) in px.iter_mut().enumerate() {
                    let top = xr * src.get(y0, x1, c) as f64 + (1.0 - xr) * src.get(y0, x0, c) as f64;
                    let bottom = xr * src.get(y1, x1, c) as f64 + (1.0 - xr) * src.get(y1, x0, c) as f64;
                    let value = yr * bottom + (1.0 - yr) * top;
                    *v = (value + 0.5).clamp(0.0, 255.0) as u8;
                }
                out.set_pixel(y, x, px);
            }
        }

        out
    }
}

/// Bilinear resize with pixel centers aligned
pub fn resize_bilinear<const C: usize>(src: &Image<u8, C>, width: usize, height: usize) -> Image<u8, C> {
    let mut out = Image::<u8, C>::new(width, height);
    if src.is_empty() || width == 0 || height == 0 {
        return out;
    }

    let scale_x = src.width() as f64 / width as f64;
    let scale_y = src.height() as f64 / height as f64;
    let max_x = src.width() - 1;
    let max_y = src.height() - 1;

    for y in 0..height {
        let fy = ((y as f64 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = (fy.floor() as usize).min(max_y);
        let y1 = (y0 + 1).min(max_y);
        let wy = fy - y0 as f64;
        for x in 0..width {
            let fx = ((x as f64 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = (fx.floor() as usize).min(max_x);
            let x1 = (x0 + 1).min(max_x);
            let wx = fx - x0 as f64;

            let mut px = [0u8; C];
            for (c, v) in px.iter_mut().enumerate() {
                let top = src.get(y0, x0, c) as f64 * (1.0 - wx) + src.get(y0, x1, c) as f64 * wx;
                let bottom = src.get(y1, x0, c) as f64 * (1.0 - wx) + src.get(y1, x1, c) as f64 * wx;
                *v = (top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8;
            }
            out.set_pixel(y, x, px);
        }
    }

    out
}

/// Warp the quadrilateral onto the full frame, then shrink to `face_size`
///
/// Destination corners are `(1, 1)`, `(W, 1)`, `(W, H)`, `(1, H)` of the
/// source frame.
pub fn rectify(bgr: &BgrImage, quad: &Quadrilateral, face_size: usize) -> Result<BgrImage> {
    let (w, h) = (bgr.width(), bgr.height());
    if bgr.is_empty() {
        return Err(ScanError::InvalidDimensions(w, h));
    }
    let dst = [
        Point::new(1.0, 1.0),
        Point::new(w as f64, 1.0),
        Point::new(w as f64, h as f64),
        Point::new(1.0, h as f64),
    ];
    let transform = ProjectiveMatrix::from_correspondences(&quad.corners(), &dst)?;
    let warped = transform.warp(bgr, w, h);
    Ok(resize_bilinear(&warped, face_size, face_size))
}

/// Select the face outline among `candidates` and rectify it
pub fn extract_face(
    bgr: &BgrImage,
    candidates: &[Corner],
    face: Face,
    face_size: usize,
) -> Result<(Quadrilateral, BgrImage)> {
    let quad = match select_quadrilateral(candidates) {
        Selection::Quad(quad) => quad,
        Selection::Degenerate(raw) => {
            return Err(ScanError::NotEnoughCorners { face, found: raw.len() });
        }
    };
    debug!(
        face = %face,
        tl = ?quad.top_left,
        br = ?quad.bottom_right,
        "face outline selected"
    );
    let rectified = rectify(bgr, &quad, face_size)?;
    Ok((quad, rectified))
}
