use crate::error::{Result, ScanError};
use crate::models::{ColorRange, ColorTable, Face, Hsv, HsvImage, Mask};
use rayon::prelude::*;
use tracing::debug;

/// A color range together with the pixels of one face that fall inside it
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMask {
    /// Range the mask was built from
    pub range: ColorRange,
    /// 255 where the pixel falls inside the range
    pub mask: Mask,
}

impl ColorMask {
    /// Facelet letter of the range
    pub fn letter(&self) -> char {
        self.range.letter
    }
}

/// 255 where H, S and V all lie inside the range's inclusive bounds
pub fn color_mask(hsv: &HsvImage, range: &ColorRange) -> Mask {
    hsv.map(|px| [if range.contains(Hsv::from_pixel(px)) { 255 } else { 0 }])
}

/// One mask per table entry, in table order
pub fn color_masks(hsv: &HsvImage, table: &ColorTable) -> Vec<ColorMask> {
    table
        .ranges()
        .iter()
        .map(|range| {
            let mask = color_mask(hsv, range);
            debug!(color = range.name, pixels = mask.count_set(), "color mask");
            ColorMask { range: *range, mask }
        })
        .collect()
}

/// 255 where the hue alone lies in `[low, high]`
pub fn hue_mask(hsv: &HsvImage, low: u8, high: u8) -> Mask {
    hsv.map(|[h, _, _]| [if h >= low && h <= high { 255 } else { 0 }])
}

/// Pixel-wise union of two masks of equal size
pub fn merge_masks(a: &Mask, b: &Mask) -> Result<Mask> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(ScanError::InvalidDimensions(b.width(), b.height()));
    }
    let mut out = a.clone();
    for (dst, &src) in out.as_mut_slice().iter_mut().zip(b.as_slice()) {
        *dst = if *dst == 255 || src == 255 { 255 } else { 0 };
    }
    Ok(out)
}

/// Classify several faces at once, preserving input order
pub fn classify_all_faces(faces: &[(Face, HsvImage)], table: &ColorTable) -> Vec<(Face, Vec<ColorMask>)> {
    faces
        .par_iter()
        .map(|(face, hsv)| (*face, color_masks(hsv, table)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::color_space::to_hsv;
    use crate::models::BgrImage;

    fn solid(bgr: [u8; 3]) -> HsvImage {
        to_hsv(&BgrImage::from_fn(6, 6, |_, _| bgr))
    }

    #[test]
    fn test_pure_colors_hit_their_range() {
        let table = ColorTable::default();
        let cases = [
            ([0, 0, 255], "red-low"),
            ([0, 165, 255], "orange"),
            ([0, 255, 255], "yellow"),
            ([0, 255, 0], "green"),
            ([255, 0, 0], "blue"),
            ([255, 255, 255], "white"),
        ];
        for (bgr, name) in cases {
            let masks = color_masks(&solid(bgr), &table);
            for m in &masks {
                let expected = if m.range.name == name { 36 } else { 0 };
                assert_eq!(m.mask.count_set(), expected, "{:?} against {}", bgr, m.range.name);
            }
        }
    }

    #[test]
    fn test_magenta_red_is_high_range() {
        // Hue 172 sits in the upper red band only
        let hsv = HsvImage::from_fn(2, 2, |_, _| [172, 200, 200]);
        let table = ColorTable::default();
        let masks = color_masks(&hsv, &table);
        let hits: Vec<&str> = masks.iter().filter(|m| m.mask.count_set() > 0).map(|m| m.range.name).collect();
        assert_eq!(hits, vec!["red-high"]);
    }

    #[test]
    fn test_dark_pixels_match_nothing() {
        let masks = color_masks(&solid([10, 10, 10]), &ColorTable::default());
        assert!(masks.iter().all(|m| m.mask.count_set() == 0));
    }

    #[test]
    fn test_hue_mask_and_merge() {
        let hsv = HsvImage::from_fn(4, 1, |_, c| [[2, 90, 170, 175][c], 255, 255]);
        let low = hue_mask(&hsv, 0, 3);
        let high = hue_mask(&hsv, 160, 180);
        assert_eq!(low.as_slice(), &[255, 0, 0, 0]);
        let merged = merge_masks(&low, &high).unwrap();
        assert_eq!(merged.as_slice(), &[255, 0, 255, 255]);
        assert!(merge_masks(&low, &Mask::new(3, 1)).is_err());
    }

    #[test]
    fn test_classify_all_faces_keeps_order() {
        let faces = vec![(Face::Left, solid([255, 0, 0])), (Face::Mid, solid([0, 255, 0]))];
        let out = classify_all_faces(&faces, &ColorTable::default());
        assert_eq!(out[0].0, Face::Left);
        assert_eq!(out[1].0, Face::Mid);
        assert_eq!(out[1].1.len(), 7);
    }
}
