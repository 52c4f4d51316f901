//! Folding color masks into facelet letters

use crate::classify::mask::{ColorMask, merge_masks};
use crate::error::{Result, ScanError};
use crate::models::{CubeString, Face, FaceString, Mask};
use tracing::{debug, warn};

/// Write `letter` into every cell of the 3x3 grid the mask mostly covers
///
/// The cell side is `floor(width / 3)`; trailing rows and columns that do
/// not fill a whole cell are ignored. A cell is claimed when its set pixels
/// strictly outnumber the unset ones.
pub fn encode_mask(mask: &Mask, letter: char, face: &mut FaceString) {
    let cell = mask.width() / 3;
    if cell == 0 || mask.height() < cell {
        return;
    }

    let mut top = 0;
    while top < mask.height() - cell + 1 {
        let mut left = 0;
        while left < mask.width() - cell + 1 {
            let (row, col) = (top / cell, left / cell);
            if row < 3 && col < 3 {
                let mut set = 0usize;
                for y in top..top + cell {
                    set += mask.row(y)[left..left + cell].iter().filter(|&&v| v == 255).count();
                }
                let unset = cell * cell - set;
                if set > unset {
                    face.set(row, col, letter);
                }
            }
            left += cell;
        }
        top += cell;
    }
}

/// Encode all masks of one face, later masks overwriting earlier ones
///
/// With `merge_split_ranges` set, masks sharing a letter are unioned and
/// encoded once at the position of the first of them.
pub fn encode_face(masks: &[ColorMask], merge_split_ranges: bool) -> Result<FaceString> {
    let mut face = FaceString::unknown();

    if !merge_split_ranges {
        for m in masks {
            encode_mask(&m.mask, m.letter(), &mut face);
        }
        return Ok(face);
    }

    let mut merged: Vec<(char, Mask)> = Vec::with_capacity(masks.len());
    for m in masks {
        match merged.iter_mut().find(|(letter, _)| *letter == m.letter()) {
            Some((_, mask)) => *mask = merge_masks(mask, &m.mask)?,
            None => merged.push((m.letter(), m.mask.clone())),
        }
    }
    for (letter, mask) in &merged {
        encode_mask(mask, *letter, &mut face);
    }
    Ok(face)
}

/// Place each face's letters at `index * 9` of the cube string
///
/// Every face must be present exactly once; later duplicates win.
pub fn assemble_cube_string(faces: &[(Face, FaceString)]) -> Result<CubeString> {
    let missing: Vec<Face> = Face::ALL
        .iter()
        .copied()
        .filter(|f| !faces.iter().any(|(face, _)| face == f))
        .collect();
    if !missing.is_empty() {
        return Err(ScanError::MissingFaces(missing));
    }

    let mut cube = CubeString::new();
    for (face, letters) in faces {
        cube.insert(*face, letters);
    }
    if cube.has_unknown() {
        warn!(cube = %cube, "cube string has unclassified facelets");
    } else {
        debug!(cube = %cube, "cube string assembled");
    }
    Ok(cube)
}
