//! Sticker color classification
//!
//! A rectified face is converted to HSV, one binary mask is produced per
//! color range, and every mask is folded into the 3x3 facelet grid.

/// Facelet grid encoding and cube string assembly
pub mod encoder;
/// Per-range HSV masks
pub mod mask;

pub use encoder::{assemble_cube_string, encode_face, encode_mask};
pub use mask::{ColorMask, classify_all_faces, color_mask, color_masks, hue_mask, merge_masks};
