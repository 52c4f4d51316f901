//! Cube face detection modules
//!
//! Locating a face in a photo happens in three steps:
//! - Harris corner detection on the Canny edge map
//! - Quadrilateral selection among the corner candidates
//! - Perspective correction of the chosen outline to an upright square

/// Harris corner response, thresholding and local-maximum filtering
pub mod harris;
/// Projective transform estimation, warping and resizing
pub mod perspective;
/// Four-corner subset search and canonical corner order
pub mod quad;

pub use harris::{Corner, HarrisDetector};
pub use perspective::{ProjectiveMatrix, extract_face};
pub use quad::{Quadrilateral, Selection, select_quadrilateral};
