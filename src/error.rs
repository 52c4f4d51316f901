use crate::models::Face;
use thiserror::Error;

/// Every failure the scanner can report
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum ScanError {
    #[error("Matrix is singular: zero pivot at row {row}")]
    SingularMatrix { row: usize },

    #[error("Matrix dimensions do not match: left has {left_cols} columns, right has {right_rows} rows")]
    DimensionMismatch { left_cols: usize, right_rows: usize },

    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Expected {expected} points, found {found}")]
    PointCount { expected: usize, found: usize },

    #[error("Not enough corners on face {face}: found {found}, need 4")]
    NotEnoughCorners { face: Face, found: usize },

    #[error("Missing faces: {}", format_faces(.0))]
    MissingFaces(Vec<Face>),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Buffer of {len} elements does not fit {width}x{height}x{channels}")]
    BufferSize {
        len: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Unknown face: {0}")]
    UnknownFace(String),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Scan worker thread panicked")]
    WorkerPanicked,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_faces(faces: &[Face]) -> String {
    faces.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_faces_message_lists_names() {
        let err = ScanError::MissingFaces(vec![Face::Top, Face::Left]);
        assert_eq!(err.to_string(), "Missing faces: top, left");
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            std::fs::read("/definitely/not/here/cube.png")?;
            Ok(())
        }
        assert!(matches!(open(), Err(ScanError::Io(_))));
    }
}
