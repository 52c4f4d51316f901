//! Sub-pixel image coordinates

/// Image position, `x` along columns and `y` along rows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Column coordinate
    pub x: f64,
    /// Row coordinate
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Center of pixel `(col, row)` in integer coordinates
    pub fn from_pixel(col: usize, row: usize) -> Self {
        Self::new(col as f64, row as f64)
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Nearest pixel, `None` when outside a `width x height` grid
    pub fn to_pixel(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        let (col, row) = (self.x.round(), self.y.round());
        if col < 0.0 || row < 0.0 || col >= width as f64 || row >= height as f64 {
            return None;
        }
        Some((col as usize, row as usize))
    }
}
