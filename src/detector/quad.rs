//! Choosing the four corners that best outline a cube face

use crate::detector::harris::Corner;
use crate::models::Point;
use crate::utils::geometry::{angle_deviation, aspect_ratio, order_corners, polygon_area};
use tracing::{debug, warn};

/// Lexicographic k-subsets of a slice, generated lazily
///
/// `restart` rewinds to the first subset without reallocating.
pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    done: bool,
}

impl<'a, T: Copy> Combinations<'a, T> {
    /// Subsets of size `k` over `items`
    pub fn new(items: &'a [T], k: usize) -> Self {
        let mut combos = Self {
            items,
            indices: (0..k).collect(),
            done: false,
        };
        combos.restart();
        combos
    }

    /// Rewind to the first subset
    pub fn restart(&mut self) {
        let k = self.indices.len();
        for (i, idx) in self.indices.iter_mut().enumerate() {
            *idx = i;
        }
        self.done = k == 0 || k > self.items.len();
    }

    fn advance(&mut self) {
        let n = self.items.len();
        let k = self.indices.len();
        // Rightmost index that can still move
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < n - k + i) else {
            self.done = true;
            return;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
    }
}

impl<T: Copy> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.items[i]).collect();
        self.advance();
        Some(current)
    }
}

/// Four corners in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    /// Top-left corner
    pub top_left: Point,
    /// Top-right corner
    pub top_right: Point,
    /// Bottom-right corner
    pub bottom_right: Point,
    /// Bottom-left corner
    pub bottom_left: Point,
}

impl Quadrilateral {
    /// Wrap points already ordered `[tl, tr, br, bl]`
    pub fn from_ordered(points: [Point; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = points;
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners as `[tl, tr, br, bl]`
    pub fn corners(&self) -> [Point; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Enclosed area
    pub fn area(&self) -> f64 {
        polygon_area(&self.corners())
    }

    /// Squareness penalty: `|1 - aspect| + angle deviation / 100`, lower is better
    pub fn score(&self) -> f64 {
        let corners = self.corners();
        (1.0 - aspect_ratio(&corners)).abs() + angle_deviation(&corners) / 100.0
    }
}

/// Outcome of quadrilateral selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A usable face outline
    Quad(Quadrilateral),
    /// Too few candidates, or none enclosing any area; the raw candidates are returned
    Degenerate(Vec<Corner>),
}

impl Selection {
    /// The outline, if one was found
    pub fn quad(&self) -> Option<&Quadrilateral> {
        match self {
            Selection::Quad(q) => Some(q),
            Selection::Degenerate(_) => None,
        }
    }
}

/// Pick the face outline among all 4-subsets of the candidates
///
/// Subsets are visited in lexicographic order and a subset replaces the
/// current best only when it is both larger and more square. The walk is
/// therefore order dependent: a large early pick can block a later, more
/// square but smaller quadrilateral.
pub fn select_quadrilateral(candidates: &[Corner]) -> Selection {
    if candidates.len() < 4 {
        warn!(found = candidates.len(), "fewer than four corner candidates");
        return Selection::Degenerate(candidates.to_vec());
    }

    let points: Vec<Point> = candidates.iter().map(Corner::to_point).collect();
    let mut best: Option<Quadrilateral> = None;
    let mut best_area = 0.0;
    let mut best_score = f64::MAX;
    let mut visited = 0usize;

    for subset in Combinations::new(&points, 4) {
        visited += 1;
        let Ok(ordered) = order_corners(&subset) else {
            continue;
        };
        let quad = Quadrilateral::from_ordered(ordered);
        let area = quad.area();
        let score = quad.score();
        if area > best_area && score < best_score {
            best_area = area;
            best_score = score;
            best = Some(quad);
        }
    }

    debug!(candidates = candidates.len(), visited, best_area, best_score, "quadrilateral search finished");

    match best {
        Some(quad) => Selection::Quad(quad),
        None => {
            warn!(found = candidates.len(), "no candidate subset encloses any area");
            Selection::Degenerate(candidates.to_vec())
        }
    }
}
