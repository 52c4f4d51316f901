//! Polygon measurements used to rank candidate cube faces
use crate::error::{Result, ScanError};
use crate::models::Point;

/// Calculate distance between two points
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    p1.distance(p2)
}

/// Angle at `p2` between `p1` and `p3`, in degrees, via the cosine rule
///
/// Degenerate triangles (coincident points) yield NaN.
pub fn angle(p1: &Point, p2: &Point, p3: &Point) -> f64 {
    let a = distance(p1, p2);
    let b = distance(p2, p3);
    let c = distance(p1, p3);

    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Absolute shoelace area of a polygon given in boundary order
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice += p.x * q.y - p.y * q.x;
    }
    (twice / 2.0).abs()
}

/// Mean of the two "width" sides over the mean of the two "height" sides
pub fn aspect_ratio(quad: &[Point; 4]) -> f64 {
    let width = (distance(&quad[0], &quad[1]) + distance(&quad[2], &quad[3])) / 2.0;
    let height = (distance(&quad[1], &quad[2]) + distance(&quad[3], &quad[0])) / 2.0;
    width / height
}

/// Sum over the four corners of `|90 - corner angle|`
pub fn angle_deviation(quad: &[Point; 4]) -> f64 {
    (0..4)
        .map(|i| (90.0 - angle(&quad[i], &quad[(i + 1) % 4], &quad[(i + 2) % 4])).abs())
        .sum()
}

/// Arithmetic mean of the points
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// First point (in input order) with the smallest or largest key
fn first_extreme(points: &[Point], largest: bool, key: impl Fn(&Point) -> f64) -> Point {
    let mut best = points[0];
    let mut best_key = key(&best);
    for p in &points[1..] {
        let k = key(p);
        if (largest && k > best_key) || (!largest && k < best_key) {
            best = *p;
            best_key = k;
        }
    }
    best
}

/// Canonical `[top_left, top_right, bottom_right, bottom_left]` order
///
/// Each corner is picked by polar angle around the centroid: the left
/// corners by angle measured from +x, the right corners by angle measured
/// from -x. Ties go to the earlier point.
pub fn order_corners(points: &[Point]) -> Result<[Point; 4]> {
    if points.len() != 4 {
        return Err(ScanError::PointCount {
            expected: 4,
            found: points.len(),
        });
    }
    let c = centroid(points);
    let from_left = |p: &Point| (p.y - c.y).atan2(p.x - c.x);
    let from_right = |p: &Point| (p.y - c.y).atan2(c.x - p.x);

    let top_left = first_extreme(points, false, from_left);
    let bottom_left = first_extreme(points, true, from_left);
    let top_right = first_extreme(points, false, from_right);
    let bottom_right = first_extreme(points, true, from_right);

    Ok([top_left, top_right, bottom_right, bottom_left])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((distance(&p1, &p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_angle() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(1.0, 0.0);
        let p3 = Point::new(1.0, 1.0);
        assert!((angle(&p1, &p2, &p3) - 90.0).abs() < 1e-9);

        let p3 = Point::new(2.0, 0.0);
        assert!((angle(&p1, &p2, &p3) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_square_measures() {
        let q = square(10.0);
        assert!((polygon_area(&q) - 100.0).abs() < 1e-9);
        assert!((aspect_ratio(&q) - 1.0).abs() < 1e-12);
        assert!(angle_deviation(&q) < 1e-6);
    }

    #[test]
    fn test_rectangle_measures() {
        let q = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!((aspect_ratio(&q) - 2.0).abs() < 1e-12);
        assert!((polygon_area(&q) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_is_orientation_independent() {
        let mut q = square(4.0);
        q.reverse();
        assert!((polygon_area(&q) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_corners_from_shuffled_input() {
        let tl = Point::new(10.0, 12.0);
        let tr = Point::new(90.0, 8.0);
        let br = Point::new(95.0, 88.0);
        let bl = Point::new(6.0, 92.0);
        let ordered = order_corners(&[br, tl, bl, tr]).unwrap();
        assert_eq!(ordered, [tl, tr, br, bl]);
    }

    #[test]
    fn test_order_corners_requires_four() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        match order_corners(&pts) {
            Err(ScanError::PointCount { expected, found }) => assert_eq!((expected, found), (4, 3)),
            other => panic!("expected point count error, got {:?}", other),
        }
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&square(2.0)), Point::new(1.0, 1.0));
        assert_eq!(centroid(&[]), Point::default());
    }
}
