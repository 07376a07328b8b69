// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point and polygon primitives shared by every stage of the pipeline

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A 2D point in pixel (or mask, or millimetre) space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    /// Vector from `self` to `other`
    pub fn vector_to(&self, other: &Point2D) -> Vector2<f64> {
        Vector2::new(other.x - self.x, other.y - self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Z component of `(a - o) x (b - o)`.
///
/// Positive for a counter-clockwise turn `o -> a -> b` in a y-up frame.
#[inline]
pub fn cross(o: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Distance from `point` to the segment `start..end`.
///
/// Degrades to the distance to `start` when the segment has zero length.
pub fn point_segment_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-12 {
        return point.distance_to(start);
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq).clamp(0.0, 1.0);
    let projected = Point2D::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&projected)
}

/// Signed area using the shoelace formula (positive when counter-clockwise in a y-up frame)
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    area / 2.0
}

/// Unsigned polygon area
pub fn polygon_area(points: &[Point2D]) -> f64 {
    signed_area(points).abs()
}

/// Closed perimeter length (includes the closing edge for 3+ points)
pub fn perimeter(points: &[Point2D]) -> f64 {
    match points.len() {
        0 | 1 => 0.0,
        2 => points[0].distance_to(&points[1]),
        n => (0..n)
            .map(|i| points[i].distance_to(&points[(i + 1) % n]))
            .sum(),
    }
}

/// Arithmetic mean of the vertices
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2D::new(sx / n, sy / n))
}

/// Axis-aligned bounds of a point set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Uniformly or per-axis scale every point about the origin
pub fn scale_points(points: &[Point2D], sx: f64, sy: f64) -> Vec<Point2D> {
    points.iter().map(|p| Point2D::new(p.x * sx, p.y * sy)).collect()
}

pub fn translate_points(points: &[Point2D], dx: f64, dy: f64) -> Vec<Point2D> {
    points.iter().map(|p| Point2D::new(p.x + dx, p.y + dy)).collect()
}
