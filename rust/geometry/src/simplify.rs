// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Douglas-Peucker polyline simplification

use crate::point::{centroid, point_segment_distance, Point2D};

/// Tolerance used for raw traced contours, in pixels
pub const DEFAULT_CONTOUR_TOLERANCE: f64 = 2.0;

/// Douglas-Peucker line simplification algorithm
///
/// Keeps the endpoints and, recursively, every point whose distance to the
/// chord of its sub-sequence exceeds `epsilon`. Sequences of two points or
/// fewer are returned unchanged.
pub fn douglas_peucker(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark_retained(points, 0, points.len() - 1, epsilon, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Douglas-Peucker over a closed ring.
///
/// An open-polyline pass always keeps the first and last vertex, which on a
/// ring are neighbours. The ring is instead anchored on two mutually distant
/// vertices (farthest from the centroid, then farthest from that one) and each
/// of the two chains between them is simplified separately.
pub fn douglas_peucker_closed(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() <= 3 {
        return points.to_vec();
    }
    let Some(center) = centroid(points) else {
        return Vec::new();
    };

    let farthest_from = |origin: &Point2D| {
        points
            .iter()
            .enumerate()
            .fold((0, -1.0), |best, (i, p)| {
                let d = origin.distance_squared_to(p);
                if d > best.1 {
                    (i, d)
                } else {
                    best
                }
            })
            .0
    };

    let a = farthest_from(&center);
    let b = farthest_from(&points[a]);
    if a == b {
        return vec![points[a]];
    }
    let (lo, hi) = (a.min(b), a.max(b));

    let mut result = douglas_peucker(&points[lo..=hi], epsilon);

    let mut wrapped: Vec<Point2D> = points[hi..].to_vec();
    wrapped.extend_from_slice(&points[..=lo]);
    let back = douglas_peucker(&wrapped, epsilon);
    if back.len() > 2 {
        result.extend_from_slice(&back[1..back.len() - 1]);
    }

    result
}

/// Marks retained points between `first` and `last` (exclusive).
///
/// Uses an explicit stack so dense contours cannot overflow the call stack.
fn mark_retained(points: &[Point2D], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    let mut pending = vec![(first, last)];

    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let chord_start = &points[start];
        let chord_end = &points[end];

        let mut max_dist = 0.0;
        let mut max_idx = start;

        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let dist = point_segment_distance(point, chord_start, chord_end);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            keep[max_idx] = true;
            pending.push((start, max_idx));
            pending.push((max_idx, end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_douglas_peucker_straight_line() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.1),
            Point2D::new(2.0, -0.1),
            Point2D::new(3.0, 0.0),
            Point2D::new(4.0, 0.0),
        ];

        let simplified = douglas_peucker(&points, 0.5);

        assert_eq!(simplified, vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0)]);
    }

    #[test]
    fn test_douglas_peucker_keeps_corner() {
        let mut points = Vec::new();
        for i in 0..=10 {
            points.push(Point2D::new(i as f64, 0.0));
        }
        for i in 1..=10 {
            points.push(Point2D::new(10.0, i as f64));
        }

        let simplified = douglas_peucker(&points, 1.0);

        assert_eq!(
            simplified,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_short_sequences_unchanged() {
        let two = vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)];
        assert_eq!(douglas_peucker(&two, 10.0), two);
        assert!(douglas_peucker(&[], 1.0).is_empty());
    }

    #[test]
    fn test_douglas_peucker_idempotent() {
        // Noisy staircase around a triangle
        let points: Vec<Point2D> = (0..60)
            .map(|i| {
                let t = i as f64;
                if i < 30 {
                    Point2D::new(t, (i % 2) as f64 * 0.5)
                } else {
                    Point2D::new(30.0 + (i % 2) as f64 * 0.5, t - 30.0)
                }
            })
            .collect();

        let once = douglas_peucker(&points, DEFAULT_CONTOUR_TOLERANCE);
        let twice = douglas_peucker(&once, DEFAULT_CONTOUR_TOLERANCE);

        assert_eq!(once, twice);
        assert!(once.len() < points.len());
    }

    #[test]
    fn test_closed_ring_drops_both_neighbours_of_start() {
        // Square ring whose first two vertices sit mid-edge
        let ring = vec![
            Point2D::new(50.0, -0.5),
            Point2D::new(100.0, 0.0),
            Point2D::new(100.5, 50.0),
            Point2D::new(100.0, 100.0),
            Point2D::new(50.0, 100.5),
            Point2D::new(0.0, 100.0),
            Point2D::new(-0.5, 50.0),
            Point2D::new(0.0, 0.0),
        ];

        let simplified = douglas_peucker_closed(&ring, 2.0);

        assert_eq!(simplified.len(), 4);
        for corner in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            assert!(simplified.contains(&Point2D::from(corner)), "missing {:?}", corner);
        }
    }

    #[test]
    fn test_coincident_endpoints_use_euclidean_distance() {
        // Closed loop: first == last, so deviation is measured from the start point
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 0.0),
        ];

        let simplified = douglas_peucker(&points, 1.0);

        assert!(simplified.contains(&Point2D::new(10.0, 10.0)));
    }
}
