// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quadrilateral approximation and canonical corner ordering
//!
//! A paper sheet is traced as a dense boundary, hulled, and then reduced here
//! to exactly four corners in top-left, top-right, bottom-right, bottom-left
//! order.
//!
//! The ordering heuristic picks the corner with the smallest `x + y` as top-left
//! and assumes a roughly axis-aligned sheet. Under strong rotation (around 45°)
//! or heavy perspective it can assign the wrong corner as top-left.

use crate::error::{Error, Result};
use crate::point::{centroid, Point2D};
use crate::simplify::douglas_peucker_closed;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Escalating Douglas-Peucker schedule used to collapse a hull to four corners
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuadApproxParams {
    /// First tolerance tried (pixels)
    pub start_tolerance: f64,
    /// Increment between attempts (pixels)
    pub tolerance_step: f64,
    /// Largest tolerance tried (pixels)
    pub max_tolerance: f64,
}

impl Default for QuadApproxParams {
    fn default() -> Self {
        Self {
            start_tolerance: 5.0,
            tolerance_step: 5.0,
            max_tolerance: 100.0,
        }
    }
}

impl QuadApproxParams {
    /// Reject schedules that would never try a tolerance or never advance
    pub fn validate(&self) -> Result<()> {
        if self.start_tolerance <= 0.0 || self.tolerance_step <= 0.0 {
            return Err(Error::InvalidParameter(
                "quadrilateral tolerances must be positive".to_string(),
            ));
        }
        if self.start_tolerance > self.max_tolerance {
            return Err(Error::InvalidParameter(format!(
                "start tolerance {} exceeds max tolerance {}",
                self.start_tolerance, self.max_tolerance
            )));
        }
        Ok(())
    }
}

/// Four corners in canonical TL -> TR -> BR -> BL order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quadrilateral {
    corners: [Point2D; 4],
}

impl Quadrilateral {
    /// Order four arbitrary points into a quadrilateral
    pub fn from_points(points: &[Point2D]) -> Result<Self> {
        if points.len() != 4 {
            return Err(Error::DegeneratePolygon(format!(
                "quadrilateral needs exactly 4 corners, got {}",
                points.len()
            )));
        }

        let ordered = order_corners(points);
        Ok(Self {
            corners: [ordered[0], ordered[1], ordered[2], ordered[3]],
        })
    }

    pub fn corners(&self) -> &[Point2D; 4] {
        &self.corners
    }

    pub fn top_left(&self) -> Point2D {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.corners[3]
    }

    pub fn top_length(&self) -> f64 {
        self.corners[0].distance_to(&self.corners[1])
    }

    pub fn right_length(&self) -> f64 {
        self.corners[1].distance_to(&self.corners[2])
    }

    pub fn bottom_length(&self) -> f64 {
        self.corners[2].distance_to(&self.corners[3])
    }

    pub fn left_length(&self) -> f64 {
        self.corners[3].distance_to(&self.corners[0])
    }

    pub fn to_vec(&self) -> Vec<Point2D> {
        self.corners.to_vec()
    }
}

/// Reduce a convex hull to (at most) four canonically ordered corners.
///
/// Hulls of four points or fewer are only reordered. Larger hulls are
/// simplified with an escalating tolerance; when that does not land on exactly
/// four points, the axis-extreme points are used instead.
pub fn approximate_quadrilateral(hull: &[Point2D], params: &QuadApproxParams) -> Vec<Point2D> {
    if hull.len() <= 4 {
        return order_corners(hull);
    }

    let mut simplified = hull.to_vec();
    let mut tolerance = params.start_tolerance;
    while tolerance <= params.max_tolerance {
        simplified = douglas_peucker_closed(hull, tolerance);
        if simplified.len() <= 4 {
            break;
        }
        if params.tolerance_step <= 0.0 {
            break;
        }
        tolerance += params.tolerance_step;
    }

    if simplified.len() == 4 {
        return order_corners(&simplified);
    }

    tracing::debug!(
        hull = hull.len(),
        simplified = simplified.len(),
        "simplification did not reach 4 corners, using extreme points"
    );
    order_corners(&select_extreme_points(hull))
}

/// Pick up to four well-spread points: the axis extremes first, then greedily
/// the point farthest from everything already chosen.
pub fn select_extreme_points(points: &[Point2D]) -> SmallVec<[Point2D; 4]> {
    let mut selected: SmallVec<[Point2D; 4]> = SmallVec::new();
    if points.is_empty() {
        return selected;
    }

    let by = |key: fn(&Point2D) -> f64, pick_max: bool| -> Point2D {
        let cmp = |a: &&Point2D, b: &&Point2D| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
        let found = if pick_max {
            points.iter().max_by(cmp)
        } else {
            points.iter().min_by(cmp)
        };
        *found.unwrap_or(&points[0])
    };

    let extremes = [
        by(|p| p.x, false),
        by(|p| p.x, true),
        by(|p| p.y, false),
        by(|p| p.y, true),
    ];

    let mut seen: FxHashSet<(u64, u64)> = FxHashSet::default();
    for p in extremes {
        if seen.insert(point_key(&p)) {
            selected.push(p);
        }
    }

    while selected.len() < 4 {
        let candidate = points
            .iter()
            .filter(|p| !seen.contains(&point_key(p)))
            .map(|p| {
                let nearest = selected
                    .iter()
                    .map(|s| s.distance_squared_to(p))
                    .fold(f64::INFINITY, f64::min);
                (p, nearest)
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        match candidate {
            Some((p, _)) => {
                seen.insert(point_key(p));
                selected.push(*p);
            }
            None => break,
        }
    }

    selected
}

fn point_key(p: &Point2D) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

/// Order corners as TL -> TR -> BR -> BL.
///
/// Sorts by polar angle around the centroid (clockwise on screen, where y grows
/// downwards), then rotates so the point with minimum `x + y` comes first.
/// Ordering an already ordered set returns it unchanged.
pub fn order_corners(points: &[Point2D]) -> Vec<Point2D> {
    let Some(center) = centroid(points) else {
        return Vec::new();
    };

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.partial_cmp(&angle_b).unwrap_or(Ordering::Equal)
    });

    let top_left = sorted
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.x + a.y).partial_cmp(&(b.x + b.y)).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);
    sorted.rotate_left(top_left);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::convex_hull;

    fn rect() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(100.0, 50.0),
            Point2D::new(0.0, 50.0),
        ]
    }

    #[test]
    fn test_order_axis_aligned_rectangle() {
        let scrambled = vec![rect()[2], rect()[0], rect()[3], rect()[1]];

        assert_eq!(order_corners(&scrambled), rect());
    }

    #[test]
    fn test_order_idempotent() {
        let skewed = vec![
            Point2D::new(12.0, 8.0),
            Point2D::new(410.0, 22.0),
            Point2D::new(398.0, 530.0),
            Point2D::new(5.0, 515.0),
        ];

        let once = order_corners(&skewed);
        let twice = order_corners(&once);

        assert_eq!(once, twice);
        assert_eq!(once[0], Point2D::new(12.0, 8.0));
        assert_eq!(once[2], Point2D::new(398.0, 530.0));
    }

    #[test]
    fn test_quadrilateral_accessors() {
        let quad = Quadrilateral::from_points(&rect()).unwrap();

        assert_eq!(quad.top_left(), Point2D::new(0.0, 0.0));
        assert_eq!(quad.bottom_right(), Point2D::new(100.0, 50.0));
        assert_eq!(quad.top_length(), 100.0);
        assert_eq!(quad.left_length(), 50.0);
        assert!(Quadrilateral::from_points(&rect()[..3]).is_err());
    }

    #[test]
    fn test_approximate_bulging_rectangle_hull() {
        // Paper edges bow outwards slightly between the true corners
        let mut outline = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(200.0, 0.0),
            Point2D::new(200.0, 120.0),
            Point2D::new(0.0, 120.0),
        ];
        for i in 1..10 {
            let t = i as f64 / 10.0;
            let bow = 4.0 * t * (1.0 - t);
            outline.push(Point2D::new(200.0 * t, -bow));
            outline.push(Point2D::new(200.0 * t, 120.0 + bow));
            outline.push(Point2D::new(-bow, 120.0 * t));
            outline.push(Point2D::new(200.0 + bow, 120.0 * t));
        }
        let hull = convex_hull(&outline);
        assert!(hull.len() > 4);

        let corners = approximate_quadrilateral(&hull, &QuadApproxParams::default());

        assert_eq!(corners, rect_200x120());
    }

    fn rect_200x120() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(200.0, 0.0),
            Point2D::new(200.0, 120.0),
            Point2D::new(0.0, 120.0),
        ]
    }

    #[test]
    fn test_params_validation() {
        assert!(QuadApproxParams::default().validate().is_ok());
        let stalled = QuadApproxParams {
            tolerance_step: 0.0,
            ..Default::default()
        };
        assert!(matches!(stalled.validate(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_short_hull_only_reordered() {
        let tri = vec![
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
        ];

        let corners = approximate_quadrilateral(&tri, &QuadApproxParams::default());

        assert_eq!(corners.len(), 3);
        assert_eq!(corners[0], Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_extreme_points_fill_to_four() {
        // Diamond: four distinct axis extremes
        let diamond = vec![
            Point2D::new(50.0, 0.0),
            Point2D::new(100.0, 50.0),
            Point2D::new(50.0, 100.0),
            Point2D::new(0.0, 50.0),
            Point2D::new(60.0, 40.0),
        ];
        assert_eq!(select_extreme_points(&diamond).len(), 4);

        // Min-x and min-y coincide, so the greedy fill adds a fourth point
        let corner_heavy = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 10.0),
            Point2D::new(10.0, 100.0),
            Point2D::new(60.0, 60.0),
            Point2D::new(20.0, 20.0),
        ];
        let selected = select_extreme_points(&corner_heavy);
        assert_eq!(selected.len(), 4);
        assert!(selected.contains(&Point2D::new(60.0, 60.0)));
    }

    #[test]
    fn test_extreme_points_exhausted_input() {
        let two = vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)];
        assert_eq!(select_extreme_points(&two).len(), 2);
    }

    #[test]
    fn test_round_hull_uses_extreme_points() {
        let circle: Vec<Point2D> = (0..360)
            .map(|i| {
                let angle = (i as f64).to_radians();
                Point2D::new(1000.0 * angle.cos(), 1000.0 * angle.sin())
            })
            .collect();
        let hull = convex_hull(&circle);
        let params = QuadApproxParams::default();
        // Even the largest tolerance leaves an octagon-like ring
        assert!(douglas_peucker_closed(&hull, params.max_tolerance).len() > 4);

        let corners = approximate_quadrilateral(&hull, &params);

        assert_eq!(corners.len(), 4);
        let expected = [
            Point2D::new(1000.0, 0.0),
            Point2D::new(0.0, 1000.0),
            Point2D::new(-1000.0, 0.0),
            Point2D::new(0.0, -1000.0),
        ];
        for target in expected {
            let hits = corners
                .iter()
                .filter(|c| (c.x - target.x).abs() < 1e-6 && (c.y - target.y).abs() < 1e-6)
                .count();
            assert_eq!(hits, 1, "{:?} in {:?}", target, corners);
        }
    }
}
