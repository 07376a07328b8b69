// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Miter-style polygon offsetting for tool clearance
//!
//! Each vertex moves along the average of its two adjacent edge normals, scaled
//! so that both adjacent edges end up exactly `clearance` away from where they
//! started. Self-intersections that appear at concave vertices when the
//! clearance exceeds the local feature size are left in place.

use crate::point::{signed_area, Point2D};
use nalgebra::Vector2;

/// Edges shorter than this are treated as zero length
const MIN_EDGE_LENGTH: f64 = 1e-9;

/// Grow (`clearance > 0`) or shrink (`clearance < 0`) a closed polygon.
///
/// Works for either winding. Polygons with fewer than three points are returned
/// unchanged, as is any vertex adjacent to a zero-length edge.
pub fn offset_polygon(points: &[Point2D], clearance: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 || clearance == 0.0 {
        return points.to_vec();
    }

    // Outward normal is the right-hand normal for positive area, left-hand otherwise
    let outward_sign = if signed_area(points) >= 0.0 { 1.0 } else { -1.0 };

    let edge_normal = |from: &Point2D, to: &Point2D| -> Option<Vector2<f64>> {
        let edge = from.vector_to(to);
        let length = edge.norm();
        if length < MIN_EDGE_LENGTH {
            return None;
        }
        Some(Vector2::new(edge.y, -edge.x) * (outward_sign / length))
    };

    (0..n)
        .map(|i| {
            let prev = &points[(i + n - 1) % n];
            let current = &points[i];
            let next = &points[(i + 1) % n];

            let (Some(n1), Some(n2)) = (edge_normal(prev, current), edge_normal(current, next)) else {
                return *current;
            };

            let averaged = (n1 + n2) * 0.5;
            let magnitude = averaged.norm();
            let displacement = if magnitude < MIN_EDGE_LENGTH {
                // Edges fold back onto each other; push along the incoming normal
                n1 * clearance
            } else {
                averaged * (clearance / (magnitude * magnitude))
            };

            Point2D::new(current.x + displacement.x, current.y + displacement.y)
        })
        .collect()
}
