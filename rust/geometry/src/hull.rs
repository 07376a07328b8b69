// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Convex hull via Graham scan

use crate::point::{cross, Point2D};
use std::cmp::Ordering;

/// Sample limit used when hulling a traced paper boundary
pub const PAPER_HULL_SAMPLE_LIMIT: usize = 1000;

/// Sample limit used when hulling generic outlines
pub const OUTLINE_HULL_SAMPLE_LIMIT: usize = 2000;

/// Compute the convex hull of an unordered point set.
///
/// The pivot is the point with minimum y (ties: minimum x). Remaining points are
/// sorted by polar angle around the pivot, ties broken by distance, and the scan
/// pops while the last turn is not strictly counter-clockwise. Fewer than three
/// points are returned unchanged.
pub fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let pivot_idx = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    let pivot = points[pivot_idx];

    let mut rest: Vec<Point2D> = points
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != pivot_idx)
        .map(|(_, p)| *p)
        .collect();

    rest.sort_by(|a, b| {
        let angle_a = (a.y - pivot.y).atan2(a.x - pivot.x);
        let angle_b = (b.y - pivot.y).atan2(b.x - pivot.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                pivot
                    .distance_squared_to(a)
                    .partial_cmp(&pivot.distance_squared_to(b))
                    .unwrap_or(Ordering::Equal)
            })
    });

    let mut hull: Vec<Point2D> = Vec::with_capacity(rest.len() + 1);
    hull.push(pivot);

    for point in rest {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], &point) <= 0.0 {
            hull.pop();
        }
        // A lone pivot duplicate has zero turn and would never be popped
        if hull.len() == 1 && hull[0] == point {
            continue;
        }
        hull.push(point);
    }

    hull
}

/// Deterministically thin a point set to at most `max_points` by fixed stride.
pub fn downsample_stride(points: &[Point2D], max_points: usize) -> Vec<Point2D> {
    if max_points == 0 || points.len() <= max_points {
        return points.to_vec();
    }

    let stride = points.len().div_ceil(max_points);
    points.iter().step_by(stride).copied().collect()
}

/// Convex hull with fixed-stride down-sampling of large inputs.
///
/// Inputs larger than `max_points` lose precision: hull vertices that fall
/// between samples are not considered.
pub fn convex_hull_sampled(points: &[Point2D], max_points: usize) -> Vec<Point2D> {
    if points.len() > max_points {
        let sampled = downsample_stride(points, max_points);
        tracing::debug!(
            input = points.len(),
            sampled = sampled.len(),
            "down-sampling hull input"
        );
        return convex_hull(&sampled);
    }
    convex_hull(points)
}
