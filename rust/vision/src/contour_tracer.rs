// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary follower for binary masks
//!
//! Used on masks coming from the segmentation provider, where the region is
//! already known and only its outline is needed. The outer boundary of the
//! first blob is followed with Moore-neighbour tracing, so one-pixel tips and
//! diagonal steps are walked around instead of ending the walk.

use crate::boundary::{ordered_mask_boundary, DEFAULT_MAX_GAP_SQUARED};
use crate::types::Mask;
use outline_lite_geometry::{douglas_peucker_closed, Point2D};

type Pixel = (i64, i64);

/// 8-neighbourhood clockwise on screen (y grows downwards), starting west
const NEIGHBOURS: [Pixel; 8] = [
    (-1, 0),  // west
    (-1, -1), // north-west
    (0, -1),  // north
    (1, -1),  // north-east
    (1, 0),   // east
    (1, 1),   // south-east
    (0, 1),   // south
    (-1, 1),  // south-west
];

/// Outer boundary of the first foreground blob (raster order), clockwise.
///
/// The walk starts at the first foreground pixel and ends when it is back at
/// the start about to repeat its first step. An isolated pixel yields just that
/// pixel and an empty mask an empty contour. If the walk fails to close within
/// its step budget, the nearest-neighbour ordered boundary is returned instead.
pub fn trace_mask(mask: &Mask) -> Vec<Point2D> {
    let max_steps = 4 * mask.width() as usize * mask.height() as usize + 4;
    trace_mask_with_limit(mask, max_steps)
}

/// Trace a mask and simplify the closed pixel path
pub fn trace_mask_polygon(mask: &Mask, tolerance: f64) -> Vec<Point2D> {
    let contour = trace_mask(mask);
    douglas_peucker_closed(&contour, tolerance)
}

fn trace_mask_with_limit(mask: &Mask, max_steps: usize) -> Vec<Point2D> {
    let Some((sx, sy)) = mask.first_foreground() else {
        return Vec::new();
    };

    match follow_outline(mask, (sx as i64, sy as i64), max_steps) {
        Some(contour) => contour,
        None => {
            tracing::warn!(max_steps, "contour walk did not close, ordering boundary pixels instead");
            ordered_mask_boundary(mask, DEFAULT_MAX_GAP_SQUARED)
        }
    }
}

/// Moore-neighbour walk; `None` when the step budget runs out
fn follow_outline(mask: &Mask, start: Pixel, max_steps: usize) -> Option<Vec<Point2D>> {
    let to_point = |(x, y): Pixel| Point2D::new(x as f64, y as f64);

    let mut contour = vec![to_point(start)];
    let mut current = start;
    // The first pixel in raster order always has background to its west
    let mut backtrack = (start.0 - 1, start.1);
    let mut first_step: Option<Pixel> = None;

    for _ in 0..max_steps {
        let Some((next, behind)) = next_boundary_pixel(mask, current, backtrack) else {
            return Some(contour);
        };

        if current == start && first_step == Some(next) {
            // Drop the repeated start pixel
            contour.pop();
            return Some(contour);
        }
        first_step.get_or_insert(next);

        contour.push(to_point(next));
        backtrack = behind;
        current = next;
    }

    None
}

/// Scan the neighbours of `current` clockwise, starting just after the
/// background pixel `backtrack`. Returns the first foreground neighbour and the
/// background pixel scanned right before it.
fn next_boundary_pixel(mask: &Mask, current: Pixel, backtrack: Pixel) -> Option<(Pixel, Pixel)> {
    let offset = (backtrack.0 - current.0, backtrack.1 - current.1);
    let from = NEIGHBOURS.iter().position(|&n| n == offset)?;

    let mut behind = backtrack;
    for i in 1..=8 {
        let (dx, dy) = NEIGHBOURS[(from + i) % 8];
        let candidate = (current.0 + dx, current.1 + dy);
        if mask.get(candidate.0, candidate.1) {
            return Some((candidate, behind));
        }
        behind = candidate;
    }

    None
}
