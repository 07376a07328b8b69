// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary extraction and nearest-neighbour ordering

use crate::types::{Mask, Region};
use outline_lite_geometry::Point2D;

/// Squared distance beyond which the ordering walk stops (~10 px)
pub const DEFAULT_MAX_GAP_SQUARED: f64 = 100.0;

/// Edge pixels of a mask in raster order.
///
/// A pixel is on the boundary when it is foreground and at least one of its
/// 4-neighbours is background or outside the mask.
pub fn extract_boundary(mask: &Mask) -> Vec<Point2D> {
    let mut boundary = Vec::new();
    for y in 0..mask.height() as i64 {
        for x in 0..mask.width() as i64 {
            if mask.is_edge(x, y) {
                boundary.push(Point2D::new(x as f64, y as f64));
            }
        }
    }
    boundary
}

/// Edge pixels of a segmented region in raster order
pub fn region_boundary(region: &Region) -> Vec<Point2D> {
    if region.is_empty() {
        return Vec::new();
    }
    extract_boundary(&region.to_mask())
}

/// Chain boundary pixels into a walk by repeatedly stepping to the nearest
/// unused pixel.
///
/// Starts at the first pixel (raster order) and stops as soon as the nearest
/// remaining candidate is farther than `max_gap_squared`, so pixels beyond a
/// large gap are dropped rather than joined by a long spurious edge. Fewer than
/// three pixels are returned as-is.
pub fn order_boundary(points: &[Point2D], max_gap_squared: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut used = vec![false; points.len()];
    let mut ordered = Vec::with_capacity(points.len());

    let mut current = 0;
    used[0] = true;
    ordered.push(points[0]);

    loop {
        let here = points[current];
        let mut nearest: Option<(usize, f64)> = None;

        for (i, candidate) in points.iter().enumerate() {
            if used[i] {
                continue;
            }
            let d = here.distance_squared_to(candidate);
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((i, d));
            }
        }

        match nearest {
            Some((i, d)) if d <= max_gap_squared => {
                used[i] = true;
                ordered.push(points[i]);
                current = i;
            }
            _ => break,
        }
    }

    if ordered.len() < points.len() {
        tracing::debug!(
            ordered = ordered.len(),
            total = points.len(),
            "boundary walk stopped at a gap"
        );
    }

    ordered
}

/// Extract and order the boundary of a mask in one step
pub fn ordered_mask_boundary(mask: &Mask, max_gap_squared: f64) -> Vec<Point2D> {
    order_boundary(&extract_boundary(mask), max_gap_squared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_mask(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Mask {
        let mut bits = vec![false; (w * h) as usize];
        for y in y0..y1 {
            for x in x0..x1 {
                bits[(y * w + x) as usize] = true;
            }
        }
        Mask::from_bits(w, h, bits).unwrap()
    }

    #[test]
    fn test_boundary_of_block() {
        let mask = block_mask(10, 10, 2, 2, 7, 6);

        let boundary = extract_boundary(&mask);

        // 5x4 block: perimeter pixels = 5*4 - 3*2
        assert_eq!(boundary.len(), 14);
        assert_eq!(boundary[0], Point2D::new(2.0, 2.0));
        assert!(!boundary.contains(&Point2D::new(4.0, 4.0)));
    }

    #[test]
    fn test_mask_touching_border_counts_out_of_bounds() {
        let mask = block_mask(4, 4, 0, 0, 4, 4);

        let boundary = extract_boundary(&mask);

        assert_eq!(boundary.len(), 12);
    }

    #[test]
    fn test_order_walks_perimeter() {
        let mask = block_mask(20, 20, 3, 3, 13, 9);
        let boundary = extract_boundary(&mask);

        let ordered = order_boundary(&boundary, DEFAULT_MAX_GAP_SQUARED);

        assert_eq!(ordered.len(), boundary.len());
        assert_eq!(ordered[0], Point2D::new(3.0, 3.0));
        for pair in ordered.windows(2) {
            assert!(pair[0].distance_squared_to(&pair[1]) <= 2.0, "{:?}", pair);
        }
    }

    #[test]
    fn test_order_stops_at_large_gap() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(50.0, 50.0),
        ];

        let ordered = order_boundary(&points, DEFAULT_MAX_GAP_SQUARED);

        assert_eq!(ordered.len(), 3);
    }

    #[test]
    fn test_short_boundary_unordered() {
        let points = vec![Point2D::new(5.0, 5.0), Point2D::new(0.0, 0.0)];
        assert_eq!(order_boundary(&points, DEFAULT_MAX_GAP_SQUARED), points);
    }

    #[test]
    fn test_region_boundary_empty() {
        assert!(region_boundary(&Region::empty(10, 10)).is_empty());
    }
}
