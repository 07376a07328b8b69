// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seeded region segmentation
//!
//! Two flavours of 4-connected flood fill:
//! - color similarity to a clicked seed pixel, used to grab an object
//! - brightness above an adaptive percentile threshold, used to find the
//!   largest bright component (the sheet of paper)

use crate::image_ops::{brightness, brightness_percentile, color_distance};
use crate::types::{PixelBuffer, Region};
use outline_lite_geometry::Point2D;

/// Percentile of the brightness distribution used as the paper threshold
pub const PAPER_BRIGHTNESS_PERCENTILE: f64 = 0.70;

/// Flood fill from `seed`, accepting pixels whose RGB distance to the seed
/// pixel is strictly below `threshold`.
///
/// A seed outside the buffer yields an empty region.
pub fn flood_fill_color(buffer: &PixelBuffer, seed: Point2D, threshold: f64) -> Region {
    let width = buffer.width();
    let height = buffer.height();

    let sx = seed.x.floor() as i64;
    let sy = seed.y.floor() as i64;
    if !seed.x.is_finite() || !seed.y.is_finite() || !buffer.in_bounds(sx, sy) {
        tracing::debug!(x = seed.x, y = seed.y, "seed outside buffer, empty region");
        return Region::empty(width, height);
    }

    let seed_rgb = buffer.rgb(sx as u32, sy as u32);
    let mut visited = vec![false; buffer.pixel_count()];

    let pixels = flood_fill_where(width, height, (sx as u32, sy as u32), &mut visited, |x, y| {
        color_distance(buffer.rgb(x, y), seed_rgb) < threshold
    });

    Region { width, height, pixels }
}

/// Brightness threshold for paper detection: the given percentile of the
/// image's brightness distribution
pub fn brightness_threshold(buffer: &PixelBuffer, percentile: f64) -> f64 {
    brightness_percentile(buffer, percentile)
}

/// Largest 4-connected component of pixels at or above the adaptive
/// brightness threshold.
pub fn largest_bright_region(buffer: &PixelBuffer, percentile: f64) -> Region {
    let width = buffer.width();
    let height = buffer.height();
    if buffer.pixel_count() == 0 {
        return Region::empty(width, height);
    }

    let threshold = brightness_threshold(buffer, percentile);
    let is_bright = |x: u32, y: u32| brightness(buffer.rgb(x, y)) >= threshold;

    let mut visited = vec![false; buffer.pixel_count()];
    let mut best: Vec<(u32, u32)> = Vec::new();
    let mut components = 0usize;

    for y in 0..height {
        for x in 0..width {
            let idx = y as usize * width as usize + x as usize;
            if visited[idx] || !is_bright(x, y) {
                continue;
            }

            let component = flood_fill_where(width, height, (x, y), &mut visited, is_bright);
            components += 1;
            if component.len() > best.len() {
                best = component;
            }
        }
    }

    tracing::debug!(
        threshold,
        components,
        largest = best.len(),
        "bright region search"
    );

    Region {
        width,
        height,
        pixels: best,
    }
}

/// 4-connected flood fill over a `width` x `height` grid.
///
/// `visited` is shared so callers can run several fills over one bitmap.
/// Pixels are marked when pushed, so each is examined at most once; the
/// iteration cap of `width * height` only guards against logic errors.
fn flood_fill_where(
    width: u32,
    height: u32,
    start: (u32, u32),
    visited: &mut [bool],
    accept: impl Fn(u32, u32) -> bool,
) -> Vec<(u32, u32)> {
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let max_iterations = width as usize * height as usize;

    let mut pixels = Vec::new();
    if !accept(start.0, start.1) {
        return pixels;
    }

    let mut stack = vec![start];
    visited[index(start.0, start.1)] = true;
    let mut iterations = 0usize;

    while let Some((x, y)) = stack.pop() {
        iterations += 1;
        if iterations > max_iterations {
            tracing::warn!(max_iterations, "flood fill hit iteration cap");
            break;
        }

        pixels.push((x, y));

        let mut visit = |nx: u32, ny: u32, stack: &mut Vec<(u32, u32)>| {
            let idx = index(nx, ny);
            if !visited[idx] && accept(nx, ny) {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        };

        if x > 0 {
            visit(x - 1, y, &mut stack);
        }
        if x + 1 < width {
            visit(x + 1, y, &mut stack);
        }
        if y > 0 {
            visit(x, y - 1, &mut stack);
        }
        if y + 1 < height {
            visit(x, y + 1, &mut stack);
        }
    }

    pixels
}
