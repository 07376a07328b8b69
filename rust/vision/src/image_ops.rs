// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel-level helpers: color distance, brightness statistics, mask resampling

use crate::types::{Mask, PixelBuffer};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_polygon_mut};
use imageproc::point::Point;
use outline_lite_geometry::Point2D;

/// Euclidean distance between two RGB samples on the 0-255 scale
#[inline]
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Mean of the normalized RGB channels (0.0 - 1.0)
#[inline]
pub fn brightness(rgb: [u8; 3]) -> f64 {
    (rgb[0] as f64 + rgb[1] as f64 + rgb[2] as f64) / (3.0 * 255.0)
}

/// Brightness value at the given percentile (0.0 - 1.0) of the image.
///
/// Uses a histogram over the 766 possible channel sums, so the result is the
/// exact order statistic at index `floor(percentile * n)`.
pub fn brightness_percentile(buffer: &PixelBuffer, percentile: f64) -> f64 {
    let total = buffer.pixel_count();
    if total == 0 {
        return 1.0;
    }

    let mut histogram = [0usize; 766];
    for pixel in buffer.as_image().pixels() {
        let sum = pixel.0[0] as usize + pixel.0[1] as usize + pixel.0[2] as usize;
        histogram[sum] += 1;
    }

    let rank = ((percentile.clamp(0.0, 1.0) * total as f64).floor() as usize).min(total - 1);
    let mut cumulative = 0;
    for (sum, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative > rank {
            return sum as f64 / (3.0 * 255.0);
        }
    }

    1.0
}

/// Resample a mask to `width` x `height` with nearest-neighbour sampling.
///
/// Nearest-neighbour keeps mask edges crisp instead of smearing them into
/// gray levels that would later be re-thresholded.
pub fn resample_mask_nearest(mask: &Mask, width: u32, height: u32) -> Mask {
    if mask.width() == width && mask.height() == height {
        return mask.clone();
    }

    let resized = imageops::resize(&mask.to_gray_image(), width, height, FilterType::Nearest);
    Mask::from_gray(&resized)
}

/// Copy of the photograph with outlines and corner markers drawn on top
pub fn draw_outline_overlay(buffer: &PixelBuffer, outlines: &[Vec<Point2D>], corners: &[Point2D]) -> RgbaImage {
    let mut canvas = buffer.as_image().clone();
    let outline_color = Rgba([255, 0, 0, 255]);
    let corner_color = Rgba([0, 160, 255, 255]);

    for outline in outlines.iter().filter(|o| o.len() >= 3) {
        let mut poly: Vec<Point<f32>> = outline.iter().map(|p| Point::new(p.x as f32, p.y as f32)).collect();
        // imageproc rejects explicitly closed polygons
        if poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() >= 3 {
            draw_hollow_polygon_mut(&mut canvas, &poly, outline_color);
        }
    }

    for corner in corners {
        draw_filled_circle_mut(&mut canvas, (corner.x.round() as i32, corner.y.round() as i32), 6, corner_color);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_distance() {
        assert_relative_eq!(color_distance([0, 0, 0], [3, 4, 0]), 5.0);
        assert_eq!(color_distance([9, 9, 9], [9, 9, 9]), 0.0);
    }

    #[test]
    fn test_brightness() {
        assert_relative_eq!(brightness([255, 255, 255]), 1.0);
        assert_relative_eq!(brightness([255, 0, 0]), 1.0 / 3.0);
    }

    #[test]
    fn test_brightness_percentile() {
        // 10 pixels, gray levels 0, 25, ..., 225
        let mut rgba = Vec::new();
        for i in 0..10u8 {
            let v = i * 25;
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
        let buffer = PixelBuffer::from_rgba(rgba, 10, 1).unwrap();

        // floor(0.7 * 10) = 7th order statistic -> 175
        assert_relative_eq!(brightness_percentile(&buffer, 0.7), 175.0 / 255.0);
        assert_relative_eq!(brightness_percentile(&buffer, 1.0), 225.0 / 255.0);
    }

    #[test]
    fn test_resample_mask_nearest_keeps_binary_edges() {
        // Left half foreground in a 4x2 mask, upscaled 2x
        let mask = Mask::from_bits(4, 2, vec![true, true, false, false, true, true, false, false]).unwrap();

        let upscaled = resample_mask_nearest(&mask, 8, 4);

        assert_eq!(upscaled.width(), 8);
        assert_eq!(upscaled.count(), 16);
        assert!(upscaled.get(3, 3));
        assert!(!upscaled.get(4, 0));
    }

    #[test]
    fn test_overlay_draws_outline() {
        let buffer = PixelBuffer::from_rgba(vec![0; 20 * 20 * 4], 20, 20).unwrap();
        let square = vec![
            Point2D::new(2.0, 2.0),
            Point2D::new(17.0, 2.0),
            Point2D::new(17.0, 17.0),
            Point2D::new(2.0, 17.0),
        ];

        let overlay = draw_outline_overlay(&buffer, &[square], &[]);

        assert_eq!(overlay.get_pixel(10, 2).0, [255, 0, 0, 255]);
        assert_eq!(overlay.get_pixel(10, 10).0, [0, 0, 0, 0]);
    }
}
