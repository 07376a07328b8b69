// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference paper detection
//!
//! The sheet is assumed to be the largest bright component of the photo:
//! largest bright region -> boundary pixels -> sampled convex hull -> four
//! ordered corners.

use crate::boundary::region_boundary;
use crate::config::TraceConfig;
use crate::segmentation::largest_bright_region;
use crate::types::PixelBuffer;
use outline_lite_geometry::{approximate_quadrilateral, convex_hull_sampled, Quadrilateral};

/// Locate the sheet of paper and return its corners in TL, TR, BR, BL order.
///
/// Returns `None` when the brightest component is too small to be the sheet
/// or cannot be reduced to four distinct corners.
pub fn detect_paper(buffer: &PixelBuffer, config: &TraceConfig) -> Option<Quadrilateral> {
    let region = largest_bright_region(buffer, config.paper_brightness_percentile);

    let min_pixels = (buffer.pixel_count() as f64 * config.min_paper_area_fraction).ceil() as usize;
    if region.is_empty() || region.len() < min_pixels {
        tracing::warn!(
            region = region.len(),
            min_pixels,
            "no bright region large enough to be the paper"
        );
        return None;
    }

    // The hull is order-independent, so the raw raster-order boundary is used
    let boundary = region_boundary(&region);
    let hull = convex_hull_sampled(&boundary, config.paper_hull_sample_limit);
    let corners = approximate_quadrilateral(&hull, &config.quad);

    if corners.len() != 4 {
        tracing::warn!(corners = corners.len(), "paper outline did not reduce to 4 corners");
        return None;
    }

    match Quadrilateral::from_points(&corners) {
        Ok(quad) => {
            tracing::debug!(?quad, "paper detected");
            Some(quad)
        }
        Err(err) => {
            tracing::warn!(%err, "paper corners rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use outline_lite_geometry::Point2D;

    fn photo_with_sheet(x0: u32, y0: u32, x1: u32, y1: u32) -> PixelBuffer {
        let mut img = RgbaImage::from_pixel(200, 160, Rgba([60, 55, 50, 255]));
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Rgba([245, 245, 240, 255]));
            }
        }
        // A dark tool lying on the sheet
        for y in 60..80 {
            for x in 70..120 {
                img.put_pixel(x, y, Rgba([30, 30, 140, 255]));
            }
        }
        PixelBuffer::from_image(img)
    }

    #[test]
    fn test_detect_axis_aligned_sheet() {
        let buffer = photo_with_sheet(20, 15, 180, 140);

        let quad = detect_paper(&buffer, &TraceConfig::default()).expect("paper");

        assert_eq!(
            quad.to_vec(),
            vec![
                Point2D::new(20.0, 15.0),
                Point2D::new(179.0, 15.0),
                Point2D::new(179.0, 139.0),
                Point2D::new(20.0, 139.0),
            ]
        );
    }

    #[test]
    fn test_uniform_image_yields_frame() {
        // Every pixel passes the percentile threshold, so the region is the whole frame
        let buffer = PixelBuffer::from_image(RgbaImage::from_pixel(50, 40, Rgba([200, 200, 200, 255])));

        let quad = detect_paper(&buffer, &TraceConfig::default()).expect("frame");

        assert_eq!(quad.top_left(), Point2D::new(0.0, 0.0));
        assert_eq!(quad.bottom_right(), Point2D::new(49.0, 39.0));
    }

    #[test]
    fn test_small_bright_region_rejected() {
        let buffer = photo_with_sheet(20, 15, 180, 140);
        let config = TraceConfig {
            min_paper_area_fraction: 0.9,
            ..Default::default()
        };

        assert!(detect_paper(&buffer, &config).is_none());
    }
}
