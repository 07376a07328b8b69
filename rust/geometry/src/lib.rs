// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outline-Lite Geometry
//!
//! Pure 2D polygon operations used to turn traced pixel boundaries into
//! export-ready outlines: Douglas-Peucker simplification, Graham-scan convex
//! hulls, four-corner approximation of paper sheets, and miter offsetting.
//!
//! Every function borrows its input and returns a freshly allocated result.
//! Degenerate input (too few points) is returned unchanged rather than
//! reported as an error.

pub mod error;
pub mod hull;
pub mod offset;
pub mod point;
pub mod quad;
pub mod simplify;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use error::{Error, Result};
pub use hull::{
    convex_hull, convex_hull_sampled, downsample_stride, OUTLINE_HULL_SAMPLE_LIMIT, PAPER_HULL_SAMPLE_LIMIT,
};
pub use offset::offset_polygon;
pub use point::{
    centroid, cross, perimeter, point_segment_distance, polygon_area, scale_points, signed_area,
    translate_points, Bounds, Point2D,
};
pub use quad::{
    approximate_quadrilateral, order_corners, select_extreme_points, QuadApproxParams, Quadrilateral,
};
pub use simplify::{douglas_peucker, douglas_peucker_closed, DEFAULT_CONTOUR_TOLERANCE};
