// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tool outline tracing from photographs
//!
//! This crate turns a photo of tools lying on a sheet of paper into
//! millimetre-accurate outlines:
//! 1. Detecting the paper as the largest bright region and reducing it to
//!    four ordered corners
//! 2. Deriving a pixel-per-millimetre scale from a known paper size
//! 3. Tracing the object under a click, via an optional segmentation
//!    provider, a color flood fill, or a fallback box
//! 4. Converting outlines to millimetres and offsetting them by a clearance
//!
//! # Usage
//!
//! ```rust,ignore
//! use outline_lite_vision::{
//!     detect_paper, isotropic_scale, PaperSize, PixelBuffer, Point2D, ToolTracer, TraceConfig,
//! };
//!
//! let config = TraceConfig::default();
//! let buffer = PixelBuffer::from_dynamic(&image::open("bench.jpg")?);
//!
//! let paper = detect_paper(&buffer, &config).expect("paper visible");
//! let scale = isotropic_scale(&paper, &PaperSize::A4)?;
//!
//! let tracer = ToolTracer::new(config);
//! let tool = tracer.trace_local(&buffer, Point2D::new(420.0, 310.0), "pliers");
//! let outline_mm = tool.to_mm(&scale).with_clearance(1.5);
//! ```

pub mod boundary;
pub mod calibration;
pub mod config;
pub mod contour_tracer;
pub mod error;
pub mod image_ops;
pub mod paper;
pub mod provider;
pub mod segmentation;
pub mod tracer;
pub mod types;

// Re-export commonly used types and functions
pub use boundary::{extract_boundary, order_boundary, ordered_mask_boundary, region_boundary, DEFAULT_MAX_GAP_SQUARED};
pub use calibration::{anisotropic_scale, isotropic_scale, CalibrationScale, PaperSize};
pub use config::TraceConfig;
pub use contour_tracer::{trace_mask, trace_mask_polygon};
pub use error::{Error, Result};
pub use image_ops::{brightness_percentile, color_distance, draw_outline_overlay, resample_mask_nearest};
pub use paper::detect_paper;
pub use provider::{ProviderHandle, ProviderMask, ProviderState, SegmentPrompt, SegmentationProvider};
pub use segmentation::{brightness_threshold, flood_fill_color, largest_bright_region, PAPER_BRIGHTNESS_PERCENTILE};
pub use tracer::ToolTracer;
pub use types::{BoundingBox, Mask, PixelBuffer, Region, Tool, TraceMethod};

pub use outline_lite_geometry::{Point2D, Quadrilateral};
