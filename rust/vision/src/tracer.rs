// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Click-to-outline orchestration
//!
//! A click (or box) is answered by the first strategy that produces a usable
//! polygon:
//!
//! 1. the segmentation provider, if one is attached and ready
//! 2. a local color flood fill from the click
//! 3. a fixed-size box around the click, for manual editing

use crate::boundary::{order_boundary, region_boundary};
use crate::config::TraceConfig;
use crate::contour_tracer::{trace_mask, trace_mask_polygon};
use crate::error::Error;
use crate::image_ops::resample_mask_nearest;
use crate::provider::{ProviderHandle, SegmentPrompt};
use crate::segmentation::flood_fill_color;
use crate::types::{BoundingBox, Mask, PixelBuffer, Tool, TraceMethod};
use outline_lite_geometry::{convex_hull_sampled, douglas_peucker, Point2D};
use std::time::Duration;
use tracing::{debug, warn};

/// Traces tool outlines with the configured strategies
#[derive(Debug, Default)]
pub struct ToolTracer {
    config: TraceConfig,
    provider: Option<ProviderHandle>,
}

impl ToolTracer {
    pub fn new(config: TraceConfig) -> Self {
        Self { config, provider: None }
    }

    /// Attach a provider handle. The tracer only uses it while it is ready.
    pub fn with_provider(mut self, provider: ProviderHandle) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn provider_mut(&mut self) -> Option<&mut ProviderHandle> {
        self.provider.as_mut()
    }

    pub fn take_provider(&mut self) -> Option<ProviderHandle> {
        self.provider.take()
    }

    /// Outline the object under `seed`.
    ///
    /// Must be awaited inside a Tokio runtime with the time driver enabled
    /// when a provider is attached.
    pub async fn trace_at_point(&self, buffer: &PixelBuffer, seed: Point2D, id: impl Into<String>) -> Tool {
        let id = id.into();
        if let Some(tool) = self.trace_with_provider(buffer, SegmentPrompt::Point(seed), &id).await {
            return tool;
        }
        self.trace_local(buffer, seed, id)
    }

    /// Outline the object inside `bbox`; the local fallback floods from its center
    pub async fn trace_in_box(&self, buffer: &PixelBuffer, bbox: BoundingBox, id: impl Into<String>) -> Tool {
        let id = id.into();
        if let Some(tool) = self.trace_with_provider(buffer, SegmentPrompt::Box(bbox), &id).await {
            return tool;
        }
        self.flood_fill_or(buffer, bbox.center(), id, bbox.to_polygon())
    }

    /// Provider-free tracing: flood fill, then the fallback box
    pub fn trace_local(&self, buffer: &PixelBuffer, seed: Point2D, id: impl Into<String>) -> Tool {
        let fallback = self.fallback_box(buffer, seed);
        self.flood_fill_or(buffer, seed, id.into(), fallback)
    }

    /// Outline a caller-supplied mask, resampled to the buffer size first.
    ///
    /// Returns `None` when the mask holds no traceable object.
    pub fn trace_from_mask(&self, buffer: &PixelBuffer, mask: &Mask, id: impl Into<String>) -> Option<Tool> {
        let (mask, outline) = self.outline_from_mask(buffer, mask)?;
        let mut tool = Tool::new(id, outline, TraceMethod::Mask);
        tool.mask = Some(mask);
        Some(tool)
    }

    /// The box a failed click degrades to
    pub fn fallback_box(&self, buffer: &PixelBuffer, seed: Point2D) -> Vec<Point2D> {
        BoundingBox::around(seed, self.config.fallback_box_half_size, buffer.width(), buffer.height()).to_polygon()
    }

    async fn trace_with_provider(&self, buffer: &PixelBuffer, prompt: SegmentPrompt, id: &str) -> Option<Tool> {
        let handle = self.provider.as_ref()?;
        if !handle.is_ready() {
            debug!(state = ?handle.state(), "provider not ready, tracing locally");
            return None;
        }

        let timeout_ms = self.config.provider_timeout_ms;
        let response = match tokio::time::timeout(Duration::from_millis(timeout_ms), handle.segment(buffer, prompt)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(%err, "segmentation provider failed, tracing locally");
                return None;
            }
            Err(_) => {
                warn!(err = %Error::ProviderTimeout(timeout_ms), "tracing locally");
                return None;
            }
        };

        let mask = match response.to_mask(self.config.mask_probability_threshold) {
            Ok(mask) => mask,
            Err(err) => {
                warn!(%err, "provider mask rejected, tracing locally");
                return None;
            }
        };
        let Some((mask, outline)) = self.outline_from_mask(buffer, &mask) else {
            debug!("provider mask held no object, tracing locally");
            return None;
        };

        let mut tool = Tool::new(id, outline, TraceMethod::Provider);
        tool.mask = Some(mask);
        tool.confidence = Some(response.clamped_confidence());
        Some(tool)
    }

    fn outline_from_mask(&self, buffer: &PixelBuffer, mask: &Mask) -> Option<(Mask, Vec<Point2D>)> {
        let mask = if mask.width() == buffer.width() && mask.height() == buffer.height() {
            mask.clone()
        } else {
            debug!(
                from_width = mask.width(),
                from_height = mask.height(),
                to_width = buffer.width(),
                to_height = buffer.height(),
                "resampling mask"
            );
            resample_mask_nearest(mask, buffer.width(), buffer.height())
        };
        if mask.is_empty() {
            return None;
        }

        let outline = if self.config.convex_outlines {
            self.hull(&trace_mask(&mask))
        } else {
            trace_mask_polygon(&mask, self.config.simplify_tolerance)
        };
        if outline.len() < 3 {
            return None;
        }
        Some((mask, outline))
    }

    fn flood_fill_or(&self, buffer: &PixelBuffer, seed: Point2D, id: String, fallback: Vec<Point2D>) -> Tool {
        let region = flood_fill_color(buffer, seed, self.config.color_threshold);
        if region.len() < self.config.min_region_pixels {
            debug!(pixels = region.len(), "flood fill region too small, using fallback box");
            return Tool::new(id, fallback, TraceMethod::FallbackBox);
        }

        let boundary = region_boundary(&region);
        let outline = if self.config.convex_outlines {
            self.hull(&boundary)
        } else {
            let ordered = order_boundary(&boundary, self.config.boundary_max_gap_squared);
            douglas_peucker(&ordered, self.config.simplify_tolerance)
        };
        if outline.len() < 3 {
            debug!(points = outline.len(), "flood fill outline degenerate, using fallback box");
            return Tool::new(id, fallback, TraceMethod::FallbackBox);
        }

        debug!(pixels = region.len(), points = outline.len(), "traced by flood fill");
        let mut tool = Tool::new(id, outline, TraceMethod::FloodFill);
        tool.mask = Some(region.to_mask());
        tool
    }

    fn hull(&self, points: &[Point2D]) -> Vec<Point2D> {
        convex_hull_sampled(points, self.config.hull_sample_limit)
    }
}
