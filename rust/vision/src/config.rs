// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracing configuration, loadable from JSON and overridable from the environment.

use crate::boundary::DEFAULT_MAX_GAP_SQUARED;
use crate::error::{Error, Result};
use crate::segmentation::PAPER_BRIGHTNESS_PERCENTILE;
use outline_lite_geometry::{
    QuadApproxParams, DEFAULT_CONTOUR_TOLERANCE, OUTLINE_HULL_SAMPLE_LIMIT, PAPER_HULL_SAMPLE_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for segmentation, tracing and paper detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// RGB distance (0-255 scale) below which a pixel joins the seed's region
    pub color_threshold: f64,
    /// Douglas-Peucker tolerance for traced contours (pixels)
    pub simplify_tolerance: f64,
    /// Squared distance that ends the boundary ordering walk
    pub boundary_max_gap_squared: f64,
    /// Regions smaller than this fall back to the click box
    pub min_region_pixels: usize,
    /// Replace traced tool outlines with their convex hull
    pub convex_outlines: bool,
    /// Down-sampling limit for tool outline hulls
    pub hull_sample_limit: usize,
    /// Down-sampling limit for the paper boundary hull
    pub paper_hull_sample_limit: usize,
    /// Brightness percentile used as the paper threshold (0.0 - 1.0)
    pub paper_brightness_percentile: f64,
    /// Minimum paper area as a fraction of the image
    pub min_paper_area_fraction: f64,
    /// Escalating tolerance schedule for quadrilateral approximation
    pub quad: QuadApproxParams,
    /// Probability at or above which a provider mask pixel is foreground
    pub mask_probability_threshold: f32,
    /// How long to wait for the segmentation provider
    pub provider_timeout_ms: u64,
    /// Half-size of the fallback box drawn around a click (pixels)
    pub fallback_box_half_size: f64,
    /// Clearance added around exported outlines (millimetres)
    pub clearance_mm: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            color_threshold: 30.0,
            simplify_tolerance: DEFAULT_CONTOUR_TOLERANCE,
            boundary_max_gap_squared: DEFAULT_MAX_GAP_SQUARED,
            min_region_pixels: 16,
            convex_outlines: false,
            hull_sample_limit: OUTLINE_HULL_SAMPLE_LIMIT,
            paper_hull_sample_limit: PAPER_HULL_SAMPLE_LIMIT,
            paper_brightness_percentile: PAPER_BRIGHTNESS_PERCENTILE,
            min_paper_area_fraction: 0.05,
            quad: QuadApproxParams::default(),
            mask_probability_threshold: 0.5,
            provider_timeout_ms: 10_000,
            fallback_box_half_size: 50.0,
            clearance_mm: 0.0,
        }
    }
}

impl TraceConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `OUTLINE_*` environment variables, validated
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from a key lookup, validated
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self::default().with_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup; unparsable values are ignored
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parse(lookup("OUTLINE_COLOR_THRESHOLD")) {
            self.color_threshold = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_SIMPLIFY_TOLERANCE")) {
            self.simplify_tolerance = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_MIN_REGION_PIXELS")) {
            self.min_region_pixels = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_CONVEX_OUTLINES")) {
            self.convex_outlines = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_HULL_SAMPLE_LIMIT")) {
            self.hull_sample_limit = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_PAPER_PERCENTILE")) {
            self.paper_brightness_percentile = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_PROVIDER_TIMEOUT_MS")) {
            self.provider_timeout_ms = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_FALLBACK_BOX_HALF_SIZE")) {
            self.fallback_box_half_size = v;
        }
        if let Some(v) = parse(lookup("OUTLINE_CLEARANCE_MM")) {
            self.clearance_mm = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.color_threshold > 0.0) {
            return Err(Error::InvalidConfig("color_threshold must be positive".into()));
        }
        if self.simplify_tolerance < 0.0 {
            return Err(Error::InvalidConfig("simplify_tolerance must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&self.paper_brightness_percentile) {
            return Err(Error::InvalidConfig(
                "paper_brightness_percentile must be within 0.0..=1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mask_probability_threshold) {
            return Err(Error::InvalidConfig(
                "mask_probability_threshold must be within 0.0..=1.0".into(),
            ));
        }
        if self.hull_sample_limit < 3 || self.paper_hull_sample_limit < 3 {
            return Err(Error::InvalidConfig("hull sample limits must be at least 3".into()));
        }
        self.quad.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TraceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TraceConfig::from_json_str(r#"{ "color_threshold": 45.0, "quad": { "start_tolerance": 2.0, "tolerance_step": 2.0, "max_tolerance": 50.0 } }"#).unwrap();

        assert_eq!(config.color_threshold, 45.0);
        assert_eq!(config.quad.max_tolerance, 50.0);
        assert_eq!(config.simplify_tolerance, DEFAULT_CONTOUR_TOLERANCE);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            TraceConfig::from_json_str(r#"{ "paper_brightness_percentile": 1.5 }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            TraceConfig::from_json_str("not json"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TraceConfig::from_json_str(r#"{ "quad": { "start_tolerance": 5.0, "tolerance_step": 0.0, "max_tolerance": 100.0 } }"#),
            Err(Error::Geometry(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = TraceConfig::default().with_env_overrides(|key| match key {
            "OUTLINE_COLOR_THRESHOLD" => Some("12.5".to_string()),
            "OUTLINE_PROVIDER_TIMEOUT_MS" => Some("not a number".to_string()),
            _ => None,
        });

        assert_eq!(config.color_threshold, 12.5);
        assert_eq!(config.provider_timeout_ms, 10_000);
    }

    #[test]
    fn test_lookup_overrides_are_validated() {
        let rejected = TraceConfig::from_lookup(|key| (key == "OUTLINE_COLOR_THRESHOLD").then(|| "-1".to_string()));
        assert!(matches!(rejected, Err(Error::InvalidConfig(_))));

        let config = TraceConfig::from_lookup(|key| match key {
            "OUTLINE_CONVEX_OUTLINES" => Some("true".to_string()),
            "OUTLINE_HULL_SAMPLE_LIMIT" => Some("64".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.convex_outlines);
        assert_eq!(config.hull_sample_limit, 64);

        assert!(TraceConfig::from_lookup(|key| (key == "OUTLINE_HULL_SAMPLE_LIMIT").then(|| "2".to_string())).is_err());
    }
}
