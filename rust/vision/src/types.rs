// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for outline tracing

use crate::calibration::CalibrationScale;
use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use outline_lite_geometry::{offset_polygon, Bounds, Point2D};
use serde::{Deserialize, Serialize};

/// Read-only RGBA photograph handed to the pipeline by the caller
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes (4 bytes per pixel, row-major)
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::InvalidBuffer(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        RgbaImage::from_raw(width, height, rgba)
            .map(|image| Self { image })
            .ok_or_else(|| Error::InvalidBuffer("RGBA data does not fit dimensions".to_string()))
    }

    /// Single-channel samples, replicated to RGB with opaque alpha
    pub fn from_gray(gray: &GrayImage) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(gray.clone()).to_rgba8(),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// RGB sample at `(x, y)`; caller guarantees bounds
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let p = self.image.get_pixel(x, y).0;
        [p[0], p[1], p[2]]
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Binary occupancy raster, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    pub fn from_bits(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(Error::InvalidMask(format!(
                "expected {} samples for {}x{}, got {}",
                width as usize * height as usize,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Threshold a probability raster (foreground where `p >= threshold`)
    pub fn from_probabilities(width: u32, height: u32, probabilities: &[f32], threshold: f32) -> Result<Self> {
        let data = probabilities.iter().map(|&p| p >= threshold).collect();
        Self::from_bits(width, height, data)
    }

    /// Foreground where the gray level is above mid-gray
    pub fn from_gray(gray: &GrayImage) -> Self {
        Self {
            width: gray.width(),
            height: gray.height(),
            data: gray.pixels().map(|p| p.0[0] > 128).collect(),
        }
    }

    /// Rasterize a region; pixels outside its `width x height` are dropped
    pub fn from_region(region: &Region) -> Self {
        let mut data = vec![false; region.width as usize * region.height as usize];
        let mut dropped = 0usize;
        for &(x, y) in &region.pixels {
            if x >= region.width || y >= region.height {
                dropped += 1;
                continue;
            }
            data[y as usize * region.width as usize + x as usize] = true;
        }
        if dropped > 0 {
            tracing::debug!(dropped, width = region.width, height = region.height, "region pixels out of range");
        }
        Self {
            width: region.width,
            height: region.height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Occupancy at signed coordinates; out of bounds reads as background
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Foreground pixel with at least one 4-neighbour that is background or outside
    pub fn is_edge(&self, x: i64, y: i64) -> bool {
        if !self.get(x, y) {
            return false;
        }
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|(dx, dy)| !self.get(x + dx, y + dy))
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// First foreground pixel in raster order
    pub fn first_foreground(&self) -> Option<(u32, u32)> {
        let idx = self.data.iter().position(|&v| v)?;
        let w = self.width as usize;
        Some(((idx % w) as u32, (idx / w) as u32))
    }

    pub fn to_gray_image(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.width, self.height);
        for (i, pixel) in gray.pixels_mut().enumerate() {
            *pixel = Luma([if self.data[i] { 255 } else { 0 }]);
        }
        gray
    }
}

/// Unordered pixel set produced by one segmentation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Width of the buffer the region was taken from
    pub width: u32,
    /// Height of the buffer the region was taken from
    pub height: u32,
    pub pixels: Vec<(u32, u32)>,
}

impl Region {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn to_mask(&self) -> Mask {
        Mask::from_region(self)
    }
}

/// Axis-aligned box prompt in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2D,
    pub max: Point2D,
}

impl BoundingBox {
    pub fn new(min: Point2D, max: Point2D) -> Self {
        Self {
            min: Point2D::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point2D::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// Square box of half-size `half` around `center`, clipped to the image
    pub fn around(center: Point2D, half: f64, width: u32, height: u32) -> Self {
        let max_x = (width.max(1) - 1) as f64;
        let max_y = (height.max(1) - 1) as f64;
        Self::new(
            Point2D::new((center.x - half).clamp(0.0, max_x), (center.y - half).clamp(0.0, max_y)),
            Point2D::new((center.x + half).clamp(0.0, max_x), (center.y + half).clamp(0.0, max_y)),
        )
    }

    pub fn center(&self) -> Point2D {
        Point2D::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    /// Corners in TL -> TR -> BR -> BL order
    pub fn to_polygon(&self) -> Vec<Point2D> {
        vec![
            self.min,
            Point2D::new(self.max.x, self.min.y),
            self.max,
            Point2D::new(self.min.x, self.max.y),
        ]
    }
}

/// How a tool outline was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceMethod {
    /// Mask returned by the external segmentation provider
    Provider,
    /// Mask supplied directly by the caller
    Mask,
    /// Local color flood fill
    FloodFill,
    /// Fixed-size box around the click, for the user to fix up by hand
    FallbackBox,
}

/// A traced object outline plus what produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    /// Closed outline polygon
    pub outline: Vec<Point2D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    /// Provider confidence (0.0 - 1.0), if a provider was involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub method: TraceMethod,
}

impl Tool {
    pub fn new(id: impl Into<String>, outline: Vec<Point2D>, method: TraceMethod) -> Self {
        Self {
            id: id.into(),
            outline,
            mask: None,
            confidence: None,
            method,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.outline)
    }

    /// Same tool with its outline converted to millimetres; the mask is dropped
    pub fn to_mm(&self, scale: &CalibrationScale) -> Tool {
        Tool {
            id: self.id.clone(),
            outline: scale.polygon_to_mm(&self.outline),
            mask: None,
            confidence: self.confidence,
            method: self.method,
        }
    }

    /// Grow the outline by `clearance` (same units as the outline)
    pub fn with_clearance(&self, clearance: f64) -> Tool {
        Tool {
            outline: offset_polygon(&self.outline, clearance),
            ..self.clone()
        }
    }
}
