// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam to an external object-segmentation model
//!
//! The model itself lives outside this crate. It is reached through the
//! [`SegmentationProvider`] trait and owned by a caller-managed
//! [`ProviderHandle`], which tracks whether it has been loaded. Independent
//! handles never share state.

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Mask, PixelBuffer};
use futures_util::future::BoxFuture;
use outline_lite_geometry::Point2D;
use std::fmt;

/// Raw provider answer: a probability raster at the model's own resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMask {
    pub width: u32,
    pub height: u32,
    /// Row-major foreground probabilities (binary masks use 0.0 / 1.0)
    pub probabilities: Vec<f32>,
    /// Model confidence for the whole mask (0.0 - 1.0)
    pub confidence: f32,
}

impl ProviderMask {
    pub fn from_mask(mask: &Mask, confidence: f32) -> Self {
        let mut probabilities = Vec::with_capacity(mask.width() as usize * mask.height() as usize);
        for y in 0..mask.height() as i64 {
            for x in 0..mask.width() as i64 {
                probabilities.push(if mask.get(x, y) { 1.0 } else { 0.0 });
            }
        }
        Self {
            width: mask.width(),
            height: mask.height(),
            probabilities,
            confidence,
        }
    }

    /// Binary mask at the provider's resolution
    pub fn to_mask(&self, threshold: f32) -> Result<Mask> {
        Mask::from_probabilities(self.width, self.height, &self.probabilities, threshold)
    }

    pub fn clamped_confidence(&self) -> f32 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}

/// Prompt sent to the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentPrompt {
    Point(Point2D),
    Box(BoundingBox),
}

/// An object-segmentation model that answers one prompt with one mask.
pub trait SegmentationProvider: Send + Sync {
    /// Load weights or open a session. Called once per handle.
    fn load(&mut self) -> BoxFuture<'_, Result<()>>;

    fn segment_at_point<'a>(&'a self, image: &'a PixelBuffer, point: Point2D) -> BoxFuture<'a, Result<ProviderMask>>;

    fn segment_in_box<'a>(&'a self, image: &'a PixelBuffer, bbox: BoundingBox) -> BoxFuture<'a, Result<ProviderMask>>;

    /// Release model resources
    fn unload(&mut self) {}
}

/// Lifecycle of a provider handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    Ready,
    Disposed,
}

/// Caller-owned handle around a provider: initialize -> ready -> dispose
pub struct ProviderHandle {
    provider: Box<dyn SegmentationProvider>,
    state: ProviderState,
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle").field("state", &self.state).finish()
    }
}

impl ProviderHandle {
    pub fn new(provider: impl SegmentationProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            state: ProviderState::Uninitialized,
        }
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ProviderState::Ready
    }

    /// Load the provider. A second call on a ready handle is a no-op; a
    /// disposed handle cannot be revived.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.state {
            ProviderState::Ready => Ok(()),
            ProviderState::Disposed => Err(Error::ProviderNotReady),
            ProviderState::Uninitialized => {
                self.provider.load().await?;
                self.state = ProviderState::Ready;
                tracing::debug!("segmentation provider ready");
                Ok(())
            }
        }
    }

    pub fn dispose(&mut self) {
        if self.state != ProviderState::Disposed {
            if self.state == ProviderState::Ready {
                self.provider.unload();
            }
            self.state = ProviderState::Disposed;
        }
    }

    pub async fn segment(&self, image: &PixelBuffer, prompt: SegmentPrompt) -> Result<ProviderMask> {
        if !self.is_ready() {
            return Err(Error::ProviderNotReady);
        }
        match prompt {
            SegmentPrompt::Point(point) => self.provider.segment_at_point(image, point).await,
            SegmentPrompt::Box(bbox) => self.provider.segment_in_box(image, bbox).await,
        }
    }

    pub async fn segment_at_point(&self, image: &PixelBuffer, point: Point2D) -> Result<ProviderMask> {
        self.segment(image, SegmentPrompt::Point(point)).await
    }

    pub async fn segment_in_box(&self, image: &PixelBuffer, bbox: BoundingBox) -> Result<ProviderMask> {
        self.segment(image, SegmentPrompt::Box(bbox)).await
    }
}

impl Drop for ProviderHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
