// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for vision operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while segmenting, tracing or calibrating
///
/// Degenerate geometry (empty regions, short contours) is not an error; those
/// cases return empty or unchanged results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Segmentation provider is not ready")]
    ProviderNotReady,

    #[error("Segmentation provider failed: {0}")]
    Provider(String),

    #[error("Segmentation provider timed out after {0} ms")]
    ProviderTimeout(u64),

    #[error("Geometry error: {0}")]
    Geometry(#[from] outline_lite_geometry::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
