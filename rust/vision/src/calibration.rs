// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel to millimetre calibration from a detected sheet of paper

use crate::error::{Error, Result};
use outline_lite_geometry::{scale_points, Point2D, Quadrilateral};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Paper sizes, portrait orientation, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    /// US Letter: 215.9 × 279.4 mm (8.5 × 11 inches)
    Letter,
    /// A4: 210 × 297 mm
    A4,
    /// US Legal: 215.9 × 355.6 mm (8.5 × 14 inches)
    Legal,
    /// A3: 297 × 420 mm
    A3,
    /// Tabloid: 279.4 × 431.8 mm (11 × 17 inches)
    Tabloid,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Returns (width, height) in millimeters
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom { width_mm, height_mm } => (*width_mm, *height_mm),
        }
    }

    pub fn presets() -> [PaperSize; 5] {
        [
            PaperSize::Letter,
            PaperSize::A4,
            PaperSize::Legal,
            PaperSize::A3,
            PaperSize::Tabloid,
        ]
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::Letter => write!(f, "Letter (8.5×11in)"),
            PaperSize::A4 => write!(f, "A4 (210×297mm)"),
            PaperSize::Legal => write!(f, "Legal (8.5×14in)"),
            PaperSize::A3 => write!(f, "A3 (297×420mm)"),
            PaperSize::Tabloid => write!(f, "Tabloid (11×17in)"),
            PaperSize::Custom { width_mm, height_mm } => write!(f, "Custom ({}×{}mm)", width_mm, height_mm),
        }
    }
}

impl FromStr for PaperSize {
    type Err = Error;

    /// Accepts preset names (case-insensitive) or `<width>x<height>` in mm
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "letter" => return Ok(PaperSize::Letter),
            "a4" => return Ok(PaperSize::A4),
            "legal" => return Ok(PaperSize::Legal),
            "a3" => return Ok(PaperSize::A3),
            "tabloid" => return Ok(PaperSize::Tabloid),
            _ => {}
        }

        let parsed = name
            .split_once('x')
            .and_then(|(w, h)| Some((w.trim().parse::<f64>().ok()?, h.trim().parse::<f64>().ok()?)));
        match parsed {
            Some((width_mm, height_mm)) if width_mm > 0.0 && height_mm > 0.0 => {
                Ok(PaperSize::Custom { width_mm, height_mm })
            }
            _ => Err(Error::InvalidCalibration(format!("unknown paper size '{}'", s))),
        }
    }
}

/// Pixels per millimetre derived from a reference quadrilateral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationScale {
    Isotropic { px_per_mm: f64 },
    Anisotropic { scale_x: f64, scale_y: f64, average: f64 },
}

impl CalibrationScale {
    pub fn px_per_mm_x(&self) -> f64 {
        match self {
            CalibrationScale::Isotropic { px_per_mm } => *px_per_mm,
            CalibrationScale::Anisotropic { scale_x, .. } => *scale_x,
        }
    }

    pub fn px_per_mm_y(&self) -> f64 {
        match self {
            CalibrationScale::Isotropic { px_per_mm } => *px_per_mm,
            CalibrationScale::Anisotropic { scale_y, .. } => *scale_y,
        }
    }

    pub fn average(&self) -> f64 {
        match self {
            CalibrationScale::Isotropic { px_per_mm } => *px_per_mm,
            CalibrationScale::Anisotropic { average, .. } => *average,
        }
    }

    pub fn point_to_mm(&self, p: &Point2D) -> Point2D {
        Point2D::new(p.x / self.px_per_mm_x(), p.y / self.px_per_mm_y())
    }

    pub fn polygon_to_mm(&self, points: &[Point2D]) -> Vec<Point2D> {
        scale_points(points, 1.0 / self.px_per_mm_x(), 1.0 / self.px_per_mm_y())
    }

    pub fn polygon_to_px(&self, points_mm: &[Point2D]) -> Vec<Point2D> {
        scale_points(points_mm, self.px_per_mm_x(), self.px_per_mm_y())
    }

    /// Length in millimetres converted to pixels using the average scale
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm * self.average()
    }
}

fn paper_dimensions(paper: &PaperSize) -> Result<(f64, f64)> {
    let (width_mm, height_mm) = paper.dimensions_mm();
    if !(width_mm > 0.0 && height_mm > 0.0) {
        return Err(Error::InvalidCalibration(format!(
            "paper dimensions must be positive, got {}×{}",
            width_mm, height_mm
        )));
    }
    Ok((width_mm, height_mm))
}

fn positive_length(length: f64, what: &str) -> Result<f64> {
    if length > f64::EPSILON && length.is_finite() {
        Ok(length)
    } else {
        Err(Error::InvalidCalibration(format!("{} edges have zero length", what)))
    }
}

/// Single scale: mean pixel length of the top and bottom edges over the paper width
pub fn isotropic_scale(quad: &Quadrilateral, paper: &PaperSize) -> Result<CalibrationScale> {
    let (width_mm, _) = paper_dimensions(paper)?;
    let horizontal = positive_length((quad.top_length() + quad.bottom_length()) / 2.0, "horizontal")?;

    Ok(CalibrationScale::Isotropic {
        px_per_mm: horizontal / width_mm,
    })
}

/// Separate horizontal and vertical scales from all four edges
pub fn anisotropic_scale(quad: &Quadrilateral, paper: &PaperSize) -> Result<CalibrationScale> {
    let (width_mm, height_mm) = paper_dimensions(paper)?;
    let horizontal = positive_length((quad.top_length() + quad.bottom_length()) / 2.0, "horizontal")?;
    let vertical = positive_length((quad.left_length() + quad.right_length()) / 2.0, "vertical")?;

    let scale_x = horizontal / width_mm;
    let scale_y = vertical / height_mm;
    Ok(CalibrationScale::Anisotropic {
        scale_x,
        scale_y,
        average: (scale_x + scale_y) / 2.0,
    })
}
