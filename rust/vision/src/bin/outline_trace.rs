// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: trace tool outlines from a photo of tools lying on paper
//!
//! Detects the sheet, calibrates pixels to millimetres from the paper size,
//! flood-fills each seed into an outline and prints the outlines (in mm, with
//! clearance) as JSON.
//!
//! Usage:
//!   outline-trace <image_path> --seed 420,310 [--seed x,y ...] [options]

use anyhow::{bail, Context, Result};
use clap::Parser;
use outline_lite_vision::{
    anisotropic_scale, detect_paper, draw_outline_overlay, isotropic_scale, CalibrationScale, PaperSize,
    PixelBuffer, Point2D, Tool, ToolTracer, TraceConfig,
};
use serde::Serialize;
use std::path::PathBuf;

/// Trace tool outlines from a photo of tools on a known sheet of paper
#[derive(Parser, Debug)]
#[command(name = "outline-trace", version)]
#[command(about = "Trace tool outlines from a photo taken on paper", long_about = None)]
struct Args {
    /// Input image (PNG or JPEG)
    input: PathBuf,

    /// Click position `x,y` in image pixels; repeat for several tools
    #[arg(short, long = "seed", value_parser = parse_seed, required = true)]
    seeds: Vec<Point2D>,

    /// Paper size: letter, a4, legal, a3, tabloid, or `<w>x<h>` in mm
    #[arg(short, long, default_value = "letter")]
    paper: PaperSize,

    /// JSON config file; `OUTLINE_*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clearance around each outline in mm (overrides the config)
    #[arg(long)]
    clearance: Option<f64>,

    /// Replace each tool outline with its convex hull
    #[arg(long)]
    convex: bool,

    /// Separate horizontal and vertical scales
    #[arg(long)]
    anisotropic: bool,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save a PNG with the paper corners and traced outlines drawn in
    #[arg(long)]
    debug_overlay: Option<PathBuf>,
}

#[derive(Serialize)]
struct TraceReport {
    paper: PaperSize,
    corners_px: Vec<Point2D>,
    scale: CalibrationScale,
    clearance_mm: f64,
    tools: Vec<Tool>,
}

fn parse_seed(value: &str) -> std::result::Result<Point2D, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{}'", value))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x in '{}'", value))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y in '{}'", value))?;
    Ok(Point2D::new(x, y))
}

fn load_config(args: &Args) -> Result<TraceConfig> {
    let mut config = match &args.config {
        Some(path) => TraceConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .with_env_overrides(|key| std::env::var(key).ok()),
        None => TraceConfig::from_env().context("invalid environment configuration")?,
    };
    if let Some(clearance) = args.clearance {
        config.clearance_mm = clearance;
    }
    if args.convex {
        config.convex_outlines = true;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,outline_lite_vision=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let image = image::open(&args.input).with_context(|| format!("failed to open {}", args.input.display()))?;
    let buffer = PixelBuffer::from_dynamic(&image);
    tracing::info!(
        input = %args.input.display(),
        width = buffer.width(),
        height = buffer.height(),
        paper = %args.paper,
        "loaded image"
    );

    let Some(paper) = detect_paper(&buffer, &config) else {
        bail!("no sheet of paper found; make sure the whole sheet is visible against a darker background");
    };
    let scale = if args.anisotropic {
        anisotropic_scale(&paper, &args.paper)
    } else {
        isotropic_scale(&paper, &args.paper)
    }
    .context("calibration failed")?;
    tracing::info!(px_per_mm = scale.average(), "calibrated");

    let tracer = ToolTracer::new(config.clone());
    let traced: Vec<Tool> = args
        .seeds
        .iter()
        .enumerate()
        .map(|(i, seed)| tracer.trace_local(&buffer, *seed, format!("tool-{}", i + 1)))
        .collect();

    for tool in &traced {
        tracing::info!(id = %tool.id, method = ?tool.method, points = tool.outline.len(), "traced");
    }

    if let Some(path) = &args.debug_overlay {
        let outlines: Vec<Vec<Point2D>> = traced.iter().map(|t| t.outline.clone()).collect();
        draw_outline_overlay(&buffer, &outlines, &paper.to_vec())
            .save(path)
            .with_context(|| format!("failed to write overlay {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote debug overlay");
    }

    let report = TraceReport {
        paper: args.paper,
        corners_px: paper.to_vec(),
        scale,
        clearance_mm: config.clearance_mm,
        tools: traced
            .iter()
            .map(|tool| tool.to_mm(&scale).with_clearance(config.clearance_mm))
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), tools = report.tools.len(), "wrote outlines");
        }
        None => println!("{}", json),
    }

    Ok(())
}
