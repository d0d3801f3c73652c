// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations. File I/O lives here; the document crate only ever
// sees decoded images.

use std::path::Path;

use anyhow::{Context, Result};
use esrscan_core::{AppConfig, BoundaryRect};
use esrscan_document::image::processor::OUTLINE_RED;
use esrscan_document::{ImageProcessor, Preprocessor};
use serde::Serialize;
use tracing::info;

use crate::{LocateArgs, PreprocessArgs};

/// What `esrscan locate` prints.
#[derive(Debug, Serialize)]
pub struct LocateReport {
    /// Size of the image after the landscape rotation.
    pub width: u32,
    pub height: u32,
    /// Whether the photo had to be rotated.
    pub rotated: bool,
    pub boundary: BoundaryRect,
    /// Whether `preprocess` would crop to `boundary`.
    pub crop: bool,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn open(path: &Path) -> Result<ImageProcessor> {
    ImageProcessor::open(path).with_context(|| format!("reading {}", path.display()))
}

pub fn preprocess(args: &PreprocessArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let options = &mut config.preprocess;
    if args.no_crop {
        options.auto_crop = false;
    }
    if args.max_dimension.is_some() {
        options.max_dimension = args.max_dimension;
    }
    if args.invert {
        options.invert = true;
    }
    if args.threshold.is_some() {
        options.threshold_blur_radius = args.threshold;
    }

    let preprocessor = Preprocessor::new(config.scan)?;
    let image = open(&args.input)?.into_dynamic();

    let output = if args.outline {
        let rotated = preprocessor.rotate(image);
        let rect = preprocessor.locate(&rotated)?;
        info!(%rect, "Outlining detected boundary");
        ImageProcessor::from_dynamic(rotated).outline(rect, OUTLINE_RED)
    } else {
        ImageProcessor::from_dynamic(preprocessor.run(image, &config.preprocess)?)
    };

    output
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        width = output.width(),
        height = output.height(),
        "Slip written"
    );
    Ok(())
}

pub fn locate(args: &LocateArgs) -> Result<LocateReport> {
    let config = load_config(args.config.as_deref())?;
    let preprocessor = Preprocessor::new(config.scan)?;

    let image = open(&args.input)?.into_dynamic();
    let rotated = image.height() > image.width();
    let image = preprocessor.rotate(image);
    let boundary = preprocessor.locate(&image)?;

    Ok(LocateReport {
        width: image.width(),
        height: image.height(),
        rotated,
        boundary,
        crop: boundary.has_offset() && boundary.fits_within(image.width(), image.height()),
    })
}
