// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocess pipeline — rotate the photo to landscape, locate the slip's
// boundary markers, crop to them, then apply the optional scale / invert /
// threshold steps.

use esrscan_core::config::{PreprocessConfig, ScanConfig};
use esrscan_core::error::{EsrScanError, Result};
use esrscan_core::types::BoundaryRect;
use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use super::boundary::BoundaryLocator;
use super::filter::{ImageFilter, LocalMeanFilter};
use super::pixel::PixelBuffer;
use crate::image::processor::{self, ImageProcessor};

/// Turns a photographed payment slip into a cropped, landscape image.
///
/// Holds no mutable state; one instance can serve any number of images, from
/// any number of threads if the filter allows it.
#[derive(Debug, Clone)]
pub struct Preprocessor<F: ImageFilter = LocalMeanFilter> {
    locator: BoundaryLocator,
    filter: F,
}

impl Preprocessor<LocalMeanFilter> {
    /// Build a preprocessor with the default CPU filter backend.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_filter(config, LocalMeanFilter::default())
    }
}

impl Default for Preprocessor<LocalMeanFilter> {
    fn default() -> Self {
        Self {
            locator: BoundaryLocator::default(),
            filter: LocalMeanFilter::default(),
        }
    }
}

impl<F: ImageFilter> Preprocessor<F> {
    /// Build a preprocessor with a custom filter backend.
    pub fn with_filter(config: ScanConfig, filter: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            locator: BoundaryLocator::from_config(&config),
            filter,
        })
    }

    pub fn locator(&self) -> &BoundaryLocator {
        &self.locator
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Rotate portrait photos a quarter turn counter-clockwise.
    pub fn rotate(&self, image: DynamicImage) -> DynamicImage {
        ImageProcessor::from_dynamic(image)
            .rotate_to_landscape()
            .into_dynamic()
    }

    /// Decode `image` and scan it for boundary markers.
    ///
    /// The pixel buffer lives only for the duration of this call.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &DynamicImage) -> Result<BoundaryRect> {
        let buffer = PixelBuffer::decode(image)?;
        Ok(self.locator.find_boundary(&buffer))
    }

    /// Rotate, then (when `auto_crop` is set) crop to the detected markers.
    ///
    /// A photo without visible markers comes back rotated but uncropped; that
    /// is not an error. A detected rectangle that does not fit the image is
    /// logged and likewise skipped. Only a failure to decode the pixels is
    /// returned as an error.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn preprocess(&self, image: DynamicImage, auto_crop: bool) -> Result<DynamicImage> {
        let rotated = self.rotate(image);
        if !auto_crop {
            debug!("Auto-crop disabled");
            return Ok(rotated);
        }

        let rect = self.locate(&rotated)?;
        if !rect.has_offset() {
            info!("No boundary markers found; leaving image uncropped");
            return Ok(rotated);
        }

        match processor::crop(&rotated, rect) {
            Ok(cropped) => Ok(cropped),
            Err(EsrScanError::Crop {
                rect,
                width,
                height,
            }) => {
                warn!(%rect, width, height, "Boundary does not fit the image; skipping crop");
                Ok(rotated)
            }
            Err(other) => Err(other),
        }
    }

    /// Crop `image` to `rect`, failing with [`EsrScanError::Crop`] when the
    /// rectangle does not fit.
    pub fn crop(&self, image: &DynamicImage, rect: BoundaryRect) -> Result<DynamicImage> {
        processor::crop(image, rect)
    }

    /// Scale so the longer side is `max_dimension` pixels.
    pub fn scale_image(&self, image: DynamicImage, max_dimension: u32) -> DynamicImage {
        ImageProcessor::from_dynamic(image)
            .scale_to_max_dimension(max_dimension)
            .into_dynamic()
    }

    pub fn invert(&self, image: &DynamicImage) -> DynamicImage {
        self.filter.invert_colors(image)
    }

    pub fn adaptive_threshold(&self, image: &DynamicImage, blur_radius: f32) -> DynamicImage {
        self.filter.adaptive_threshold(image, blur_radius)
    }

    /// Full chain: preprocess, then scale, invert and threshold as
    /// configured, in that order.
    #[instrument(skip(self, image))]
    pub fn run(&self, image: DynamicImage, options: &PreprocessConfig) -> Result<DynamicImage> {
        options.validate()?;

        let mut out = self.preprocess(image, options.auto_crop)?;
        if let Some(max_dimension) = options.max_dimension {
            out = self.scale_image(out, max_dimension);
        }
        if options.invert {
            out = self.invert(&out);
        }
        if let Some(radius) = options.threshold_blur_radius {
            out = self.adaptive_threshold(&out, radius);
        }

        info!(width = out.width(), height = out.height(), "Preprocessing complete");
        Ok(out)
    }
}
