// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// esrscan-document — Image processing for the ESR slip scanner.
//
// Provides image operations (rotate, checked crop, scale, outline, encode) and
// the slip scanning pipeline (pixel sampling, marker colour classification,
// boundary location, filters, preprocessing).

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `esrscan_document::Preprocessor` etc.
pub use self::image::processor::ImageProcessor;
pub use scan::boundary::{BoundaryLocator, MarkerHits};
pub use scan::color::{ColorClassifier, HsvSample};
pub use scan::filter::{ImageFilter, LocalMeanFilter};
pub use scan::pipeline::Preprocessor;
pub use scan::pixel::{PixelBuffer, RgbSample};
