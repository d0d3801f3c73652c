// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary locator — finds the slip's orange markers by sampling inward from
// the bottom-right anchor corner and turns the hits into a crop rectangle.

use esrscan_core::config::ScanConfig;
use esrscan_core::types::BoundaryRect;
use tracing::{debug, instrument};

use super::color::ColorClassifier;
use super::pixel::PixelBuffer;

/// Marker positions found by one scan, before the margin is applied.
///
/// `None` means the scan line ran out without a hit. A hit is never at 0:
/// the scan stops before reaching the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerHits {
    /// Row of the first marker pixel on the right-hand column.
    pub row: Option<u32>,
    /// Column of the first marker pixel on the bottom row.
    pub column: Option<u32>,
}

impl MarkerHits {
    pub fn is_empty(&self) -> bool {
        self.row.is_none() && self.column.is_none()
    }
}

/// Scans a [`PixelBuffer`] for boundary markers.
///
/// The bottom-right corner is taken as already lying on the slip's edge. From
/// there one scan walks up the right-hand column and one walks left along the
/// bottom row. Both begin a fixed fraction of the image in from the corner:
/// ESR slips print their markers in the far two thirds, so the near band is
/// not worth sampling. That shortcut is specific to this slip layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLocator {
    classifier: ColorClassifier,
    step: u32,
    margin: u32,
    start_divisor: u32,
}

impl Default for BoundaryLocator {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl BoundaryLocator {
    /// Build a locator from a config. Call [`ScanConfig::validate`] first;
    /// a zero step or divisor is bumped to 1 here rather than looping forever.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            classifier: ColorClassifier::from_config(config),
            step: config.step.max(1),
            margin: config.margin,
            start_divisor: config.start_divisor.max(1),
        }
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// Row coordinates sampled by the vertical scan, nearest the anchor first.
    pub fn row_candidates(&self, height: u32) -> Candidates {
        let y2 = height.saturating_sub(1);
        let start = y2.saturating_sub(height / self.start_divisor);
        Candidates::new(start, self.step)
    }

    /// Column coordinates sampled by the horizontal scan.
    pub fn column_candidates(&self, width: u32) -> Candidates {
        let x2 = width.saturating_sub(1);
        let start = (width / self.start_divisor).min(x2);
        Candidates::new(start, self.step)
    }

    /// Walk up the right-hand column; first marker row wins.
    pub fn scan_vertical(&self, buffer: &PixelBuffer) -> Option<u32> {
        let x2 = buffer.width() - 1;
        self.row_candidates(buffer.height())
            .find(|&y| self.classifier.classify(buffer.read_pixel(x2, y)))
    }

    /// Walk left along the bottom row; first marker column wins.
    pub fn scan_horizontal(&self, buffer: &PixelBuffer) -> Option<u32> {
        let y2 = buffer.height() - 1;
        self.column_candidates(buffer.width())
            .find(|&x| self.classifier.classify(buffer.read_pixel(x, y2)))
    }

    pub fn find_markers(&self, buffer: &PixelBuffer) -> MarkerHits {
        MarkerHits {
            row: self.scan_vertical(buffer),
            column: self.scan_horizontal(buffer),
        }
    }

    /// Crop rectangle for `hits` in a `width` x `height` image.
    ///
    /// The far corner is `(width - 1, height - 1)`. A hit moves the near edge
    /// to `hit - margin`, which may go negative; an axis without a hit stays
    /// at 0.
    pub fn rect_for(&self, hits: MarkerHits, width: u32, height: u32) -> BoundaryRect {
        let margin = i64::from(self.margin);
        let x2 = i64::from(width) - 1;
        let y2 = i64::from(height) - 1;
        let x1 = hits.column.map_or(0, |x| i64::from(x) - margin);
        let y1 = hits.row.map_or(0, |y| i64::from(y) - margin);
        BoundaryRect::from_corners(x1, y1, x2, y2)
    }

    /// Scan `buffer` and return the region inside the markers.
    ///
    /// When neither scan finds a marker the rectangle starts at (0, 0); the
    /// caller decides whether that warrants a crop.
    #[instrument(skip_all, fields(width = buffer.width(), height = buffer.height()))]
    pub fn find_boundary(&self, buffer: &PixelBuffer) -> BoundaryRect {
        let hits = self.find_markers(buffer);
        let rect = self.rect_for(hits, buffer.width(), buffer.height());
        debug!(row = ?hits.row, column = ?hits.column, %rect, "Boundary scan complete");
        rect
    }
}

/// Descending sample positions `start, start - step, ...`, all above 0.
///
/// Cheap to clone, so a scan can be restarted or inspected without touching
/// the buffer.
#[derive(Debug, Clone)]
pub struct Candidates {
    next: Option<u32>,
    step: u32,
}

impl Candidates {
    fn new(start: u32, step: u32) -> Self {
        Self {
            next: Some(start).filter(|&v| v > 0),
            step,
        }
    }
}

impl Iterator for Candidates {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        self.next = current.checked_sub(self.step).filter(|&v| v > 0);
        Some(current)
    }
}
