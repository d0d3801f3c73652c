// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the slip scanner.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates (top-left origin).
///
/// Fields are signed: the locator subtracts a fixed margin from the marker
/// hit, which can push the origin past the image edge. Such a rectangle is
/// rejected by the crop step rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundaryRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its top-left and (exclusive) bottom-right corners.
    pub fn from_corners(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    /// Whether the origin moved away from the image origin on either axis.
    ///
    /// This is the "a marker was found" test used by the preprocess pipeline.
    pub fn has_offset(&self) -> bool {
        self.x > 0 || self.y > 0
    }

    /// True when the rectangle is non-empty and lies fully inside a
    /// `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.right() <= i64::from(width)
            && self.bottom() <= i64::from(height)
    }
}

impl std::fmt::Display for BoundaryRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// How a negative hue from the red-max branch is brought back into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueCorrection {
    /// Take the absolute value. Approximate, but reproduces the classification
    /// results the marker thresholds were tuned against.
    #[default]
    Absolute,
    /// Wrap into [0, 360) by adding 360 to negative hues (textbook HSV).
    Wrap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_computes_size() {
        let rect = BoundaryRect::from_corners(40, 90, 299, 199);
        assert_eq!(rect, BoundaryRect::new(40, 90, 259, 109));
        assert_eq!(rect.right(), 299);
        assert_eq!(rect.bottom(), 199);
    }

    #[test]
    fn has_offset_requires_positive_component() {
        assert!(!BoundaryRect::new(0, 0, 10, 10).has_offset());
        assert!(!BoundaryRect::new(-5, 0, 10, 10).has_offset());
        assert!(BoundaryRect::new(0, 3, 10, 10).has_offset());
        assert!(BoundaryRect::new(-7, 3, 10, 10).has_offset());
    }

    #[test]
    fn fits_within_checks_every_edge() {
        assert!(BoundaryRect::new(0, 0, 100, 50).fits_within(100, 50));
        assert!(!BoundaryRect::new(1, 0, 100, 50).fits_within(100, 50));
        assert!(!BoundaryRect::new(0, 1, 100, 50).fits_within(100, 50));
        assert!(!BoundaryRect::new(-1, 0, 10, 10).fits_within(100, 50));
        assert!(!BoundaryRect::new(10, 10, 0, 10).fits_within(100, 50));
    }

    #[test]
    fn hue_correction_serializes_snake_case() {
        let json = serde_json::to_string(&HueCorrection::Wrap).unwrap();
        assert_eq!(json, "\"wrap\"");
        assert_eq!(HueCorrection::default(), HueCorrection::Absolute);
    }
}
