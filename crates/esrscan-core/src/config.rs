// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: marker color thresholds, scan geometry and the
// optional post-processing steps.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EsrScanError, Result};
use crate::types::HueCorrection;

/// Blur radius used for adaptive thresholding when none is given.
pub const DEFAULT_THRESHOLD_BLUR_RADIUS: f32 = 4.0;

/// HSV window that identifies the orange boundary markers.
///
/// Tuned for the print colour of Swiss ESR slips under indoor lighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerThresholds {
    /// Lowest accepted hue, in degrees.
    pub hue_min: f64,
    /// Highest accepted hue, in degrees (inclusive).
    pub hue_max: f64,
    /// Minimum value, as a raw 0-255 channel magnitude.
    pub value_min: f64,
    /// Minimum saturation in [0, 1].
    pub saturation_min: f64,
}

impl Default for MarkerThresholds {
    fn default() -> Self {
        Self {
            hue_min: 0.0,
            hue_max: 35.0,
            value_min: 150.0,
            saturation_min: 0.25,
        }
    }
}

/// Parameters of the boundary scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub marker: MarkerThresholds,
    pub hue_correction: HueCorrection,
    /// Distance in pixels between consecutive samples on a scan line.
    pub step: u32,
    /// Pixels subtracted from a marker hit to keep the marker inside the crop.
    pub margin: u32,
    /// Scans start `dimension / start_divisor` pixels in from the anchor
    /// corner. The slip's markers never sit in that near band, so it is skipped.
    pub start_divisor: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: MarkerThresholds::default(),
            hue_correction: HueCorrection::Absolute,
            step: 5,
            margin: 10,
            start_divisor: 3,
        }
    }
}

impl ScanConfig {
    /// Reject parameter sets the scan cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(EsrScanError::InvalidConfig(
                "scan step must be at least 1 pixel".into(),
            ));
        }
        if self.start_divisor == 0 {
            return Err(EsrScanError::InvalidConfig(
                "start divisor must be at least 1".into(),
            ));
        }

        let m = &self.marker;
        let all_finite = [m.hue_min, m.hue_max, m.value_min, m.saturation_min]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(EsrScanError::InvalidConfig(
                "marker thresholds must be finite numbers".into(),
            ));
        }
        if m.hue_min > m.hue_max {
            return Err(EsrScanError::InvalidConfig(format!(
                "hue range is inverted: {} > {}",
                m.hue_min, m.hue_max
            )));
        }
        Ok(())
    }
}

/// Optional steps applied after the crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Locate the markers and crop to them.
    pub auto_crop: bool,
    /// Scale so that the longer side equals this many pixels.
    pub max_dimension: Option<u32>,
    /// Invert colours.
    pub invert: bool,
    /// Run adaptive thresholding with this blur radius (pixels).
    pub threshold_blur_radius: Option<f32>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            auto_crop: true,
            max_dimension: None,
            invert: false,
            threshold_blur_radius: None,
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == Some(0) {
            return Err(EsrScanError::InvalidConfig(
                "max dimension must be positive".into(),
            ));
        }
        if let Some(radius) = self.threshold_blur_radius {
            if !radius.is_finite() || radius < 0.0 {
                return Err(EsrScanError::InvalidConfig(format!(
                    "threshold blur radius must be a non-negative number, got {radius}"
                )));
            }
        }
        Ok(())
    }
}

/// Complete scanner settings, usually read from a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub preprocess: PreprocessConfig,
}

impl AppConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.preprocess.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_marker_calibration() {
        let scan = ScanConfig::default();
        assert_eq!(scan.step, 5);
        assert_eq!(scan.margin, 10);
        assert_eq!(scan.start_divisor, 3);
        assert_eq!(scan.marker.hue_min, 0.0);
        assert_eq!(scan.marker.hue_max, 35.0);
        assert_eq!(scan.marker.value_min, 150.0);
        assert_eq!(scan.marker.saturation_min, 0.25);
        assert_eq!(scan.hue_correction, HueCorrection::Absolute);
        assert!(PreprocessConfig::default().auto_crop);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json(r#"{ "scan": { "step": 2, "marker": { "hue_max": 40 } } }"#)
                .expect("valid config");
        assert_eq!(config.scan.step, 2);
        assert_eq!(config.scan.margin, 10);
        assert_eq!(config.scan.marker.hue_max, 40.0);
        assert_eq!(config.scan.marker.value_min, 150.0);
        assert_eq!(config.preprocess, PreprocessConfig::default());
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = AppConfig::from_json(r#"{ "scan": { "step": 0 } }"#).unwrap_err();
        assert!(matches!(err, EsrScanError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_hue_range_is_rejected() {
        let mut scan = ScanConfig::default();
        scan.marker.hue_min = 50.0;
        assert!(matches!(
            scan.validate(),
            Err(EsrScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_blur_radius_is_rejected() {
        let preprocess = PreprocessConfig {
            threshold_blur_radius: Some(-1.0),
            ..Default::default()
        };
        assert!(preprocess.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EsrScanError::Serialization(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "scan": {{ "hue_correction": "wrap" }}, "preprocess": {{ "auto_crop": false }} }}"#
        )
        .expect("write config");

        let config = AppConfig::load(file.path()).expect("load config");
        assert_eq!(config.scan.hue_correction, HueCorrection::Wrap);
        assert!(!config.preprocess.auto_crop);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = AppConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, EsrScanError::Io(_)));
    }
}
