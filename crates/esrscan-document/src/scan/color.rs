// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour classifier — RGB to HSV conversion and the "is this an orange
// boundary marker?" test.

use esrscan_core::config::{MarkerThresholds, ScanConfig};
use esrscan_core::types::HueCorrection;

use super::pixel::RgbSample;

/// A pixel in hue/saturation/value form.
///
/// `hue` is in degrees, `saturation` in [0, 1] and `value` keeps the raw
/// 0-255 channel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvSample {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Convert an RGB sample to HSV.
///
/// The red-max branch uses a truncating remainder, so it yields negative hues
/// when blue exceeds green. `correction` decides how those are folded back:
/// [`HueCorrection::Absolute`] mirrors them around 0 (the calibrated
/// behaviour), [`HueCorrection::Wrap`] adds 360.
pub fn to_hsv(sample: RgbSample, correction: HueCorrection) -> HsvSample {
    let red = f64::from(sample.red);
    let green = f64::from(sample.green);
    let blue = f64::from(sample.blue);

    let rgb_max = red.max(green).max(blue);
    let rgb_min = red.min(green).min(blue);
    let diff = rgb_max - rgb_min;

    let hue = if rgb_max == rgb_min {
        0.0
    } else if rgb_max == red {
        (60.0 * ((green - blue) / diff)) % 360.0
    } else if rgb_max == green {
        60.0 * ((blue - red) / diff) + 120.0
    } else {
        60.0 * ((red - green) / diff) + 240.0
    };

    let hue = match correction {
        HueCorrection::Absolute => hue.abs(),
        HueCorrection::Wrap => hue.rem_euclid(360.0),
    };

    let value = rgb_max;
    let saturation = if rgb_max == 0.0 { 0.0 } else { diff / value };

    HsvSample {
        hue,
        saturation,
        value,
    }
}

/// Decides whether a pixel belongs to an orange boundary marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorClassifier {
    thresholds: MarkerThresholds,
    correction: HueCorrection,
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ColorClassifier {
    pub fn new(thresholds: MarkerThresholds, correction: HueCorrection) -> Self {
        Self {
            thresholds,
            correction,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.marker, config.hue_correction)
    }

    pub fn thresholds(&self) -> &MarkerThresholds {
        &self.thresholds
    }

    pub fn to_hsv(&self, sample: RgbSample) -> HsvSample {
        to_hsv(sample, self.correction)
    }

    /// Hue inside `[hue_min, hue_max]`, value and saturation at or above
    /// their minimums.
    pub fn is_boundary_color(&self, hsv: &HsvSample) -> bool {
        let t = &self.thresholds;
        hsv.hue >= t.hue_min
            && hsv.hue <= t.hue_max
            && hsv.value >= t.value_min
            && hsv.saturation >= t.saturation_min
    }

    /// Convert and classify in one step.
    pub fn classify(&self, sample: RgbSample) -> bool {
        self.is_boundary_color(&self.to_hsv(sample))
    }
}
