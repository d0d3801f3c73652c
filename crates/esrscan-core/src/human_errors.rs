// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every failure reaches the user as "we couldn't process this image" plus a
// hint about what to change. Nothing here is retriable: the scan is
// deterministic, so the same photo always gives the same result.

use crate::error::EsrScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must do something (retake the photo, fix a setting).
    ActionRequired,
    /// Cannot be fixed by the user, e.g. a corrupt file.
    Permanent,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether repeating the same operation could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

const COULD_NOT_PROCESS: &str = "We couldn't process this image.";

/// Convert an `EsrScanError` into a `HumanError`.
pub fn humanize_error(err: &EsrScanError) -> HumanError {
    let (suggestion, severity) = match err {
        EsrScanError::Decode(_) => (
            "The photo appears to be empty or too large. Take the picture again.".to_string(),
            Severity::ActionRequired,
        ),
        EsrScanError::Crop { .. } => (
            "The payment slip could not be cut out. Make sure the whole slip is in the picture."
                .to_string(),
            Severity::ActionRequired,
        ),
        EsrScanError::ImageError(_) => (
            "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first."
                .to_string(),
            Severity::Permanent,
        ),
        EsrScanError::InvalidConfig(detail) => (
            format!("Check the scanner settings. ({detail})"),
            Severity::ActionRequired,
        ),
        EsrScanError::Io(_) => (
            "The file could not be read or written. Check that it exists and that you may access it."
                .to_string(),
            Severity::ActionRequired,
        ),
        EsrScanError::Serialization(_) => (
            "The settings file is not valid JSON.".to_string(),
            Severity::ActionRequired,
        ),
    };

    HumanError {
        message: COULD_NOT_PROCESS.into(),
        suggestion,
        retriable: false,
        severity,
    }
}
