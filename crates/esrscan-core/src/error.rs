// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the slip scanner.

use thiserror::Error;

use crate::types::BoundaryRect;

/// Top-level error type for all scanner operations.
///
/// "No boundary found" is deliberately absent: a slip without visible markers
/// is a valid outcome and is handled by skipping the crop.
#[derive(Debug, Error)]
pub enum EsrScanError {
    // -- Pixel decoding --
    #[error("failed to decode image into a pixel buffer: {0}")]
    Decode(String),

    // -- Geometry --
    #[error("crop rectangle {rect} lies outside the {width}x{height} image")]
    Crop {
        rect: BoundaryRect,
        width: u32,
        height: u32,
    },

    // -- Image codec / filters --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EsrScanError>;
