// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slip scanning — pixel sampling, orange marker classification, boundary
// location and the preprocess pipeline built on them.

pub mod boundary;
pub mod color;
pub mod filter;
pub mod pipeline;
pub mod pixel;

pub use boundary::BoundaryLocator;
pub use pipeline::Preprocessor;
