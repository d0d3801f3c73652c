// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel sampler — renders a decoded image into a flat RGBA byte buffer and
// serves coordinate-indexed reads for the boundary scan.

use esrscan_core::error::{EsrScanError, Result};
use image::{DynamicImage, GenericImageView, Rgba};
use tracing::{debug, instrument};

/// Bytes per pixel in a [`PixelBuffer`] (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// One sampled pixel. Alpha is dropped; the classifier never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbSample {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbSample {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Owned RGBA8 pixel data with premultiplied alpha in the last channel.
///
/// Rows are `stride` bytes apart; `stride` may include trailing padding but is
/// never smaller than `width * 4`. The buffer is immutable once decoded.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl PixelBuffer {
    /// Decode `image` into a tightly packed buffer.
    pub fn decode(image: &DynamicImage) -> Result<Self> {
        let stride = (image.width() as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| EsrScanError::Decode("row size overflows".into()))?;
        Self::decode_with_stride(image, stride)
    }

    /// Decode `image` into a buffer whose rows are `stride` bytes apart.
    ///
    /// The buffer is zeroed before the image is copied in, so padding bytes are
    /// always 0.
    #[instrument(skip(image), fields(width = image.width(), height = image.height()))]
    pub fn decode_with_stride(image: &DynamicImage, stride: usize) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(EsrScanError::Decode(format!(
                "image has no pixels ({width}x{height})"
            )));
        }

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        if stride < row_bytes {
            return Err(EsrScanError::Decode(format!(
                "stride {stride} is smaller than a {width} pixel row"
            )));
        }

        let len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| EsrScanError::Decode("buffer size overflows".into()))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|err| {
            EsrScanError::Decode(format!("could not allocate {len} bytes: {err}"))
        })?;
        data.resize(len, 0);

        // Read straight from the source; a converted RGBA copy would be a second
        // full-size allocation with no way to report failure.
        match image.as_rgba8() {
            Some(rgba) => {
                for (src, dst) in rgba
                    .as_raw()
                    .chunks_exact(row_bytes)
                    .zip(data.chunks_exact_mut(stride))
                {
                    for (px, out) in src
                        .chunks_exact(BYTES_PER_PIXEL)
                        .zip(dst[..row_bytes].chunks_exact_mut(BYTES_PER_PIXEL))
                    {
                        store_premultiplied(out, Rgba([px[0], px[1], px[2], px[3]]));
                    }
                }
            }
            None => {
                for (x, y, px) in image.pixels() {
                    let offset = stride * y as usize + x as usize * BYTES_PER_PIXEL;
                    store_premultiplied(&mut data[offset..offset + BYTES_PER_PIXEL], px);
                }
            }
        }

        debug!(stride, bytes = len, "Pixel buffer decoded");
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Checked read: `None` when `(x, y)` lies outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<RgbSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.sample_at(self.offset(x, y)))
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// Callers must stay inside the image. Debug builds assert it; release
    /// builds rely on slice indexing, which still panics past the end of the
    /// buffer but will not notice an `x` that lands in row padding.
    pub fn read_pixel(&self, x: u32, y: u32) -> RgbSample {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        self.sample_at(self.offset(x, y))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        self.stride * y as usize + x as usize * BYTES_PER_PIXEL
    }

    fn sample_at(&self, offset: usize) -> RgbSample {
        RgbSample {
            red: self.data[offset],
            green: self.data[offset + 1],
            blue: self.data[offset + 2],
        }
    }
}

fn store_premultiplied(out: &mut [u8], Rgba([red, green, blue, alpha]): Rgba<u8>) {
    out[0] = premultiply(red, alpha);
    out[1] = premultiply(green, alpha);
    out[2] = premultiply(blue, alpha);
    out[3] = alpha;
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}
