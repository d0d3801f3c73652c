// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image filters consumed by the preprocess pipeline: colour inversion and
// adaptive thresholding. The pipeline only sees the `ImageFilter` trait, so a
// GPU or platform backend can replace the default one.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::box_filter;
use tracing::{debug, instrument};

/// The two whole-image filters the pipeline depends on.
///
/// Implementations must be deterministic and keep the image dimensions.
pub trait ImageFilter {
    /// Invert the colour channels, leaving alpha alone.
    fn invert_colors(&self, image: &DynamicImage) -> DynamicImage;

    /// Binarise against a local mean computed over `blur_radius` pixels.
    fn adaptive_threshold(&self, image: &DynamicImage, blur_radius: f32) -> DynamicImage;
}

/// CPU filter backend built on `image` and `imageproc`.
///
/// Thresholding follows the usual camera-scan recipe: box-blur the luminance,
/// then keep a pixel white unless it is darker than its blurred neighbourhood
/// by more than [`LocalMeanFilter::offset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMeanFilter {
    offset: f32,
}

impl LocalMeanFilter {
    /// Default darkness margin, 5% of full scale.
    pub const DEFAULT_OFFSET: f32 = 0.05 * 255.0;

    pub fn new(offset: f32) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}

impl Default for LocalMeanFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_OFFSET)
    }
}

impl ImageFilter for LocalMeanFilter {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn invert_colors(&self, image: &DynamicImage) -> DynamicImage {
        let mut inverted = image.clone();
        inverted.invert();
        debug!("Colours inverted");
        inverted
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn adaptive_threshold(&self, image: &DynamicImage, blur_radius: f32) -> DynamicImage {
        let gray = image.to_luma8();
        let radius = blur_radius.max(0.0).round() as u32;
        let local_mean = box_filter(&gray, radius, radius);

        let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let luma = f32::from(gray.get_pixel(x, y).0[0]);
            let mean = f32::from(local_mean.get_pixel(x, y).0[0]);
            if luma >= mean - self.offset {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });

        debug!(radius, "Adaptive threshold applied");
        DynamicImage::ImageLuma8(binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn invert_flips_colour_and_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([10, 200, 0, 77])));
        let out = LocalMeanFilter::default().invert_colors(&img).to_rgba8();
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.get_pixel(2, 1), &Rgba([245, 55, 255, 77]));
    }

    #[test]
    fn invert_twice_is_identity() {
        let mut base = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        base.put_pixel(2, 3, Rgba([90, 0, 180, 255]));
        let img = DynamicImage::ImageRgba8(base);
        let filter = LocalMeanFilter::default();
        let twice = filter.invert_colors(&filter.invert_colors(&img));
        assert_eq!(twice, img);
    }

    #[test]
    fn threshold_keeps_flat_regions_white() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 10, Luma([90])));
        let out = LocalMeanFilter::default()
            .adaptive_threshold(&img, 4.0)
            .to_luma8();
        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn threshold_blackens_dark_strokes() {
        let mut gray = GrayImage::from_pixel(21, 21, Luma([230]));
        for y in 0..21 {
            gray.put_pixel(10, y, Luma([20]));
        }
        let img = DynamicImage::ImageLuma8(gray);
        let out = LocalMeanFilter::default()
            .adaptive_threshold(&img, 4.0)
            .to_luma8();
        assert_eq!(out.get_pixel(10, 10).0[0], 0);
        assert_eq!(out.get_pixel(2, 10).0[0], 255);
    }

    #[test]
    fn threshold_is_deterministic() {
        let mut gray = GrayImage::from_pixel(16, 16, Luma([180]));
        gray.put_pixel(4, 4, Luma([10]));
        let img = DynamicImage::ImageLuma8(gray);
        let filter = LocalMeanFilter::default();
        assert_eq!(
            filter.adaptive_threshold(&img, 2.0),
            filter.adaptive_threshold(&img, 2.0)
        );
    }
}
