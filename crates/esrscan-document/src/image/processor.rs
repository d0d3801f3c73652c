// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — landscape rotation, bounds-checked crop, scaling and
// debug outlines. Operates on in-memory images using the `image` and
// `imageproc` crates.

use esrscan_core::error::{EsrScanError, Result};
use esrscan_core::types::BoundaryRect;
use image::{DynamicImage, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, info, instrument};

/// Colour used by [`ImageProcessor::outline`] when none is given.
pub const OUTLINE_RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Image operations on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, so calls chain:
///
/// ```ignore
/// let slip = ImageProcessor::open("slip.jpg")?
///     .rotate_to_landscape()
///     .crop(rect)?
///     .scale_to_max_dimension(1200)
///     .save("slip.png")?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            EsrScanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Turn portrait images a quarter turn counter-clockwise; landscape and
    /// square images pass through untouched.
    ///
    /// Phones photograph the slip upright while the slip itself is printed in
    /// landscape.
    pub fn rotate_to_landscape(self) -> Self {
        if self.image.height() > self.image.width() {
            info!(
                width = self.image.width(),
                height = self.image.height(),
                "Portrait image, rotating to landscape"
            );
            Self {
                image: self.image.rotate270(),
            }
        } else {
            self
        }
    }

    /// Crop to `rect`. Fails with [`EsrScanError::Crop`] unless the rectangle
    /// is non-empty and lies entirely inside the image.
    pub fn crop(self, rect: BoundaryRect) -> Result<Self> {
        let image = crop(&self.image, rect)?;
        Ok(Self { image })
    }

    /// Scale uniformly so the longer side equals `max_dimension`.
    ///
    /// Scales up as well as down. The shorter side is rounded and never drops
    /// below one pixel.
    #[instrument(skip(self))]
    pub fn scale_to_max_dimension(self, max_dimension: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width == 0 || height == 0 || max_dimension == 0 {
            return self;
        }

        let (new_w, new_h) = scaled_size(width, height, max_dimension);
        if (new_w, new_h) == (width, height) {
            return self;
        }

        info!(
            from_w = width,
            from_h = height,
            new_w,
            new_h,
            "Scaling image"
        );
        let scaled = self
            .image
            .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3);
        Self { image: scaled }
    }

    /// Stroke a one-pixel outline of `rect` onto the image, for checking a
    /// detected boundary by eye.
    ///
    /// Parts of the rectangle outside the image are clipped. Empty rectangles
    /// leave the image unchanged.
    pub fn outline(self, rect: BoundaryRect, color: Rgba<u8>) -> Self {
        let Some(shape) = to_imageproc_rect(rect) else {
            debug!(%rect, "Nothing to outline");
            return self;
        };
        let mut canvas = self.image.to_rgba8();
        draw_hollow_rect_mut(&mut canvas, shape, color);
        Self {
            image: DynamicImage::ImageRgba8(canvas),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            EsrScanError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Copy the region `rect` out of `image`.
///
/// Never clamps: a rectangle that is empty or reaches past any edge is an
/// error, so the caller can fall back to the uncropped image.
#[instrument(skip_all, fields(%rect))]
pub fn crop(image: &DynamicImage, rect: BoundaryRect) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if !rect.fits_within(width, height) {
        return Err(EsrScanError::Crop {
            rect,
            width,
            height,
        });
    }

    // fits_within guarantees every field is in 0..=u32::MAX.
    let cropped = image.crop_imm(
        rect.x as u32,
        rect.y as u32,
        rect.width as u32,
        rect.height as u32,
    );
    info!(
        width = cropped.width(),
        height = cropped.height(),
        "Image cropped"
    );
    Ok(cropped)
}

fn scaled_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max = f64::from(max_dimension);
    let shorter = |long: u32, short: u32| {
        ((max * f64::from(short) / f64::from(long)).round() as u32).max(1)
    };
    if width > height {
        (max_dimension, shorter(width, height))
    } else {
        (shorter(height, width), max_dimension)
    }
}

fn to_imageproc_rect(rect: BoundaryRect) -> Option<Rect> {
    let x = i32::try_from(rect.x).ok()?;
    let y = i32::try_from(rect.y).ok()?;
    let width = u32::try_from(rect.width).ok().filter(|&w| w > 0)?;
    let height = u32::try_from(rect.height).ok().filter(|&h| h > 0)?;
    Some(Rect::at(x, y).of_size(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn landscape_passes_through_unchanged() {
        let img = gradient(40, 30);
        let out = ImageProcessor::from_dynamic(img.clone())
            .rotate_to_landscape()
            .into_dynamic();
        assert_eq!(out, img);

        let square = gradient(25, 25);
        let out = ImageProcessor::from_dynamic(square.clone())
            .rotate_to_landscape()
            .into_dynamic();
        assert_eq!(out, square);
    }

    #[test]
    fn portrait_turns_counter_clockwise() {
        let img = gradient(30, 40);
        let out = ImageProcessor::from_dynamic(img.clone())
            .rotate_to_landscape()
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (40, 30));
        // The top-right corner of the portrait ends up top-left.
        assert_eq!(
            out.to_rgba8().get_pixel(0, 0),
            img.to_rgba8().get_pixel(29, 0)
        );
        assert_eq!(out, img.rotate270());
    }

    #[test]
    fn crop_inside_bounds() {
        let img = gradient(100, 60);
        let out = crop(&img, BoundaryRect::new(10, 20, 89, 39)).expect("crop");
        assert_eq!((out.width(), out.height()), (89, 39));
        assert_eq!(
            out.to_rgba8().get_pixel(0, 0),
            img.to_rgba8().get_pixel(10, 20)
        );
    }

    #[test]
    fn crop_full_image_is_allowed() {
        let img = gradient(10, 10);
        let out = crop(&img, BoundaryRect::new(0, 0, 10, 10)).expect("crop");
        assert_eq!(out, img);
    }

    #[test]
    fn crop_outside_bounds_is_rejected() {
        let img = gradient(100, 60);
        for rect in [
            BoundaryRect::new(-1, 0, 10, 10),
            BoundaryRect::new(0, -4, 10, 10),
            BoundaryRect::new(95, 0, 10, 10),
            BoundaryRect::new(0, 55, 10, 10),
            BoundaryRect::new(200, 200, 5, 5),
            BoundaryRect::new(5, 5, 0, 10),
        ] {
            let err = crop(&img, rect).unwrap_err();
            match err {
                EsrScanError::Crop {
                    rect: rejected,
                    width,
                    height,
                } => {
                    assert_eq!(rejected, rect);
                    assert_eq!((width, height), (100, 60));
                }
                other => panic!("expected crop error, got {other:?}"),
            }
        }
    }

    #[test]
    fn scale_landscape_and_portrait() {
        let out = ImageProcessor::from_dynamic(gradient(400, 100)).scale_to_max_dimension(200);
        assert_eq!((out.width(), out.height()), (200, 50));

        let out = ImageProcessor::from_dynamic(gradient(90, 300)).scale_to_max_dimension(100);
        assert_eq!((out.width(), out.height()), (30, 100));

        let out = ImageProcessor::from_dynamic(gradient(20, 10)).scale_to_max_dimension(60);
        assert_eq!((out.width(), out.height()), (60, 30));
    }

    #[test]
    fn scale_keeps_thin_images_visible() {
        assert_eq!(scaled_size(1000, 1, 10), (10, 1));
    }

    #[test]
    fn outline_draws_border_only() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255])));
        let out = ImageProcessor::from_dynamic(img)
            .outline(BoundaryRect::new(5, 5, 10, 10), OUTLINE_RED)
            .into_dynamic()
            .to_rgba8();
        assert_eq!(out.get_pixel(5, 5), &OUTLINE_RED);
        assert_eq!(out.get_pixel(14, 14), &OUTLINE_RED);
        assert_eq!(out.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 2), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn outline_of_empty_rect_is_noop() {
        let img = gradient(10, 10);
        let out = ImageProcessor::from_dynamic(img.clone())
            .outline(BoundaryRect::new(2, 2, 0, 4), OUTLINE_RED)
            .into_dynamic();
        assert_eq!(out, img);
    }

    #[test]
    fn save_and_open_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("slip.png");
        let img = gradient(9, 6);
        ImageProcessor::from_dynamic(img.clone())
            .save(&path)
            .expect("save");
        let loaded = ImageProcessor::open(&path).expect("open");
        assert_eq!(loaded.into_dynamic().to_rgba8(), img.to_rgba8());
    }
}
