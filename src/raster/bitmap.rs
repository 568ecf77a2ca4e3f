//! # Monochrome Dot Matrix
//!
//! Converts a decoded image into printer dots by luminance threshold:
//!
//! ```text
//! L = 0.3 R + 0.59 G + 0.11 B        dot = L < 127
//! ```
//!
//! Transparent pixels are treated as white paper. Images wider than the
//! printer are scaled down first, keeping the aspect ratio.

use std::path::Path;

use image::{DynamicImage, ImageError, imageops::FilterType};
use tracing::debug;

use crate::error::{Result, TagprintError};
use crate::protocol::graphics;

/// Luminance below which a pixel prints black.
pub const THRESHOLD: f32 = 127.0;

/// Row-major boolean dot matrix, `true` = black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotMatrix {
    width: usize,
    height: usize,
    dots: Vec<bool>,
}

impl DotMatrix {
    /// All-white matrix.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![false; width * height],
        }
    }

    /// Build a matrix from a dot predicate.
    pub fn from_fn(width: usize, height: usize, mut dot: impl FnMut(usize, usize) -> bool) -> Self {
        let mut dots = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                dots.push(dot(x, y));
            }
        }
        Self {
            width,
            height,
            dots,
        }
    }

    /// Threshold an image, scaling it down to `max_width` dots first.
    pub fn from_image(image: &DynamicImage, max_width: usize) -> Self {
        let scaled;
        let image = if max_width > 0 && image.width() as usize > max_width {
            let aspect = image.height() as f32 / image.width() as f32;
            let height = ((max_width as f32 * aspect).round() as u32).max(1);
            debug!(
                from = image.width(),
                to = max_width,
                "scaling bitmap to printer width"
            );
            scaled = image.resize_exact(max_width as u32, height, FilterType::Triangle);
            &scaled
        } else {
            image
        };

        let rgba = image.to_rgba8();
        Self::from_fn(rgba.width() as usize, rgba.height() as usize, |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x as u32, y as u32).0;
            if a < 128 {
                return false;
            }
            luminance(r, g, b) < THRESHOLD
        })
    }

    /// Load and threshold an image file.
    ///
    /// An unreadable file is [`TagprintError::AssetMissing`]; one that
    /// reads but does not decode is [`TagprintError::Image`].
    pub fn load(path: &Path, max_width: usize) -> Result<Self> {
        let image = image::open(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "bitmap load failed");
            match e {
                ImageError::IoError(_) => TagprintError::AssetMissing {
                    path: path.display().to_string(),
                },
                other => TagprintError::Image(format!("{}: {}", path.display(), other)),
            }
        })?;
        Ok(Self::from_image(&image, max_width))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.dots[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Device bytes for the whole matrix, `skip` spaces before each band.
    pub fn to_raster(&self, skip: u8) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        graphics::raster(&self.dots, self.width, self.height, skip)
    }
}

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.3 * r as f32 + 0.59 * g as f32 + 0.11 * b as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn image_of(pixels: &[[u8; 4]], width: u32) -> DynamicImage {
        let height = pixels.len() as u32 / width;
        let mut img = RgbaImage::new(width, height);
        for (i, p) in pixels.iter().enumerate() {
            img.put_pixel(i as u32 % width, i as u32 / width, Rgba(*p));
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_threshold() {
        let img = image_of(
            &[
                [0, 0, 0, 255],       // black
                [255, 255, 255, 255], // white
                [126, 126, 126, 255], // just below
                [127, 127, 127, 255], // at threshold, white
            ],
            4,
        );
        let m = DotMatrix::from_image(&img, 576);
        assert_eq!((m.get(0, 0), m.get(1, 0), m.get(2, 0), m.get(3, 0)), (true, false, true, false));
    }

    #[test]
    fn test_luminance_weights() {
        // pure red: 0.3 * 255 = 76.5 → black; pure green: 150.45 → white
        let img = image_of(&[[255, 0, 0, 255], [0, 255, 0, 255]], 2);
        let m = DotMatrix::from_image(&img, 576);
        assert!(m.get(0, 0));
        assert!(!m.get(1, 0));
    }

    #[test]
    fn test_transparent_is_white() {
        let img = image_of(&[[0, 0, 0, 0]], 1);
        assert!(!DotMatrix::from_image(&img, 576).get(0, 0));
    }

    #[test]
    fn test_wide_image_scaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(800, 100, Rgba([0, 0, 0, 255])));
        let m = DotMatrix::from_image(&img, 400);
        assert_eq!(m.width(), 400);
        assert_eq!(m.height(), 50);
        assert!(m.get(10, 10));
    }

    #[test]
    fn test_missing_file() {
        let err = DotMatrix::load(Path::new("/nonexistent/logo.png"), 576).unwrap_err();
        assert!(matches!(err, TagprintError::AssetMissing { .. }));
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = DotMatrix::load(&path, 576).unwrap_err();
        assert!(matches!(err, TagprintError::Image(_)), "{:?}", err);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_raster_has_one_header_per_band() {
        let m = DotMatrix::from_fn(16, 25, |x, _| x % 2 == 0);
        let bytes = m.to_raster(0);
        let headers = bytes.windows(5).filter(|w| *w == [0x1B, b'*', 33, 16, 0]).count();
        assert_eq!(headers, 2);
        assert!(DotMatrix::new(0, 0).to_raster(0).is_empty());
    }
}
