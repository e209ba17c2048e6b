//! SIMD-accelerated grayscale thumbnailing.
//!
//! The image is shrunk in RGB and only the finished thumbnail is converted to
//! luma, so hash values match resize-then-grayscale pipelines bit for bit.
//! Every fingerprint in a process goes through [`RESAMPLING_FILTER`]; changing
//! the filter changes absolute hash values.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{imageops, DynamicImage, GrayImage, RgbImage};
use std::path::PathBuf;

/// The one resampling filter used for all thumbnails
pub const RESAMPLING_FILTER: FilterType = FilterType::Bilinear;

/// Grayscale resizer with reusable scratch buffers
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    /// Create a new resizer
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Resize to exactly `width` x `height`, then convert to grayscale.
    ///
    /// Alpha is dropped before resizing.
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        let rgb = image.to_rgb8();

        let src_width = rgb.width();
        let src_height = rgb.height();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::EmptyImage {
                path: PathBuf::new(),
            });
        }

        if width == 0 || height == 0 {
            return Err(resize_error("invalid destination dimensions".to_string()));
        }

        let src_image =
            Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
                .map_err(|e| resize_error(format!("failed to create source image: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8x3);

        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(RESAMPLING_FILTER));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| resize_error(format!("resize failed: {}", e)))?;

        let thumbnail = RgbImage::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| resize_error("failed to create result buffer".to_string()))?;

        Ok(imageops::grayscale(&thumbnail))
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

fn resize_error(reason: String) -> HashError {
    HashError::DecodeError {
        path: PathBuf::new(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn resize_to_grayscale(
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        FastResizer::new().resize_to_grayscale(image, width, height)
    }

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) * 128 / (width + height).max(1)) as u8;
            Rgb([r, g, b])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_to_dhash_grid() {
        let resized = resize_to_grayscale(&create_test_image(200, 100), 9, 8).unwrap();
        assert_eq!(resized.width(), 9);
        assert_eq!(resized.height(), 8);
    }

    #[test]
    fn resize_upsamples_tiny_images() {
        let resized = resize_to_grayscale(&create_test_image(2, 2), 9, 8).unwrap();
        assert_eq!(resized.dimensions(), (9, 8));
    }

    #[test]
    fn resize_is_deterministic() {
        let image = create_test_image(120, 80);
        let mut resizer = FastResizer::new();

        let first = resizer.resize_to_grayscale(&image, 9, 8).unwrap();
        let second = resizer.resize_to_grayscale(&image, 9, 8).unwrap();

        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn gray_source_keeps_its_values() {
        let gray = ImageBuffer::from_pixel(40, 40, Luma([200u8]));
        let resized = resize_to_grayscale(&DynamicImage::ImageLuma8(gray), 9, 8).unwrap();
        assert!(resized.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn colour_is_averaged_before_luma() {
        // Alternating red and green columns: shrinking first blends them to
        // olive, whose luma sits between the two channels' lumas.
        let stripes = ImageBuffer::from_fn(64, 64, |x, _| {
            if x % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 255, 0])
            }
        });
        let red = imageops::grayscale(&RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])))[(0, 0)][0];
        let green = imageops::grayscale(&RgbImage::from_pixel(1, 1, Rgb([0, 255, 0])))[(0, 0)][0];

        let resized = resize_to_grayscale(&DynamicImage::ImageRgb8(stripes), 9, 8).unwrap();

        assert!(resized.pixels().all(|p| p[0] > red && p[0] < green));
    }

    #[test]
    fn zero_sized_source_is_empty_image() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::new(0, 0));
        let result = resize_to_grayscale(&image, 9, 8);
        assert!(matches!(result, Err(HashError::EmptyImage { .. })));
    }

    #[test]
    fn zero_sized_destination_is_rejected() {
        let result = resize_to_grayscale(&create_test_image(10, 10), 0, 8);
        assert!(matches!(result, Err(HashError::DecodeError { .. })));
    }
}
