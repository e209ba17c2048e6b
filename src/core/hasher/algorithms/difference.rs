//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resizing to 9 columns x 8 rows, then converting to grayscale
//! 2. Comparing each pixel to the one on its right (8 pairs per row)
//! 3. Setting the bit when the left pixel is strictly brighter
//!
//! The 64 comparisons are packed row-major, first comparison in the most
//! significant bit.

use super::super::fast_decode::FastDecoder;
use super::super::fast_resize::FastResizer;
use super::super::traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind, Signature};
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

/// Side length of the comparison grid
const GRID: u32 = 8;

/// Difference Hash (dHash) implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct DifferenceHasher;

impl DifferenceHasher {
    /// Create a new dHash hasher
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint an already-decoded image
    pub fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        // One extra column so every row yields GRID comparisons
        let gray = FastResizer::new().resize_to_grayscale(image, GRID + 1, GRID)?;

        let mut bits: u64 = 0;
        for y in 0..GRID {
            for x in 0..GRID {
                let left = gray.get_pixel(x, y)[0];
                let right = gray.get_pixel(x + 1, y)[0];
                bits = (bits << 1) | u64::from(left > right);
            }
        }

        Ok(Fingerprint::from_bits(bits))
    }

    /// Decode and fingerprint a file
    pub fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;
        self.hash_image(&image).map_err(|e| e.with_path(path))
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn hash_file(&self, path: &Path) -> Result<Signature, HashError> {
        self.fingerprint_file(path).map(Signature::Perceptual)
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}
