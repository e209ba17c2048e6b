//! Synthesized test images.
//!
//! The three patterns have dHash fingerprints far apart from one another:
//! a left-to-right ramp hashes to all zeros, a right-to-left ramp to all
//! ones, and a bright-left/dark-right split sets only the bits at the edge.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use std::path::Path;

const SIZE: u32 = 64;

pub fn rising_ramp() -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, _| Luma([(x * 4) as u8]))
}

pub fn falling_ramp() -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, _| Luma([255 - (x * 4) as u8]))
}

pub fn split() -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, _| Luma([if x < SIZE / 2 { 230 } else { 20 }]))
}

pub fn flat() -> GrayImage {
    GrayImage::from_pixel(SIZE, SIZE, Luma([128]))
}

/// [`flat`] with a single pixel row replaced by a right-to-left ramp
pub fn flat_with_ramp_row(row: u32) -> GrayImage {
    let mut image = flat();
    for x in 0..SIZE {
        image.put_pixel(x, row, Luma([255 - (x * 4) as u8]));
    }
    image
}

pub fn save(image: &GrayImage, path: impl AsRef<Path>) {
    image.save(path.as_ref()).unwrap();
}
