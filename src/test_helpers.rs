//! Shared test utilities: synthetic images built in memory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let img = gradient_image(64, 48);      // DynamicImage, RGB8
//! let bytes = jpeg_bytes(4000, 3000);    // encoded input for a backend
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Decoded images
// =========================================================================

/// Opaque RGB image with a horizontal/vertical color ramp.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// RGBA image whose alpha ramps from transparent (left) to opaque (right).
pub fn translucent_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            200,
            (y * 255 / height.max(1)) as u8,
            40,
            (x * 255 / width.max(1)) as u8,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

// =========================================================================
// Encoded inputs
// =========================================================================

fn encode_with_image_crate(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Gradient encoded as baseline JPEG by the `image` crate.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_with_image_crate(&gradient_image(width, height), ImageFormat::Jpeg)
}

/// Gradient encoded as RGB PNG by the `image` crate.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_with_image_crate(&gradient_image(width, height), ImageFormat::Png)
}
