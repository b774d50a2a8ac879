//! Per-codec encoders. Each takes a decoded (and already resized) image plus
//! the [`FormatParams`] derived for it, and returns the encoded bytes.
//!
//! | Format | Crate |
//! |---|---|
//! | JPEG | `mozjpeg` (optimized coding, explicit chroma sampling) |
//! | WebP | `webp` / libwebp (lossy, `method` = effort) |
//! | PNG | `png`, with `color_quant` NeuQuant for palette output |
//! | AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |

use super::backend::BackendError;
use super::params::{ChromaSubsampling, EncodeSpec, FormatParams};
use image::DynamicImage;
use std::io::Cursor;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Colors in a quantized PNG palette.
const PALETTE_COLORS: usize = 256;
/// NeuQuant sampling factor: 1 = every pixel (slow), 30 = fastest.
const NEUQUANT_SAMPLE_FACTOR: i32 = 10;

/// Encode `img` according to `spec`.
pub fn encode(img: &DynamicImage, spec: &EncodeSpec) -> Result<Vec<u8>, BackendError> {
    match spec.params {
        FormatParams::Jpeg {
            quality,
            chroma,
            optimize,
        } => encode_jpeg(img, quality, chroma, optimize),
        FormatParams::WebP { quality, method } => encode_webp(img, quality, method),
        FormatParams::Png {
            compression_level,
            palette: true,
        } => encode_png_palette(img, compression_level),
        FormatParams::Png {
            compression_level,
            palette: false,
        } => encode_png_truecolor(img, compression_level),
        FormatParams::Avif { quality, speed } => encode_avif(img, quality, speed),
    }
}

/// JPEG via mozjpeg. Alpha is dropped.
///
/// libjpeg reports fatal errors by unwinding, so the whole compress runs under
/// `catch_unwind` and a panic becomes an encode error.
fn encode_jpeg(
    img: &DynamicImage,
    quality: u8,
    chroma: ChromaSubsampling,
    optimize: bool,
) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let sampling = chroma.pixel_sizes();

    let outcome = catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_chroma_sampling_pixel_sizes(sampling, sampling);
        comp.set_optimize_coding(optimize);

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(rgb.as_raw())?;
        started.finish()
    }));

    match outcome {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(BackendError::encode("jpeg", e)),
        Err(_) => Err(BackendError::encode("jpeg", "mozjpeg aborted the compress")),
    }
}

/// Lossy WebP via libwebp. Alpha is kept when the source has it.
fn encode_webp(img: &DynamicImage, quality: u8, method: u8) -> Result<Vec<u8>, BackendError> {
    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::encode("webp", "failed to initialise WebPConfig"))?;
    config.quality = quality as f32;
    config.method = method as i32;

    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
        let memory = encoder.encode_advanced(&config);
        memory.map(|mem| mem.to_vec())
    } else {
        let rgb = img.to_rgb8();
        let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
        let memory = encoder.encode_advanced(&config);
        memory.map(|mem| mem.to_vec())
    };

    encoded.map_err(|e| BackendError::encode("webp", format!("{e:?}")))
}

/// Map a 0–9 deflate level onto the png crate's presets.
pub(crate) fn png_compression(level: u8) -> png::Compression {
    match level {
        0..=2 => png::Compression::Fast,
        3..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

fn png_error(e: png::EncodingError) -> BackendError {
    BackendError::encode("png", e)
}

/// 8-bit RGB or RGBA PNG, depending on whether the source carries alpha.
fn encode_png_truecolor(img: &DynamicImage, level: u8) -> Result<Vec<u8>, BackendError> {
    let (color, width, height, data) = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        (png::ColorType::Rgba, w, h, rgba.into_raw())
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        (png::ColorType::Rgb, w, h, rgb.into_raw())
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png_compression(level));
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
        let mut writer = encoder.write_header().map_err(png_error)?;
        writer.write_image_data(&data).map_err(png_error)?;
        writer.finish().map_err(png_error)?;
    }
    Ok(out)
}

/// Indexed PNG: NeuQuant down to at most 256 colors, with a tRNS chunk when
/// any palette entry is translucent.
fn encode_png_palette(img: &DynamicImage, level: u8) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.as_raw();

    let quantizer = color_quant::NeuQuant::new(NEUQUANT_SAMPLE_FACTOR, PALETTE_COLORS, pixels);
    let indices: Vec<u8> = pixels
        .chunks_exact(4)
        .map(|px| quantizer.index_of(px) as u8)
        .collect();

    let color_map = quantizer.color_map_rgba();
    let mut palette = Vec::with_capacity(color_map.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(color_map.len() / 4);
    for entry in color_map.chunks_exact(4) {
        palette.extend_from_slice(&entry[..3]);
        alpha.push(entry[3]);
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(palette);
        if alpha.iter().any(|&a| a != u8::MAX) {
            encoder.set_trns(alpha);
        }
        encoder.set_compression(png_compression(level));
        let mut writer = encoder.write_header().map_err(png_error)?;
        writer.write_image_data(&indices).map_err(png_error)?;
        writer.finish().map_err(png_error)?;
    }
    Ok(out)
}

/// AVIF via the image crate's rav1e-backed encoder.
fn encode_avif(img: &DynamicImage, quality: u8, speed: u8) -> Result<Vec<u8>, BackendError> {
    // rav1e only accepts 8-bit RGB(A) here; normalize so exotic decoders
    // (16-bit PNG, grayscale+alpha, float TIFF) still encode.
    let normalized = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut buf, speed, quality);
    normalized
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::encode("avif", e))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::imaging::codec::encode_spec;
    use crate::imaging::params::OutputFormat;
    use crate::test_helpers::{gradient_image, translucent_image};

    fn encode_as(img: &DynamicImage, format: OutputFormat, quality: i64) -> Vec<u8> {
        encode(img, &encode_spec(format, Quality::new(quality))).unwrap()
    }

    #[test]
    fn jpeg_has_soi_marker_and_decodes() {
        let img = gradient_image(64, 48);
        let data = encode_as(&img, OutputFormat::Jpeg, 80);
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    /// Sampling byte of the first (luma) component in the JPEG frame header.
    fn jpeg_luma_sampling(data: &[u8]) -> u8 {
        let mut pos = 2;
        while pos + 11 < data.len() {
            assert_eq!(data[pos], 0xFF, "lost marker sync at {pos}");
            let marker = data[pos + 1];
            if (0xC0..=0xC2).contains(&marker) {
                return data[pos + 11];
            }
            let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            pos += 2 + len;
        }
        panic!("no SOF marker found");
    }

    #[test]
    fn jpeg_chroma_sampling_follows_quality() {
        let img = gradient_image(64, 64);
        // 4:2:0 → luma block is 2x2 chroma samples
        assert_eq!(jpeg_luma_sampling(&encode_as(&img, OutputFormat::Jpeg, 89)), 0x22);
        // 4:4:4 → every component 1x1
        assert_eq!(jpeg_luma_sampling(&encode_as(&img, OutputFormat::Jpeg, 90)), 0x11);
    }

    #[test]
    fn jpeg_drops_alpha() {
        let img = translucent_image(32, 32);
        let data = encode_as(&img, OutputFormat::Jpeg, 70);
        let decoded = image::load_from_memory(&data).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn webp_is_riff_container() {
        let img = gradient_image(64, 48);
        let data = encode_as(&img, OutputFormat::WebP, 80);
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn webp_keeps_alpha() {
        let img = translucent_image(32, 32);
        let data = encode_as(&img, OutputFormat::WebP, 80);
        let decoded = image::load_from_memory(&data).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn png_truecolor_above_palette_threshold() {
        let img = gradient_image(40, 30);
        let data = encode_as(&img, OutputFormat::Png, 90);
        assert_eq!(&data[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoder = png::Decoder::new(std::io::Cursor::new(&data));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().color_type, png::ColorType::Rgb);
    }

    #[test]
    fn png_palette_below_threshold() {
        let img = gradient_image(40, 30);
        let data = encode_as(&img, OutputFormat::Png, 60);

        let decoder = png::Decoder::new(std::io::Cursor::new(&data));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().color_type, png::ColorType::Indexed);
        assert_eq!((reader.info().width, reader.info().height), (40, 30));
    }

    #[test]
    fn png_palette_keeps_transparency() {
        let img = translucent_image(16, 16);
        let data = encode_as(&img, OutputFormat::Png, 50);

        let decoder = png::Decoder::new(std::io::Cursor::new(&data));
        let reader = decoder.read_info().unwrap();
        assert!(reader.info().trns.is_some());

        let decoded = image::load_from_memory(&data).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn png_compression_buckets() {
        assert!(matches!(png_compression(0), png::Compression::Fast));
        assert!(matches!(png_compression(5), png::Compression::Default));
        assert!(matches!(png_compression(9), png::Compression::Best));
    }

    #[test]
    fn avif_has_ftyp_box() {
        let img = gradient_image(32, 24);
        let data = encode_as(&img, OutputFormat::Avif, 80);
        assert_eq!(&data[4..8], b"ftyp");
    }
}
