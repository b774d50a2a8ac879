//! Codec parameter derivation: `(format, quality)` → [`EncodeSpec`].
//!
//! One deterministic mapping per format. The thresholds are fixed constants of
//! the tool, kept here so they can be tested in one place:
//!
//! | Format | Derivation |
//! |---|---|
//! | JPEG | quality as-is; 4:4:4 chroma at quality ≥ 90, else 4:2:0; optimized coding always on |
//! | WebP | quality as-is; method fixed at the maximum (6) |
//! | PNG | level = `clamp(round((100 - q) / 11), 0, 9)`; palette iff q < 80 |
//! | AVIF | quality = `max(10, q - 15)`; fixed rav1e speed |

use super::params::{ChromaSubsampling, EncodeSpec, FormatParams, OutputFormat, Quality};

/// libwebp's slowest/smallest method.
pub const WEBP_METHOD: u8 = 6;

/// Subtracted from the user quality before it reaches the AVIF encoder.
pub const AVIF_QUALITY_OFFSET: u32 = 15;
/// Floor for the AVIF effective quality.
pub const AVIF_MIN_QUALITY: u32 = 10;
/// rav1e speed. Roughly the middle of the effort range, leaning slow.
pub const AVIF_SPEED: u8 = 4;

pub const PNG_LEVEL_STEP: f64 = 11.0;
pub const PNG_MAX_LEVEL: u8 = 9;
/// Palette quantization is used strictly below this quality.
pub const PNG_PALETTE_BELOW: u32 = 80;

/// 4:4:4 chroma from this quality upwards.
pub const JPEG_FULL_CHROMA_FROM: u32 = 90;

/// Build the encoder settings for `format` at `quality`.
pub fn encode_spec(format: OutputFormat, quality: Quality) -> EncodeSpec {
    let q = quality.value();
    let params = match format {
        OutputFormat::WebP => FormatParams::WebP {
            quality: q as u8,
            method: WEBP_METHOD,
        },
        OutputFormat::Avif => FormatParams::Avif {
            quality: avif_quality(q) as u8,
            speed: AVIF_SPEED,
        },
        OutputFormat::Png => FormatParams::Png {
            compression_level: png_compression_level(q),
            palette: q < PNG_PALETTE_BELOW,
        },
        OutputFormat::Jpeg => FormatParams::Jpeg {
            quality: q as u8,
            chroma: jpeg_chroma(q),
            optimize: true,
        },
    };

    EncodeSpec {
        format,
        mime_type: format.mime_type(),
        file_extension: format.extension(),
        params,
    }
}

/// AVIF effective quality: `max(10, q - 15)`.
pub fn avif_quality(quality: u32) -> u32 {
    quality
        .saturating_sub(AVIF_QUALITY_OFFSET)
        .max(AVIF_MIN_QUALITY)
}

/// PNG deflate level: `clamp(round((100 - q) / 11), 0, 9)`.
pub fn png_compression_level(quality: u32) -> u8 {
    let raw = (100u32.saturating_sub(quality) as f64 / PNG_LEVEL_STEP).round();
    raw.clamp(0.0, PNG_MAX_LEVEL as f64) as u8
}

pub fn jpeg_chroma(quality: u32) -> ChromaSubsampling {
    if quality >= JPEG_FULL_CHROMA_FROM {
        ChromaSubsampling::Full
    } else {
        ChromaSubsampling::Half
    }
}
