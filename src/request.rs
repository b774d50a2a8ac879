//! Input validation: raw form-style fields → [`TranscodeRequest`].
//!
//! Validation is lenient by policy. The only rejected input is a missing or
//! empty image; every other field falls back silently (with a `warn!` log):
//!
//! | Field | Absent / empty | Unparseable |
//! |---|---|---|
//! | `format` | WebP | JPEG |
//! | `quality` | 80 | 80 (parsed values are clamped to 10–100) |
//! | `max_width` / `max_height` | no bound | no bound (also for `<= 0`) |
//! | `fit` | inside | inside |
//!
//! Integers are read the way HTML form handlers usually read them: leading
//! whitespace and sign, then as many digits as are present, so `"1200px"`
//! is 1200 and `"12.5"` is 12.

use crate::imaging::{FitMode, OutputFormat, Quality};
use crate::transcode::TranscodeError;
use tracing::warn;

/// Filename stem used when the caller supplies none.
pub const DEFAULT_FILENAME: &str = "image";

/// Unvalidated fields as they arrive from a form, CLI, or config layer.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    pub image: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub max_width: Option<String>,
    pub max_height: Option<String>,
    pub fit: Option<String>,
}

impl RawFields {
    pub fn new(image: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            filename: Some(filename.into()),
            ..Self::default()
        }
    }
}

/// A validated request. `quality` is already clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    pub image_bytes: Vec<u8>,
    pub format: OutputFormat,
    pub quality: Quality,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub fit: FitMode,
    pub source_filename: String,
}

/// Normalize raw fields into a [`TranscodeRequest`].
///
/// Fails only with [`TranscodeError::MissingInput`].
pub fn validate(raw: RawFields) -> Result<TranscodeRequest, TranscodeError> {
    let image_bytes = match raw.image {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(TranscodeError::MissingInput),
    };

    Ok(TranscodeRequest {
        image_bytes,
        format: resolve_format(raw.format.as_deref()),
        quality: resolve_quality(raw.quality.as_deref()),
        max_width: resolve_bound("max_width", raw.max_width.as_deref()),
        max_height: resolve_bound("max_height", raw.max_height.as_deref()),
        fit: resolve_fit(raw.fit.as_deref()),
        source_filename: raw
            .filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
    })
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Absent → WebP; unrecognized → JPEG.
pub fn resolve_format(value: Option<&str>) -> OutputFormat {
    if is_blank(value) {
        return OutputFormat::WebP;
    }
    let value = value.unwrap_or_default();
    OutputFormat::from_name(value).unwrap_or_else(|| {
        warn!(format = value, "unrecognized output format, falling back to jpeg");
        OutputFormat::Jpeg
    })
}

pub fn resolve_quality(value: Option<&str>) -> Quality {
    if is_blank(value) {
        return Quality::default();
    }
    let value = value.unwrap_or_default();
    match parse_leading_int(value) {
        Some(q) => Quality::new(q),
        None => {
            warn!(quality = value, "unparseable quality, using default");
            Quality::default()
        }
    }
}

/// A positive integer bound, or `None`.
pub fn resolve_bound(field: &str, value: Option<&str>) -> Option<u32> {
    if is_blank(value) {
        return None;
    }
    let value = value.unwrap_or_default();
    match parse_leading_int(value) {
        Some(n) if n > 0 => Some(n.min(u32::MAX as i64) as u32),
        _ => {
            warn!(field, value, "ignoring invalid size bound");
            None
        }
    }
}

pub fn resolve_fit(value: Option<&str>) -> FitMode {
    if is_blank(value) {
        return FitMode::default();
    }
    let value = value.unwrap_or_default();
    FitMode::from_name(value).unwrap_or_else(|| {
        warn!(fit = value, "unrecognized fit mode, using inside");
        FitMode::default()
    })
}

/// Parse the leading integer of `s`: optional whitespace, optional sign, digits.
/// Saturates instead of overflowing. `None` when no digit is present.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add((d - b'0') as i64)
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(image: &[u8]) -> RawFields {
        RawFields::new(image.to_vec(), "holiday.png")
    }

    // =========================================================================
    // Missing input
    // =========================================================================

    #[test]
    fn missing_image_is_rejected() {
        let raw = RawFields::default();
        assert!(matches!(validate(raw), Err(TranscodeError::MissingInput)));
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(matches!(
            validate(fields(&[])),
            Err(TranscodeError::MissingInput)
        ));
    }

    #[test]
    fn defaults_when_only_image_given() {
        let req = validate(fields(&[1, 2, 3])).unwrap();
        assert_eq!(req.image_bytes, vec![1, 2, 3]);
        assert_eq!(req.format, OutputFormat::WebP);
        assert_eq!(req.quality.value(), 80);
        assert_eq!(req.max_width, None);
        assert_eq!(req.max_height, None);
        assert_eq!(req.fit, FitMode::Inside);
        assert_eq!(req.source_filename, "holiday.png");
    }

    #[test]
    fn missing_filename_uses_placeholder() {
        let raw = RawFields {
            image: Some(vec![1]),
            filename: Some("  ".into()),
            ..RawFields::default()
        };
        assert_eq!(validate(raw).unwrap().source_filename, "image");
    }

    // =========================================================================
    // Format
    // =========================================================================

    #[test]
    fn format_absent_or_empty_is_webp() {
        assert_eq!(resolve_format(None), OutputFormat::WebP);
        assert_eq!(resolve_format(Some("")), OutputFormat::WebP);
    }

    #[test]
    fn format_unrecognized_falls_back_to_jpeg() {
        assert_eq!(resolve_format(Some("bmp")), OutputFormat::Jpeg);
        assert_eq!(resolve_format(Some("heic")), OutputFormat::Jpeg);
    }

    #[test]
    fn format_known_names() {
        assert_eq!(resolve_format(Some("AVIF")), OutputFormat::Avif);
        assert_eq!(resolve_format(Some("png")), OutputFormat::Png);
        assert_eq!(resolve_format(Some("jpg")), OutputFormat::Jpeg);
    }

    #[test]
    fn format_names_are_normalized_before_fallback() {
        assert_eq!(resolve_format(Some("WEBP")), OutputFormat::WebP);
        assert_eq!(resolve_format(Some(" png")), OutputFormat::Png);
        assert_eq!(resolve_format(Some("Jpg ")), OutputFormat::Jpeg);
    }

    // =========================================================================
    // Quality
    // =========================================================================

    #[test]
    fn quality_is_clamped_not_rejected() {
        assert_eq!(resolve_quality(Some("5")).value(), 10);
        assert_eq!(resolve_quality(Some("0")).value(), 10);
        assert_eq!(resolve_quality(Some("-40")).value(), 10);
        assert_eq!(resolve_quality(Some("150")).value(), 100);
        assert_eq!(resolve_quality(Some("99999999999999999999")).value(), 100);
    }

    #[test]
    fn quality_unparseable_defaults_to_80() {
        assert_eq!(resolve_quality(None).value(), 80);
        assert_eq!(resolve_quality(Some("high")).value(), 80);
        assert_eq!(resolve_quality(Some("")).value(), 80);
    }

    #[test]
    fn quality_leading_digits() {
        assert_eq!(resolve_quality(Some("75%")).value(), 75);
        assert_eq!(resolve_quality(Some(" 62.9")).value(), 62);
    }

    // =========================================================================
    // Bounds and fit
    // =========================================================================

    #[test]
    fn bounds_positive_integers_only() {
        assert_eq!(resolve_bound("max_width", Some("800")), Some(800));
        assert_eq!(resolve_bound("max_width", Some("1200px")), Some(1200));
        assert_eq!(resolve_bound("max_width", Some("0")), None);
        assert_eq!(resolve_bound("max_width", Some("-5")), None);
        assert_eq!(resolve_bound("max_width", Some("wide")), None);
        assert_eq!(resolve_bound("max_width", None), None);
    }

    #[test]
    fn bounds_saturate_at_u32() {
        assert_eq!(
            resolve_bound("max_height", Some("99999999999")),
            Some(u32::MAX)
        );
    }

    #[test]
    fn fit_unknown_is_inside() {
        assert_eq!(resolve_fit(Some("cover")), FitMode::Cover);
        assert_eq!(resolve_fit(Some("contain")), FitMode::Inside);
        assert_eq!(resolve_fit(None), FitMode::Inside);
    }

    #[test]
    fn full_field_set() {
        let raw = RawFields {
            format: Some("png".into()),
            quality: Some("79".into()),
            max_width: Some("800".into()),
            max_height: Some("600".into()),
            fit: Some("fill".into()),
            ..fields(&[7; 10])
        };
        let req = validate(raw).unwrap();
        assert_eq!(req.format, OutputFormat::Png);
        assert_eq!(req.quality.value(), 79);
        assert_eq!((req.max_width, req.max_height), (Some(800), Some(600)));
        assert_eq!(req.fit, FitMode::Fill);
    }

    // =========================================================================
    // parse_leading_int
    // =========================================================================

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  +7abc"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int(".5"), None);
    }
}
