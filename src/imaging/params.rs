//! Parameter types for a transcode.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the pure planning code ([`calculations`](super::calculations)
//! and [`codec`](super::codec)) and the [`backend`](super::backend) that does
//! the pixel work. This separation allows swapping backends (e.g. a mock in
//! tests) without changing any decision logic.
//!
//! ## Types
//!
//! - [`Quality`]: user-facing quality (10–100, default 80). Clamped on construction.
//! - [`OutputFormat`] / [`FitMode`]: the caller's format and fit choices.
//! - [`ResizePlan`]: requested bounds + fit, before the source size is known.
//! - [`EncodeSpec`]: content type, extension, and per-codec [`FormatParams`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting on the 10–100 scale shared by every output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u32);

impl Quality {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 100;
    pub const DEFAULT: u32 = 80;

    /// Clamp any integer into `[MIN, MAX]`. Out-of-range values are never rejected.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target container/codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    #[serde(rename = "webp")]
    WebP,
    Avif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Jpeg, Self::Png, Self::WebP, Self::Avif];

    /// Parse a format name (case-insensitive). `jpg` is accepted as an alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Canonical lowercase name, as accepted by [`from_name`](Self::from_name).
    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    /// Human label for CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Avif => "AVIF",
        }
    }
}

/// How requested bounds are reconciled with the source aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Shrink until both dimensions fit; no crop.
    #[default]
    Inside,
    /// Shrink until the bounds are covered, then center-crop the overflow.
    Cover,
    /// Stretch each axis independently to the exact bounds.
    Fill,
}

impl FitMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "inside" => Some(Self::Inside),
            "cover" => Some(Self::Cover),
            "fill" => Some(Self::Fill),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Cover => "cover",
            Self::Fill => "fill",
        }
    }
}

/// Requested bounds for a single transcode.
///
/// Built by [`plan_resize`](super::calculations::plan_resize) before the source
/// dimensions are known. The concrete output size is resolved against the
/// decoded image by [`resolve_resize`](super::calculations::resolve_resize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub fit: FitMode,
    /// Always `false`: no fit mode may enlarge a source that already satisfies the bounds.
    pub upscale_allowed: bool,
}

impl ResizePlan {
    pub fn new(target_width: Option<u32>, target_height: Option<u32>, fit: FitMode) -> Self {
        Self {
            target_width,
            target_height,
            fit,
            upscale_allowed: false,
        }
    }

    /// A plan with no bounds leaves the image at its decoded size.
    pub fn is_passthrough(&self) -> bool {
        self.target_width.is_none() && self.target_height.is_none()
    }
}

/// JPEG chroma subsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaSubsampling {
    /// 4:4:4, full chroma resolution.
    Full,
    /// 4:2:0, chroma halved on both axes.
    Half,
}

impl ChromaSubsampling {
    /// Pixel block covered by one chroma sample, as `(horizontal, vertical)`.
    pub fn pixel_sizes(self) -> (u8, u8) {
        match self {
            Self::Full => (1, 1),
            Self::Half => (2, 2),
        }
    }

    pub fn notation(self) -> &'static str {
        match self {
            Self::Full => "4:4:4",
            Self::Half => "4:2:0",
        }
    }
}

/// Encoder settings for one codec, already derived from the user's quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatParams {
    Jpeg {
        quality: u8,
        chroma: ChromaSubsampling,
        /// Optimized Huffman coding (mozjpeg's default trade-off).
        optimize: bool,
    },
    WebP {
        quality: u8,
        /// libwebp `method`, 0 (fast) to 6 (slowest, smallest).
        method: u8,
    },
    Png {
        /// zlib-style level, 0 (none) to 9 (smallest output).
        compression_level: u8,
        /// Quantize to an indexed palette before writing.
        palette: bool,
    },
    Avif {
        /// Effective quality after the AVIF offset.
        quality: u8,
        /// rav1e speed, 1 (slowest) to 10 (fastest).
        speed: u8,
    },
}

/// Everything the encode step and the response need to know about the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSpec {
    pub format: OutputFormat,
    pub mime_type: &'static str,
    pub file_extension: &'static str,
    pub params: FormatParams,
}
