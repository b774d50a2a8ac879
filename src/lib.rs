//! # image-squeeze
//!
//! Re-encode a single raster image into JPEG, PNG, WebP or AVIF, optionally
//! downscaled, under a quality budget. A handful of user-facing knobs (format,
//! quality 10–100, max width/height, fit mode) are turned into a deterministic
//! resize plan plus format-specific encoder settings, then executed against the
//! image bytes.
//!
//! # Architecture: One Request, Five Steps
//!
//! ```text
//! 1. Validate   raw fields        →  TranscodeRequest   (lenient, only fails on missing image)
//! 2. Plan       bounds + fit      →  ResizePlan         (1920px wide when unbounded)
//! 3. Map        format + quality  →  EncodeSpec         (fixed per-codec thresholds)
//! 4. Execute    bytes + plan      →  EncodedImage       (decode → resize → encode)
//! 5. Assemble   encoded + spec    →  TranscodeResult    (mime type + filename)
//! ```
//!
//! Steps 1–3 and 5 are pure functions, so the decision logic is unit testable
//! without encoding a single pixel. Step 4 goes through the
//! [`imaging::ImageBackend`] trait; tests swap in a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`request`] | Input validation: raw strings → [`request::TranscodeRequest`] |
//! | [`imaging`] | Resize planning, codec parameters, and the pure-Rust pixel backend |
//! | [`naming`] | `optimized-<stem>.<ext>` filename derivation |
//! | [`transcode`] | Public entry points, error taxonomy, compression stats |
//! | [`presets`] | Named size presets and quality labels |
//! | [`config`] | `squeeze.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lenient Input
//!
//! Unknown format strings fall back to JPEG, unparseable sizes mean "no
//! bound", and out-of-range quality is clamped. The only input that is
//! rejected is a missing image. Each fallback is logged at `warn`.
//!
//! ## No Upscaling
//!
//! Inside and cover never scale a source up: a 320px-wide image asked to fit
//! in 1920px stays 320px wide. Fill is the exception. It stretches to the
//! exact bounds, so 1000x500 filled to 800x600 gains height, unless the
//! source already fits inside both bounds. The resample buffer is capped at
//! [`imaging::calculations::MAX_OUTPUT_PIXELS`].
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and AVIF encoding are pure Rust (`image`, `rav1d`,
//! `rav1e`). JPEG and WebP go through mozjpeg and libwebp, which are built
//! from source by their crates, so the binary has no runtime dependencies.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod presets;
pub mod request;
pub mod transcode;

pub use request::{RawFields, TranscodeRequest, validate};
pub use transcode::{
    CompressionStats, TranscodeError, TranscodeResult, transcode, transcode_fields,
    transcode_with_backend,
};

#[cfg(test)]
pub(crate) mod test_helpers;
