//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Transcode
//!
//! ```text
//! holiday.png → optimized-holiday.webp
//!     Format: WebP (image/webp), quality 80 (high)
//!     Size: 4000x3000 → 1920x1440
//!     Bytes: 2.4 MB → 312.5 KB (87.1% smaller)
//!     Written: out/optimized-holiday.webp
//! ```
//!
//! ## Plan
//!
//! ```text
//! holiday.png (4000x3000)
//!     Resize: max 1920 wide, fit inside → 1920x1440
//!     Encode: WebP quality 80, method 6
//!     Output: optimized-holiday.webp (image/webp)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure, with no I/O. `--json` output serializes the same
//! [`TranscodeReport`] the text view is built from.

use crate::imaging::{FormatParams, OutputFormat, Quality, ResizeOp, ResizePlan, TranscodePlan};
use crate::presets::{PRESETS, quality_label};
use crate::transcode::{CompressionStats, TranscodeResult};
use serde::Serialize;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

// ============================================================================
// Shared helpers
// ============================================================================

/// Human-readable byte count, base 1024, at most two decimals.
///
/// ```text
/// 0 → "0 Bytes"   500 → "500 Bytes"   1536 → "1.5 KB"   1048576 → "1 MB"
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

fn dims(d: (u32, u32)) -> String {
    format!("{}x{}", d.0, d.1)
}

/// `"87.1% smaller"`, `"12.5% larger"`, or `"same size"`.
fn format_reduction(stats: &CompressionStats) -> String {
    let pct = stats.reduction_percent();
    if pct > 0.0 {
        format!("{pct:.1}% smaller")
    } else if pct < 0.0 {
        format!("{:.1}% larger", -pct)
    } else {
        "same size".to_string()
    }
}

/// Encoder settings in one line, e.g. `JPEG quality 92, chroma 4:4:4, optimized`.
pub fn describe_params(params: &FormatParams) -> String {
    match *params {
        FormatParams::Jpeg {
            quality,
            chroma,
            optimize,
        } => {
            let mut s = format!("JPEG quality {quality}, chroma {}", chroma.notation());
            if optimize {
                s.push_str(", optimized");
            }
            s
        }
        FormatParams::WebP { quality, method } => {
            format!("WebP quality {quality}, method {method}")
        }
        FormatParams::Png {
            compression_level,
            palette,
        } => format!(
            "PNG level {compression_level}, {}",
            if palette { "palette" } else { "truecolor" }
        ),
        FormatParams::Avif { quality, speed } => {
            format!("AVIF quality {quality}, speed {speed}")
        }
    }
}

/// Requested bounds, e.g. `max 1920 wide`, `max 800x600`.
pub fn describe_bounds(plan: &ResizePlan) -> String {
    match (plan.target_width, plan.target_height) {
        (Some(w), Some(h)) => format!("max {w}x{h}"),
        (Some(w), None) => format!("max {w} wide"),
        (None, Some(h)) => format!("max {h} high"),
        (None, None) => "no bounds".to_string(),
    }
}

// ============================================================================
// transcode
// ============================================================================

/// Everything reported about one completed transcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeReport {
    pub source: String,
    pub output_filename: String,
    /// Where the bytes were written, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
    pub format: OutputFormat,
    pub mime_type: &'static str,
    pub quality: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dimensions: Option<(u32, u32)>,
    pub output_dimensions: (u32, u32),
    pub stats: CompressionStats,
    pub reduction_percent: f64,
}

impl TranscodeReport {
    pub fn new(
        source: &str,
        result: &TranscodeResult,
        format: OutputFormat,
        quality: Quality,
        source_dimensions: Option<(u32, u32)>,
        written_to: Option<String>,
    ) -> Self {
        let stats = result.stats();
        Self {
            source: source.to_string(),
            output_filename: result.suggested_filename.clone(),
            written_to,
            format,
            mime_type: result.mime_type,
            quality: quality.value(),
            source_dimensions,
            output_dimensions: (result.width, result.height),
            reduction_percent: stats.reduction_percent(),
            stats,
        }
    }
}

pub fn format_transcode_output(report: &TranscodeReport) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", report.source, report.output_filename)];

    lines.push(format!(
        "    Format: {} ({}), quality {} ({})",
        report.format.label(),
        report.mime_type,
        report.quality,
        quality_label(Quality::new(report.quality as i64))
    ));

    let size = match report.source_dimensions {
        Some(src) => format!("{} → {}", dims(src), dims(report.output_dimensions)),
        None => dims(report.output_dimensions),
    };
    lines.push(format!("    Size: {size}"));

    lines.push(format!(
        "    Bytes: {} → {} ({})",
        format_size(report.stats.original_size),
        format_size(report.stats.optimized_size),
        format_reduction(&report.stats)
    ));

    if let Some(path) = &report.written_to {
        lines.push(format!("    Written: {path}"));
    }
    lines
}

pub fn print_transcode_output(report: &TranscodeReport) {
    for line in format_transcode_output(report) {
        println!("{}", line);
    }
}

pub fn print_transcode_json(report: &TranscodeReport) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

// ============================================================================
// plan
// ============================================================================

pub fn format_plan_output(
    source: &str,
    source_dimensions: (u32, u32),
    plan: &TranscodePlan,
    op: ResizeOp,
    output_filename: &str,
) -> Vec<String> {
    let resize = match op {
        ResizeOp::Keep => "unchanged".to_string(),
        ResizeOp::FillCrop {
            width,
            height,
            crop_width,
            crop_height,
        } => format!(
            "{}x{} then crop to {}x{}",
            width, height, crop_width, crop_height
        ),
        ResizeOp::Exact { width, height } => format!("{width}x{height}"),
    };

    vec![
        format!("{} ({})", source, dims(source_dimensions)),
        format!(
            "    Resize: {}, fit {} → {}",
            describe_bounds(&plan.resize),
            plan.resize.fit.name(),
            resize
        ),
        format!("    Encode: {}", describe_params(&plan.encode.params)),
        format!(
            "    Output: {} ({})",
            output_filename, plan.encode.mime_type
        ),
    ]
}

pub fn print_plan_output(
    source: &str,
    source_dimensions: (u32, u32),
    plan: &TranscodePlan,
    op: ResizeOp,
    output_filename: &str,
) {
    for line in format_plan_output(source, source_dimensions, plan, op, output_filename) {
        println!("{}", line);
    }
}

// ============================================================================
// presets
// ============================================================================

pub fn format_presets() -> Vec<String> {
    PRESETS
        .iter()
        .map(|p| {
            let bounds = match (p.max_width, p.max_height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => "no resize".to_string(),
            };
            format!("{:<10}{:<10}{}", p.name, p.label, bounds)
        })
        .collect()
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}
