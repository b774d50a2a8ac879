//! Pure calculation functions for resize planning and output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! [`plan_resize`] runs before decoding (it only sees the requested bounds);
//! [`resolve_resize`] runs after decoding and turns the plan into a concrete
//! [`ResizeOp`] for the known source size.

use super::params::{FitMode, ResizePlan};

/// Width applied when the caller requests no bounds at all.
pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// Largest resample buffer the backend will allocate, in pixels.
///
/// Fill is the only mode that can grow an axis, and bounds are accepted up
/// to `u32::MAX`, so the resolved size has to be checked before resampling.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Build the resize plan from the caller's (already validated) bounds.
///
/// - No bounds → `DEFAULT_MAX_WIDTH` wide, fit forced to [`FitMode::Inside`],
///   height left free so the aspect ratio carries through.
/// - Any bound → carried through unchanged with the requested fit.
pub fn plan_resize(max_width: Option<u32>, max_height: Option<u32>, fit: FitMode) -> ResizePlan {
    match (max_width, max_height) {
        (None, None) => ResizePlan::new(Some(DEFAULT_MAX_WIDTH), None, FitMode::Inside),
        (w, h) => ResizePlan::new(w, h, fit),
    }
}

/// A concrete resize for a known source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOp {
    /// Leave the decoded image untouched.
    Keep,
    /// Resample to exactly `width`x`height`.
    Exact { width: u32, height: u32 },
    /// Resample to `width`x`height`, then center-crop to `crop_width`x`crop_height`.
    FillCrop {
        width: u32,
        height: u32,
        crop_width: u32,
        crop_height: u32,
    },
}

impl ResizeOp {
    /// Dimensions of the image after this op is applied to `source`.
    pub fn output_dimensions(&self, source: (u32, u32)) -> (u32, u32) {
        match *self {
            ResizeOp::Keep => source,
            ResizeOp::Exact { width, height } => (width, height),
            ResizeOp::FillCrop {
                crop_width,
                crop_height,
                ..
            } => (crop_width, crop_height),
        }
    }

    /// Size of the intermediate resample buffer, if this op resamples at all.
    pub fn resample_dimensions(&self) -> Option<(u32, u32)> {
        match *self {
            ResizeOp::Keep => None,
            ResizeOp::Exact { width, height } | ResizeOp::FillCrop { width, height, .. } => {
                Some((width, height))
            }
        }
    }

    /// Whether the resample buffer stays under [`MAX_OUTPUT_PIXELS`].
    pub fn within_pixel_limit(&self) -> bool {
        self.resample_dimensions()
            .is_none_or(|(w, h)| w as u64 * h as u64 <= MAX_OUTPUT_PIXELS)
    }
}

/// Resolve a plan against the decoded source size.
///
/// A single bound scales along that axis with the aspect ratio preserved,
/// whatever the fit mode. With both bounds:
///
/// - **Inside**: largest scale that fits both bounds.
/// - **Cover**: scale to cover the bounds (clipped to the source size unless
///   upscaling is allowed), then center-crop.
/// - **Fill**: stretch to exactly the bounds, unless the source already fits
///   inside them.
///
/// With `upscale_allowed == false` no scale factor exceeds 1.0, so a source
/// that already satisfies the bounds comes back as [`ResizeOp::Keep`].
pub fn resolve_resize(source: (u32, u32), plan: &ResizePlan) -> ResizeOp {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return ResizeOp::Keep;
    }
    let max_scale = if plan.upscale_allowed { f64::INFINITY } else { 1.0 };

    match (plan.target_width, plan.target_height) {
        (None, None) => ResizeOp::Keep,
        (Some(w), None) => scale_op(source, w as f64 / src_w as f64, max_scale),
        (None, Some(h)) => scale_op(source, h as f64 / src_h as f64, max_scale),
        (Some(w), Some(h)) => match plan.fit {
            FitMode::Inside => {
                let scale = (w as f64 / src_w as f64).min(h as f64 / src_h as f64);
                scale_op(source, scale, max_scale)
            }
            FitMode::Cover => cover_op(source, (w, h), plan.upscale_allowed),
            FitMode::Fill => {
                let already_fits = src_w <= w && src_h <= h;
                if (w, h) == source || (already_fits && !plan.upscale_allowed) {
                    ResizeOp::Keep
                } else {
                    ResizeOp::Exact {
                        width: w,
                        height: h,
                    }
                }
            }
        },
    }
}

fn scale_op(source: (u32, u32), scale: f64, max_scale: f64) -> ResizeOp {
    let scale = scale.min(max_scale);
    let (width, height) = apply_scale(source, scale);
    if (width, height) == source {
        ResizeOp::Keep
    } else {
        ResizeOp::Exact { width, height }
    }
}

fn cover_op(source: (u32, u32), bounds: (u32, u32), upscale_allowed: bool) -> ResizeOp {
    let (src_w, src_h) = source;
    let target = if upscale_allowed {
        bounds
    } else {
        (bounds.0.min(src_w), bounds.1.min(src_h))
    };
    if target == source {
        return ResizeOp::Keep;
    }
    let (width, height) = calculate_fill_dimensions(source, target);
    ResizeOp::FillCrop {
        width,
        height,
        crop_width: target.0.min(width),
        crop_height: target.1.min(height),
    }
}

/// Apply a uniform scale factor, rounding and keeping at least 1px per axis.
pub fn apply_scale(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (src_w, src_h) = source;
    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Calculate dimensions needed to cover a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}
