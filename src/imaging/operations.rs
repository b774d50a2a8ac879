//! High-level image operations.
//!
//! These functions combine the pure planning steps with backend execution.
//! [`plan_transcode`] never touches pixels, so the CLI's `plan` command and
//! the real transcode share exactly the same decisions.

use super::backend::{BackendError, EncodedImage, ImageBackend};
use super::calculations::{ResizeOp, plan_resize, resolve_resize};
use super::codec::encode_spec;
use super::params::{EncodeSpec, ResizePlan};
use crate::request::TranscodeRequest;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Resize plan and encoder settings for one request. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodePlan {
    pub resize: ResizePlan,
    pub encode: EncodeSpec,
}

/// Resize Planner + Codec Parameter Mapper in one pure step.
pub fn plan_transcode(request: &TranscodeRequest) -> TranscodePlan {
    let resize = plan_resize(request.max_width, request.max_height, request.fit);
    let encode = encode_spec(request.format, request.quality);
    debug!(?resize, params = ?encode.params, "planned transcode");
    TranscodePlan { resize, encode }
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Run a plan through the backend: decode → resize → encode.
pub fn execute_plan(
    backend: &impl ImageBackend,
    bytes: &[u8],
    plan: &TranscodePlan,
) -> Result<EncodedImage> {
    backend.transcode(bytes, &plan.resize, &plan.encode)
}

/// What the backend would do to a source of the given size, and the size it
/// would produce.
pub fn preview(source: (u32, u32), plan: &TranscodePlan) -> (ResizeOp, (u32, u32)) {
    let op = resolve_resize(source, &plan.resize);
    (op, op.output_dimensions(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::{FitMode, FormatParams, OutputFormat, Quality};

    fn request(format: OutputFormat, quality: i64) -> TranscodeRequest {
        TranscodeRequest {
            image_bytes: vec![0u8; 16],
            format,
            quality: Quality::new(quality),
            max_width: None,
            max_height: None,
            fit: FitMode::Inside,
            source_filename: "photo.jpg".to_string(),
        }
    }

    #[test]
    fn plan_without_bounds_uses_default_ceiling() {
        let plan = plan_transcode(&request(OutputFormat::WebP, 80));
        assert_eq!(plan.resize.target_width, Some(1920));
        assert_eq!(plan.resize.target_height, None);
        assert_eq!(plan.resize.fit, FitMode::Inside);
        assert_eq!(plan.encode.mime_type, "image/webp");
    }

    #[test]
    fn plan_carries_explicit_bounds() {
        let mut req = request(OutputFormat::Png, 60);
        req.max_width = Some(800);
        req.max_height = Some(600);
        req.fit = FitMode::Cover;

        let plan = plan_transcode(&req);
        assert_eq!(plan.resize.target_width, Some(800));
        assert_eq!(plan.resize.target_height, Some(600));
        assert_eq!(plan.resize.fit, FitMode::Cover);
        assert_eq!(
            plan.encode.params,
            FormatParams::Png {
                compression_level: 4,
                palette: true
            }
        );
    }

    #[test]
    fn preview_matches_mock_execution() {
        let backend = MockBackend::with_source(4000, 3000);
        let plan = plan_transcode(&request(OutputFormat::WebP, 80));

        let (op, dims) = preview((4000, 3000), &plan);
        assert_eq!(
            op,
            ResizeOp::Exact {
                width: 1920,
                height: 1440
            }
        );

        let out = execute_plan(&backend, &[1, 2, 3], &plan).unwrap();
        assert_eq!((out.width, out.height), dims);
    }

    #[test]
    fn execute_plan_forwards_plan_to_backend() {
        let backend = MockBackend::with_source(1000, 500);
        let mut req = request(OutputFormat::Avif, 50);
        req.max_width = Some(800);
        req.max_height = Some(600);
        req.fit = FitMode::Fill;
        let plan = plan_transcode(&req);

        let out = execute_plan(&backend, &[9; 4], &plan).unwrap();
        assert_eq!((out.width, out.height), (800, 600));

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Transcode {
                len: 4,
                target_width: Some(800),
                target_height: Some(600),
                fit: FitMode::Fill,
                format: OutputFormat::Avif,
            }]
        );
    }

    #[test]
    fn get_dimensions_via_backend() {
        let backend = MockBackend::with_source(640, 480);
        assert_eq!(get_dimensions(&backend, &[0; 8]).unwrap(), (640, 480));
        assert!(get_dimensions(&MockBackend::new(), &[0; 8]).is_err());
    }
}
