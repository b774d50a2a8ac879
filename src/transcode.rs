//! Public entry point: one request in, one optimized image out.
//!
//! ```text
//! RawFields ──validate──▶ TranscodeRequest ──plan_transcode──▶ TranscodePlan
//!                                                                   │
//!            TranscodeResult ◀──assemble_response── EncodedImage ◀──execute_plan
//! ```
//!
//! Every step before `execute_plan` is pure. Each call is independent: no
//! state is shared between requests, and a failure never yields partial bytes.

use crate::imaging::{
    BackendError, EncodeSpec, EncodedImage, ImageBackend, RustBackend, execute_plan,
    plan_transcode,
};
use crate::naming;
use crate::request::{RawFields, TranscodeRequest, validate};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("No image data supplied")]
    MissingInput,
    #[error("Could not decode image: {0}")]
    Decode(String),
    #[error("Could not encode image: {0}")]
    Encode(String),
}

impl From<BackendError> for TranscodeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(message) => Self::Decode(message),
            BackendError::Io(e) => Self::Decode(e.to_string()),
            encode @ (BackendError::Encode { .. } | BackendError::TooLarge { .. }) => {
                Self::Encode(encode.to_string())
            }
        }
    }
}

/// Encoded output plus the metadata a caller needs to serve or save it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeResult {
    pub output_bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub suggested_filename: String,
    pub width: u32,
    pub height: u32,
    /// Size of the input, for [`CompressionStats`].
    pub original_size: u64,
}

impl TranscodeResult {
    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            original_size: self.original_size,
            optimized_size: self.output_bytes.len() as u64,
        }
    }

    pub fn content_disposition(&self) -> String {
        naming::content_disposition(&self.suggested_filename)
    }
}

/// Before/after byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    pub original_size: u64,
    pub optimized_size: u64,
}

impl CompressionStats {
    /// `(original - optimized) / original * 100`, rounded to one decimal.
    /// Negative when the output grew; 0 for an empty original.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        let saved = self.original_size as f64 - self.optimized_size as f64;
        (saved / self.original_size as f64 * 1000.0).round() / 10.0
    }
}

/// Pair encoded bytes with their content type and derived filename.
pub fn assemble_response(
    encoded: EncodedImage,
    spec: &EncodeSpec,
    source_filename: &str,
    original_size: u64,
) -> TranscodeResult {
    TranscodeResult {
        suggested_filename: naming::suggested_filename(source_filename, spec.file_extension),
        mime_type: spec.mime_type,
        width: encoded.width,
        height: encoded.height,
        output_bytes: encoded.bytes,
        original_size,
    }
}

/// Transcode a validated request with the production backend.
pub fn transcode(request: &TranscodeRequest) -> Result<TranscodeResult, TranscodeError> {
    transcode_with_backend(&RustBackend::new(), request)
}

/// Transcode a validated request through any [`ImageBackend`].
pub fn transcode_with_backend(
    backend: &impl ImageBackend,
    request: &TranscodeRequest,
) -> Result<TranscodeResult, TranscodeError> {
    if request.image_bytes.is_empty() {
        return Err(TranscodeError::MissingInput);
    }

    let plan = plan_transcode(request);
    let encoded = execute_plan(backend, &request.image_bytes, &plan)?;
    let result = assemble_response(
        encoded,
        &plan.encode,
        &request.source_filename,
        request.image_bytes.len() as u64,
    );

    info!(
        source = %request.source_filename,
        format = plan.encode.format.name(),
        input_bytes = result.original_size,
        output_bytes = result.output_bytes.len(),
        width = result.width,
        height = result.height,
        "transcoded"
    );
    Ok(result)
}

/// Validate raw fields and transcode in one call.
pub fn transcode_fields(raw: RawFields) -> Result<TranscodeResult, TranscodeError> {
    let request = validate(raw)?;
    transcode(&request)
}
