//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the pure planning code and
//! the pixel work. It has two operations: `identify` (decoded dimensions) and
//! `transcode` (decode → resize → encode as one unit).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::calculations::MAX_OUTPUT_PIXELS;
use super::params::{EncodeSpec, ResizePlan};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("{codec} encode failed: {message}")]
    Encode {
        codec: &'static str,
        message: String,
    },
    #[error("Output {width}x{height} exceeds the {MAX_OUTPUT_PIXELS} pixel limit")]
    TooLarge { width: u32, height: u32 },
}

impl BackendError {
    pub(crate) fn encode(codec: &'static str, message: impl ToString) -> Self {
        Self::Encode {
            codec,
            message: message.to_string(),
        }
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Encoded output plus the dimensions it was encoded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must be stateless across calls: every `transcode` is an
/// independent unit that either returns complete output or an error.
pub trait ImageBackend: Sync {
    /// Decoded dimensions of the input.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode `bytes`, apply `plan`, encode with `spec`.
    fn transcode(
        &self,
        bytes: &[u8],
        plan: &ResizePlan,
        spec: &EncodeSpec,
    ) -> Result<EncodedImage, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::resolve_resize;
    use crate::imaging::params::{FitMode, OutputFormat};
    use std::sync::Mutex;

    /// Mock backend that records operations without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync.
    #[derive(Default)]
    pub struct MockBackend {
        /// Source size reported by `identify` and used to resolve plans.
        pub source: Option<Dimensions>,
        /// Error returned by the next `transcode` call.
        pub failure: Mutex<Option<BackendError>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify {
            len: usize,
        },
        Transcode {
            len: usize,
            target_width: Option<u32>,
            target_height: Option<u32>,
            fit: FitMode,
            format: OutputFormat,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_source(width: u32, height: u32) -> Self {
            Self {
                source: Some(Dimensions { width, height }),
                ..Self::default()
            }
        }

        pub fn failing(error: BackendError) -> Self {
            Self {
                failure: Mutex::new(Some(error)),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify { len: bytes.len() });

            self.source
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))
        }

        fn transcode(
            &self,
            bytes: &[u8],
            plan: &ResizePlan,
            spec: &EncodeSpec,
        ) -> Result<EncodedImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Transcode {
                len: bytes.len(),
                target_width: plan.target_width,
                target_height: plan.target_height,
                fit: plan.fit,
                format: spec.format,
            });

            if let Some(err) = self.failure.lock().unwrap().take() {
                return Err(err);
            }

            let source = self.source.unwrap_or(Dimensions {
                width: 100,
                height: 100,
            });
            let (width, height) = resolve_resize((source.width, source.height), plan)
                .output_dimensions((source.width, source.height));
            Ok(EncodedImage {
                bytes: spec.file_extension.as_bytes().to_vec(),
                width,
                height,
            })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_source(800, 600);

        let result = backend.identify(&[1, 2, 3]).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Identify { len: 3 }]);
    }

    #[test]
    fn mock_records_transcode() {
        let backend = MockBackend::with_source(4000, 3000);
        let plan = ResizePlan::new(Some(1920), None, FitMode::Inside);
        let spec = crate::imaging::codec::encode_spec(
            OutputFormat::WebP,
            crate::imaging::Quality::default(),
        );

        let out = backend.transcode(&[0u8; 10], &plan, &spec).unwrap();
        assert_eq!((out.width, out.height), (1920, 1440));
        assert_eq!(out.bytes, b"webp");

        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Transcode {
                len: 10,
                target_width: Some(1920),
                format: OutputFormat::WebP,
                ..
            }
        ));
    }

    #[test]
    fn mock_failure_is_returned_once() {
        let backend = MockBackend::failing(BackendError::Decode("bad".into()));
        let plan = ResizePlan::new(None, None, FitMode::Inside);
        let spec = crate::imaging::codec::encode_spec(
            OutputFormat::Png,
            crate::imaging::Quality::default(),
        );

        assert!(matches!(
            backend.transcode(&[0], &plan, &spec),
            Err(BackendError::Decode(_))
        ));
        assert!(backend.transcode(&[0], &plan, &spec).is_ok());
    }

    #[test]
    fn encode_error_display_names_codec() {
        let err = BackendError::encode("webp", "dimension too large");
        assert_eq!(err.to_string(), "webp encode failed: dimension too large");
    }
}
