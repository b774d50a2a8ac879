//! Image processing: planning, codec parameters, and the pixel backend.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Plan** | [`plan_resize`] + [`encode_spec`] (pure, no pixels) |
//! | **Identify** | `image::ImageReader` / `avif-parse` |
//! | **Decode** | `image` crate, `rav1d` for AVIF input |
//! | **Resize** | Lanczos3, centered crop for cover |
//! | **Encode** | mozjpeg, libwebp, png + NeuQuant, rav1e |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing a transcode
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Codec**: `(format, quality)` → encoder settings
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining planning + backend

pub mod backend;
pub mod calculations;
pub mod codec;
mod encoders;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::{DEFAULT_MAX_WIDTH, ResizeOp, plan_resize, resolve_resize};
pub use codec::encode_spec;
pub use operations::{TranscodePlan, execute_plan, get_dimensions, plan_transcode, preview};
pub use params::{
    ChromaSubsampling, EncodeSpec, FitMode, FormatParams, OutputFormat, Quality, ResizePlan,
};
pub use rust_backend::RustBackend;
