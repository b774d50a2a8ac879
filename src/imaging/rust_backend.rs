//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate, format sniffed from the bytes |
//! | Decode (AVIF) | `avif-parse` (container) + `rav1d` (AV1 decode) + custom YUV→RGB |
//! | Resize | `image::imageops` with the `Lanczos3` filter |
//! | Cover crop | `DynamicImage::crop_imm`, centered |
//! | Encode | [`encoders`](super::encoders) (mozjpeg, libwebp, png, rav1e) |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::calculations::{ResizeOp, resolve_resize};
use super::encoders;
use super::params::{EncodeSpec, ResizePlan};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// ISO-BMFF brands that mark an AVIF still image or sequence.
const AVIF_BRANDS: [&[u8; 4]; 2] = [b"avif", b"avis"];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Sniff an AVIF payload from its `ftyp` box: major brand or any compatible brand.
///
/// The `image` crate's `"avif"` feature only enables the **encoder** (rav1e);
/// decoding needs `"avif-native"` (C dav1d), which we don't use. AVIF input is
/// routed to our own rav1d decoder instead.
fn is_avif(bytes: &[u8]) -> bool {
    if bytes.len() < 16 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = box_len.clamp(16, bytes.len());
    // major brand at 8..12, minor version at 12..16, compatible brands after
    std::iter::once(&bytes[8..12])
        .chain(bytes[16..end].chunks_exact(4))
        .any(|brand| AVIF_BRANDS.iter().any(|b| brand == &b[..]))
}

/// Decode an in-memory image of any supported format.
fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    if bytes.is_empty() {
        return Err(BackendError::Decode("empty input".into()));
    }
    if is_avif(bytes) {
        return decode_avif(bytes);
    }
    image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Extract dimensions from an AVIF container (no AV1 decode needed).
fn identify_avif(bytes: &[u8]) -> Result<Dimensions, BackendError> {
    let avif = avif_parse::read_avif(&mut Cursor::new(bytes))
        .map_err(|e| BackendError::Decode(format!("invalid AVIF container: {e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| BackendError::Decode(format!("unreadable AVIF metadata: {e:?}")))?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Decode an AVIF payload using avif-parse (container) + rav1d (AV1 decode).
///
/// The decoder context is closed on every path once `dav1d_open` succeeded.
fn decode_avif(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    let avif = avif_parse::read_avif(&mut Cursor::new(bytes))
        .map_err(|e| BackendError::Decode(format!("invalid AVIF container: {e:?}")))?;
    let av1_bytes: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::from(&mut settings).cast::<Dav1dSettings>())
    };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(BackendError::Decode(format!("rav1d open failed ({})", rc.0)));
    }

    let decoded = 'frame: {
        let mut data = Dav1dData::default();
        let buf_ptr =
            unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
        if buf_ptr.is_null() {
            break 'frame Err(BackendError::Decode("rav1d data_create failed".into()));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

        let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data)) };
            break 'frame Err(BackendError::Decode(format!(
                "rav1d send_data failed ({})",
                rc.0
            )));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            break 'frame Err(BackendError::Decode(format!(
                "rav1d get_picture failed ({})",
                rc.0
            )));
        }

        let converted = picture_to_rgb(&pic);
        unsafe { rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic)) };
        converted
    };

    unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
    let (width, height, rgb) = decoded?;

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| BackendError::Decode("decoded AVIF buffer has the wrong size".into()))
}

/// Convert a decoded picture's YUV planes to interleaved RGB8.
fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<(u32, u32, Vec<u8>), BackendError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let plane = |index: usize| {
        pic.data[index]
            .map(|p| p.as_ptr() as *const u8)
            .ok_or_else(|| BackendError::Decode(format!("AVIF picture is missing plane {index}")))
    };

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let y_ptr = plane(0)?;

    let planes = if pic.p.layout == DAV1D_PIXEL_LAYOUT_I400 {
        YuvPlanes {
            y_ptr,
            u_ptr: y_ptr,
            v_ptr: y_ptr,
            y_stride: pic.stride[0],
            uv_stride: 0,
            width,
            height,
            bpc: pic.p.bpc as u32,
            ss_x: false,
            ss_y: false,
            monochrome: true,
        }
    } else {
        let (ss_x, ss_y) = match pic.p.layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            other => {
                return Err(BackendError::Decode(format!(
                    "unsupported AVIF pixel layout: {other}"
                )));
            }
        };
        YuvPlanes {
            y_ptr,
            u_ptr: plane(1)?,
            v_ptr: plane(2)?,
            y_stride: pic.stride[0],
            uv_stride: pic.stride[1],
            width,
            height,
            bpc: pic.p.bpc as u32,
            ss_x,
            ss_y,
            monochrome: false,
        }
    };

    Ok((width, height, planes.to_rgb()))
}

/// Decoded YUV plane data from rav1d, ready for RGB conversion.
struct YuvPlanes {
    y_ptr: *const u8,
    u_ptr: *const u8,
    v_ptr: *const u8,
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bpc: u32,
    /// Chroma subsampling: horizontal, vertical (e.g. I420 = true, true)
    ss_x: bool,
    ss_y: bool,
    monochrome: bool,
}

impl YuvPlanes {
    /// Convert YUV planes to interleaved RGB8 using BT.601 coefficients.
    fn to_rgb(&self) -> Vec<u8> {
        let max_val = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max_val;

        let mut rgb = vec![0u8; (self.width * self.height * 3) as usize];

        for row in 0..self.height {
            for col in 0..self.width {
                let y_val = read_sample(self.y_ptr, self.y_stride, col, row, self.bpc);

                let (r, g, b) = if self.monochrome {
                    let v = (y_val * scale).clamp(0.0, 255.0);
                    (v, v, v)
                } else {
                    let c_col = if self.ss_x { col / 2 } else { col };
                    let c_row = if self.ss_y { row / 2 } else { row };
                    let cb = read_sample(self.u_ptr, self.uv_stride, c_col, c_row, self.bpc) - center;
                    let cr = read_sample(self.v_ptr, self.uv_stride, c_col, c_row, self.bpc) - center;

                    (
                        ((y_val + 1.402 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val + 1.772 * cb) * scale).clamp(0.0, 255.0),
                    )
                };

                let idx = ((row * self.width + col) * 3) as usize;
                rgb[idx] = r as u8;
                rgb[idx + 1] = g as u8;
                rgb[idx + 2] = b as u8;
            }
        }

        rgb
    }
}

/// Read one sample from a YUV plane. 10/12-bit content is stored as u16.
#[inline]
fn read_sample(ptr: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *ptr.offset(y as isize * stride + x as isize) }) as f32
    } else {
        let byte_offset = y as isize * stride + x as isize * 2;
        (unsafe { (ptr.offset(byte_offset) as *const u16).read_unaligned() }) as f32
    }
}

/// Apply a resolved resize to a decoded image.
fn apply_resize(img: DynamicImage, op: ResizeOp) -> Result<DynamicImage, BackendError> {
    if !op.within_pixel_limit() {
        let (width, height) = op.output_dimensions((img.width(), img.height()));
        return Err(BackendError::TooLarge { width, height });
    }
    Ok(match op {
        ResizeOp::Keep => img,
        ResizeOp::Exact { width, height } => img.resize_exact(width, height, FilterType::Lanczos3),
        ResizeOp::FillCrop {
            width,
            height,
            crop_width,
            crop_height,
        } => {
            let filled = img.resize_exact(width, height, FilterType::Lanczos3);
            let x = (width - crop_width) / 2;
            let y = (height - crop_height) / 2;
            filled.crop_imm(x, y, crop_width, crop_height)
        }
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        if bytes.is_empty() {
            return Err(BackendError::Decode("empty input".into()));
        }
        if is_avif(bytes) {
            return identify_avif(bytes);
        }
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn transcode(
        &self,
        bytes: &[u8],
        plan: &ResizePlan,
        spec: &EncodeSpec,
    ) -> Result<EncodedImage, BackendError> {
        let img = decode(bytes)?;
        let source = (img.width(), img.height());
        let op = resolve_resize(source, plan);
        debug!(?source, ?op, format = spec.format.name(), "resolved resize");

        let resized = apply_resize(img, op)?;
        let (width, height) = (resized.width(), resized.height());
        let bytes = encoders::encode(&resized, spec)?;
        debug!(width, height, len = bytes.len(), "encoded");

        Ok(EncodedImage {
            bytes,
            width,
            height,
        })
    }
}
