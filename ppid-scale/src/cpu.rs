// SPDX-License-Identifier: MIT
// CPU rasterizer built on fast_image_resize (SIMD-accelerated).
// RGBA8 source in → RGB8 canvas out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeOptions, Resizer};

use crate::plan::{DrawPlan, RectF, Size};

#[derive(Debug)]
pub enum RenderError {
    BufferTooSmall,
    SourceTooSmall,
    /// Pixel buffer length does not fit in `usize`.
    CanvasTooLarge(Size),
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for RenderError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for RenderError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<fir::CropBoxError> for RenderError { fn from(e: fir::CropBoxError) -> Self { Self::Crop(e) } }

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::BufferTooSmall => write!(f, "Canvas buffer too small"),
            RenderError::SourceTooSmall => write!(f, "Source buffer shorter than its dimensions"),
            RenderError::CanvasTooLarge(size) => write!(f, "Canvas {} is too large to allocate", size),
            RenderError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            RenderError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            RenderError::Crop(e) => write!(f, "Crop error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Fir(e) => Some(e),
            RenderError::ImageBuf(e) => Some(e),
            RenderError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Reusable scratch holding the source flattened onto the background as RGB8.
pub struct Staging {
    pub(crate) buf: Vec<u8>,
}
impl Staging {
    pub fn with_capacity(cap: usize) -> Self { Self { buf: Vec::with_capacity(cap) } }
    pub fn ensure_len(&mut self, len: usize) { if self.buf.len() < len { self.buf.resize(len, 0); } }
    pub fn as_slice(&self) -> &[u8] { &self.buf }
}

/// Bytes needed for an RGB8 canvas of `size`.
pub fn canvas_len(size: Size) -> Result<usize, RenderError> {
    pixel_len(size, 3)
}

fn pixel_len(size: Size, channels: usize) -> Result<usize, RenderError> {
    (size.w as usize)
        .checked_mul(size.h as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(RenderError::CanvasTooLarge(size))
}

/// Execute `plan` against a tightly packed RGBA8 source.
/// `dst` must hold at least `canvas_len(plan.canvas)` bytes; the first that many
/// bytes are overwritten with the finished RGB8 canvas.
pub fn render_rgb_cpu(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    plan: &DrawPlan,
    dst: &mut [u8],
    staging: &mut Staging,
) -> Result<(), RenderError> {
    let src = plan.input;
    let src_len = pixel_len(src, 4)?;
    if src_rgba.len() < src_len {
        return Err(RenderError::SourceTooSmall);
    }
    let dst_len = canvas_len(plan.canvas)?;
    if dst.len() < dst_len {
        return Err(RenderError::BufferTooSmall);
    }

    // --- Source view: composite alpha over the background up front ---
    let flat_len = canvas_len(src)?;
    staging.ensure_len(flat_len);
    flatten_rgba(&src_rgba[..src_len], &mut staging.buf[..flat_len], plan.background);
    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, &staging.buf[..flat_len])?;

    // --- Canvas: background first, then the drawn region ---
    let canvas = &mut dst[..dst_len];
    fill_rgb(canvas, plan.background);
    let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.canvas.w, plan.canvas.h, canvas)?;

    let r = plan.src_rect;
    let opts = ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
        .crop(r.x, r.y, r.w, r.h);

    let (x, y, w, h) = snap_rect(plan.dst_rect, plan.canvas);
    if (x, y, w, h) == (0, 0, plan.canvas.w, plan.canvas.h) {
        resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;
    } else {
        let mut roi = TypedCroppedImageMut::from_ref(&mut dst_image, x, y, w, h)?;
        resizer.resize_typed::<U8x3>(&src_view, &mut roi, &opts)?;
    }

    Ok(())
}

/// Round a destination rectangle to whole canvas pixels.
/// Edges are rounded independently so adjacent padding bands stay symmetric;
/// the result is clamped to the canvas and at least 1px on each side.
pub fn snap_rect(rect: RectF, canvas: Size) -> (u32, u32, u32, u32) {
    let (x0, x1) = snap_span(rect.x, rect.w, canvas.w);
    let (y0, y1) = snap_span(rect.y, rect.h, canvas.h);
    (x0, y0, x1 - x0, y1 - y0)
}

#[inline]
fn snap_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let lo = (start.round().max(0.0) as u32).min(limit.saturating_sub(1));
    let hi = ((start + len).round().max(0.0) as u32).clamp(lo + 1, limit);
    (lo, hi)
}

#[inline]
fn fill_rgb(dst: &mut [u8], bg: [u8; 3]) {
    for px in dst.chunks_exact_mut(3) {
        px.copy_from_slice(&bg);
    }
}

/// Alpha-composite RGBA over an opaque background into packed RGB.
#[inline]
fn flatten_rgba(src: &[u8], dst: &mut [u8], bg: [u8; 3]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        let a = s[3] as u32;
        if a == 255 {
            d.copy_from_slice(&s[..3]);
            continue;
        }
        for c in 0..3 {
            d[c] = ((s[c] as u32 * a + bg[c] as u32 * (255 - a) + 127) / 255) as u8;
        }
    }
}
