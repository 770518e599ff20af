//! # Rendering Surface
//!
//! Executes a draw plan against a [`SourceImage`] and encodes the canvas as
//! JPEG. The resizer, the flattening scratch buffer and the canvas buffer are
//! kept between renders so repeated preset clicks do not reallocate.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use fast_image_resize::Resizer;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use ppid_scale::cpu::{Staging, canvas_len, render_rgb_cpu};
use ppid_scale::plan::{DrawPlan, ResizeMode, Size, TargetSpec, build_plan};

use crate::error::{StudioError, StudioResult};
use crate::loader::SourceImage;

pub const JPEG_MIME: &str = "image/jpeg";

/// Largest width or height a baseline JPEG can carry.
pub const MAX_JPEG_SIDE: u32 = u16::MAX as u32;

/// Encoded output of one render. Never modified; a new render replaces it.
#[derive(Clone)]
pub struct RenderedImage {
    id: u64,
    size: Size,
    mode: ResizeMode,
    jpeg: Arc<Vec<u8>>,
}

impl RenderedImage {
    /// Identity of this render, unique within a [`RenderSurface`].
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }

    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedImage")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("mode", &self.mode)
            .field("jpeg_len", &self.jpeg.len())
            .finish()
    }
}

/// Off-screen canvas plus encoder.
pub struct RenderSurface {
    resizer: Resizer,
    staging: Staging,
    canvas: Vec<u8>,
    quality: u8,
    next_id: u64,
}

impl RenderSurface {
    pub fn new(quality: u8) -> Self {
        Self {
            resizer: Resizer::new(),
            staging: Staging::with_capacity(0),
            canvas: Vec::new(),
            quality,
            next_id: 1,
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Render `source` at `target`. Always reads the source's own pixels, so
    /// the result never depends on earlier renders.
    pub fn render(&mut self, source: &SourceImage, target: TargetSpec) -> StudioResult<RenderedImage> {
        let started = Instant::now();
        let plan = build_plan(source.size(), target)?;
        log::debug!(
            "🧮 Plan {} -> {} ({}): src {:?} dst {:?}",
            plan.input,
            plan.canvas,
            plan.mode,
            plan.src_rect,
            plan.dst_rect
        );

        let jpeg = self.rasterize_and_encode(source, &plan).map_err(|e| {
            e.with_context(format!("rendering {} as {} {}", source.name(), plan.mode, plan.canvas))
        })?;

        let id = self.next_id;
        self.next_id += 1;
        log::info!(
            "🖼️ Rendered #{} {} {} ({} bytes, {:.1?})",
            id,
            plan.mode,
            plan.canvas,
            jpeg.len(),
            started.elapsed()
        );

        Ok(RenderedImage {
            id,
            size: plan.canvas,
            mode: plan.mode,
            jpeg: Arc::new(jpeg),
        })
    }

    /// JPEG of the source at its natural size, transparency flattened onto white.
    pub fn encode_original(&mut self, source: &SourceImage) -> StudioResult<Vec<u8>> {
        let size = source.size();
        let plan = build_plan(size, TargetSpec::new(size.w, size.h, ResizeMode::Stretch)?)?;
        let jpeg = self
            .rasterize_and_encode(source, &plan)
            .map_err(|e| e.with_context(format!("encoding {} as JPEG", source.name())))?;
        log::debug!("🗜️ Encoded original {} ({} bytes)", size, jpeg.len());
        Ok(jpeg)
    }

    fn rasterize_and_encode(&mut self, source: &SourceImage, plan: &DrawPlan) -> StudioResult<Vec<u8>> {
        let len = self.reserve_canvas(plan.canvas)?;
        self.canvas.resize(len, 0);
        render_rgb_cpu(
            &mut self.resizer,
            source.rgba(),
            plan,
            &mut self.canvas,
            &mut self.staging,
        )?;

        let mut jpeg = Vec::with_capacity(len / 8);
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.quality);
        encoder
            .encode(&self.canvas[..len], plan.canvas.w, plan.canvas.h, ExtendedColorType::Rgb8)
            .map_err(|e| StudioError::encoding("jpeg", e.to_string()))?;
        Ok(jpeg)
    }

    /// Check `size` against the encoder limits and reserve its buffer without aborting.
    fn reserve_canvas(&mut self, size: Size) -> StudioResult<usize> {
        if size.w > MAX_JPEG_SIDE || size.h > MAX_JPEG_SIDE {
            return Err(StudioError::processing(
                "allocate_canvas",
                format!("{} exceeds the JPEG limit of {} pixels per side", size, MAX_JPEG_SIDE),
            ));
        }
        let len = canvas_len(size)?;
        self.canvas
            .try_reserve_exact(len.saturating_sub(self.canvas.len()))
            .map_err(|e| StudioError::processing("allocate_canvas", format!("{}: {}", size, e)))?;
        Ok(len)
    }
}
