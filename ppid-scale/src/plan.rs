// SPDX-License-Identifier: MIT
//! # Draw Plan Computation
//!
//! Maps a source size and a [`TargetSpec`] to the drawing instructions needed to
//! produce an ID photo: which part of the source to sample, where on the canvas
//! to put it, and what colour the canvas starts with.
//!
//! ## Modes
//!
//! 1. **Stretch**: whole source onto whole canvas. Aspect ratio is not preserved.
//! 2. **CropCenter**: cut the largest centred region of the source that has the
//!    target aspect ratio, then scale it onto the whole canvas.
//! 3. **FitContain**: scale the whole source uniformly until it fits, centre it,
//!    leave the rest of the canvas as background.
//!
//! All coordinates are `f64`. Rounding to whole pixels is the rasterizer's job
//! (see [`crate::cpu`]), so plans can be compared exactly in tests.

use std::fmt;

/// Opaque white. JPEG output has no alpha, so the canvas is always filled first.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        self.w as f64 / self.h as f64
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Axis-aligned rectangle in floating point pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    pub fn full(size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: size.w as f64,
            h: size.h as f64,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.w / self.h
    }
}

/// How the source is mapped onto the target canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ResizeMode {
    /// Fill the exact target bounds, distorting if aspect ratios differ.
    /// Used for custom size entry.
    #[clap(name = "stretch")]
    Stretch,
    /// Keep the target aspect ratio by cropping the source about its centre.
    /// Used for presets.
    #[clap(name = "crop")]
    CropCenter,
    /// Keep the whole source visible, scaled to fit and centred on white.
    #[clap(name = "fit")]
    FitContain,
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResizeMode::Stretch => "stretch",
            ResizeMode::CropCenter => "crop",
            ResizeMode::FitContain => "fit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Target width or height was zero.
    EmptyTarget(Size),
    /// Source width or height was zero.
    EmptySource(Size),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::EmptyTarget(s) => write!(f, "Target size must be positive, got {}", s),
            PlanError::EmptySource(s) => write!(f, "Source size must be positive, got {}", s),
        }
    }
}

impl std::error::Error for PlanError {}

/// Requested output: exact canvas size plus mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSpec {
    size: Size,
    mode: ResizeMode,
}

impl TargetSpec {
    /// Rejects zero dimensions; everything downstream relies on a non-empty canvas.
    pub fn new(width: u32, height: u32, mode: ResizeMode) -> Result<Self, PlanError> {
        let size = Size::new(width, height);
        if size.is_empty() {
            return Err(PlanError::EmptyTarget(size));
        }
        Ok(Self { size, mode })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }
}

/// Complete drawing instructions for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPlan {
    /// Original input dimensions
    pub input: Size,
    /// Output canvas, always exactly the target size
    pub canvas: Size,
    pub mode: ResizeMode,
    /// Fill applied to the whole canvas before drawing
    pub background: [u8; 3],
    /// Region of the source to sample
    pub src_rect: RectF,
    /// Region of the canvas the sampled source lands in
    pub dst_rect: RectF,
}

impl DrawPlan {
    /// True when the drawn region leaves part of the canvas showing background.
    pub fn has_padding(&self) -> bool {
        self.dst_rect != RectF::full(self.canvas)
    }
}

/// Compute the draw plan for rendering `input` at `target`.
///
/// Deterministic and side-effect free. Fails only on an empty source, since
/// [`TargetSpec`] already guarantees a non-empty canvas.
pub fn build_plan(input: Size, target: TargetSpec) -> Result<DrawPlan, PlanError> {
    if input.is_empty() {
        return Err(PlanError::EmptySource(input));
    }
    let canvas = target.size;
    let (src_rect, dst_rect) = match target.mode {
        ResizeMode::Stretch => (RectF::full(input), RectF::full(canvas)),
        ResizeMode::CropCenter => (center_crop(input, canvas), RectF::full(canvas)),
        ResizeMode::FitContain => (RectF::full(input), fit_contain(input, canvas)),
    };
    Ok(DrawPlan {
        input,
        canvas,
        mode: target.mode,
        background: WHITE,
        src_rect,
        dst_rect,
    })
}

/// Largest centred sub-rectangle of `input` with the aspect ratio of `canvas`.
/// Equal aspect ratios fall through to the height-cropping branch, which then
/// crops nothing.
fn center_crop(input: Size, canvas: Size) -> RectF {
    let (sw, sh) = (input.w as f64, input.h as f64);
    let source_aspect = input.aspect();
    let target_aspect = canvas.aspect();

    if source_aspect > target_aspect {
        let crop_h = sh;
        let crop_w = sh * target_aspect;
        RectF {
            x: (sw - crop_w) / 2.0,
            y: 0.0,
            w: crop_w,
            h: crop_h,
        }
    } else {
        let crop_w = sw;
        let crop_h = sw / target_aspect;
        RectF {
            x: 0.0,
            y: (sh - crop_h) / 2.0,
            w: crop_w,
            h: crop_h,
        }
    }
}

/// Uniformly scaled, centred placement of `input` inside `canvas`. Upscales
/// when the source is smaller than the canvas.
fn fit_contain(input: Size, canvas: Size) -> RectF {
    let (sw, sh) = (input.w as f64, input.h as f64);
    let (tw, th) = (canvas.w as f64, canvas.h as f64);
    let scale = (tw / sw).min(th / sh);
    let draw_w = sw * scale;
    let draw_h = sh * scale;
    RectF {
        x: (tw - draw_w) / 2.0,
        y: (th - draw_h) / 2.0,
        w: draw_w,
        h: draw_h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn stretch_maps_full_source_to_full_canvas() {
        let target = TargetSpec::new(300, 100, ResizeMode::Stretch).unwrap();
        let plan = build_plan(Size::new(50, 400), target).unwrap();
        assert_eq!(plan.canvas, Size::new(300, 100));
        assert_eq!(plan.src_rect, RectF::full(Size::new(50, 400)));
        assert_eq!(plan.dst_rect, RectF::full(Size::new(300, 100)));
        assert!(!plan.has_padding());
    }

    #[test]
    fn crop_center_wide_source_crops_width() {
        let target = TargetSpec::new(295, 413, ResizeMode::CropCenter).unwrap();
        let plan = build_plan(Size::new(1000, 800), target).unwrap();
        assert!(approx(plan.src_rect.w, 571.4));
        assert_eq!(plan.src_rect.h, 800.0);
        assert!(approx(plan.src_rect.x, 214.3));
        assert_eq!(plan.src_rect.y, 0.0);
        assert_eq!(plan.dst_rect, RectF::full(Size::new(295, 413)));
    }

    #[test]
    fn crop_center_tall_source_crops_height() {
        let target = TargetSpec::new(100, 100, ResizeMode::CropCenter).unwrap();
        let plan = build_plan(Size::new(200, 600), target).unwrap();
        assert_eq!(plan.src_rect.w, 200.0);
        assert_eq!(plan.src_rect.h, 200.0);
        assert_eq!(plan.src_rect.x, 0.0);
        assert_eq!(plan.src_rect.y, 200.0);
    }

    #[test]
    fn crop_center_equal_aspect_crops_nothing() {
        let target = TargetSpec::new(413, 626, ResizeMode::CropCenter).unwrap();
        let plan = build_plan(Size::new(826, 1252), target).unwrap();
        assert_eq!(plan.src_rect, RectF::full(Size::new(826, 1252)));
    }

    #[test]
    fn fit_contain_pillarboxes_tall_source() {
        let target = TargetSpec::new(800, 800, ResizeMode::FitContain).unwrap();
        let plan = build_plan(Size::new(400, 600), target).unwrap();
        assert!(approx(plan.dst_rect.w, 533.3));
        assert_eq!(plan.dst_rect.h, 800.0);
        assert!(approx(plan.dst_rect.x, 133.3));
        assert_eq!(plan.dst_rect.y, 0.0);
        assert_eq!(plan.src_rect, RectF::full(Size::new(400, 600)));
        assert!(plan.has_padding());
    }

    #[test]
    fn background_is_white() {
        let target = TargetSpec::new(10, 10, ResizeMode::FitContain).unwrap();
        let plan = build_plan(Size::new(10, 20), target).unwrap();
        assert_eq!(plan.background, WHITE);
    }

    #[test]
    fn zero_target_is_rejected() {
        assert_eq!(
            TargetSpec::new(0, 10, ResizeMode::Stretch),
            Err(PlanError::EmptyTarget(Size::new(0, 10)))
        );
        assert!(TargetSpec::new(10, 0, ResizeMode::CropCenter).is_err());
    }

    #[test]
    fn zero_source_is_rejected() {
        let target = TargetSpec::new(10, 10, ResizeMode::Stretch).unwrap();
        assert!(matches!(
            build_plan(Size::new(0, 5), target),
            Err(PlanError::EmptySource(_))
        ));
    }
}
