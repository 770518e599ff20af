// SPDX-License-Identifier: MIT
//! # ppid-scale: ID Photo Geometry and Rasterization
//!
//! Pure geometry for turning an arbitrary photo into a fixed-size ID photo,
//! plus a CPU rasterizer that executes the resulting plan.
//!
//! ## Key Components
//!
//! - [`plan`]: `TargetSpec` → `DrawPlan` for Stretch, CropCenter and FitContain
//! - [`presets`]: the static ID-photo size catalog
//! - [`cpu`]: executes a `DrawPlan` into an RGB8 canvas using fast_image_resize
//!
//! ## Usage Example
//!
//! ```rust
//! use ppid_scale::plan::{build_plan, ResizeMode, Size, TargetSpec};
//! use ppid_scale::cpu::{canvas_len, render_rgb_cpu, Staging};
//!
//! let input = Size::new(1000, 800);
//! let plan = build_plan(input, TargetSpec::new(295, 413, ResizeMode::CropCenter)?)?;
//!
//! let rgba = vec![128u8; (input.w * input.h * 4) as usize];
//! let mut resizer = fast_image_resize::Resizer::new();
//! let mut staging = Staging::with_capacity(0);
//! let mut canvas = vec![0u8; canvas_len(plan.canvas)?];
//! render_rgb_cpu(&mut resizer, &rgba, &plan, &mut canvas, &mut staging)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cpu;
pub mod plan;
pub mod presets;
