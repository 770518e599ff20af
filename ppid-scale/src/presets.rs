// SPDX-License-Identifier: MIT
//! # ID Photo Presets
//!
//! Static catalog of standard ID-photo sizes. Pixel counts are the millimetre
//! dimensions at 300 dpi, rounded the way print shops quote them.
//!
//! | Preset     | Millimetres | Pixels    |
//! |------------|-------------|-----------|
//! | `1inch`    | 25 × 35     | 295 × 413 |
//! | `2inch`    | 35 × 49     | 413 × 579 |
//! | `2inch_lg` | 35 × 53     | 413 × 626 |
//!
//! Presets always render with [`ResizeMode::CropCenter`] so the subject is
//! never distorted or letterboxed.

use crate::plan::{PlanError, ResizeMode, Size, TargetSpec};

/// One catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub description: &'static str,
}

impl IdPreset {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Target for this preset. Catalog sizes are non-zero, so this only fails
    /// for hand-built entries.
    pub fn to_target(&self) -> Result<TargetSpec, PlanError> {
        TargetSpec::new(self.width, self.height, ResizeMode::CropCenter)
    }
}

pub const ID_PRESETS: [IdPreset; 3] = [
    IdPreset {
        id: "1inch",
        label: "1 Inch (1寸)",
        width: 295,
        height: 413,
        description: "25mm x 35mm @ 300dpi - Standard ID",
    },
    IdPreset {
        id: "2inch",
        label: "2 Inch (2寸)",
        width: 413,
        height: 579,
        description: "35mm x 49mm @ 300dpi - Passport/Visa",
    },
    IdPreset {
        id: "2inch_lg",
        label: "Large 2 Inch (大2寸)",
        width: 413,
        height: 626,
        description: "35mm x 53mm @ 300dpi",
    },
];

/// Command-line name for each catalog entry.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetId {
    #[clap(name = "1inch")]
    OneInch,
    #[clap(name = "2inch")]
    TwoInch,
    #[clap(name = "2inch_lg")]
    TwoInch_Large,
}

impl PresetId {
    pub fn preset(self) -> &'static IdPreset {
        match self {
            PresetId::OneInch => &ID_PRESETS[0],
            PresetId::TwoInch => &ID_PRESETS[1],
            PresetId::TwoInch_Large => &ID_PRESETS[2],
        }
    }
}

/// All presets in display order.
pub fn all() -> &'static [IdPreset] {
    &ID_PRESETS
}

/// Look up a preset by its identifier (`1inch`, `2inch`, `2inch_lg`).
pub fn find(id: &str) -> Option<&'static IdPreset> {
    ID_PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}
