//! # PixelPerfect ID
//!
//! Resize and crop photos to standard ID-photo sizes, optionally ask a vision
//! model whether the result is suitable, and save it as JPEG.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `loader`: decodes uploads into an immutable `SourceImage`
//! - `render`: runs a draw plan (from `ppid_scale`) and encodes JPEG
//! - `critique`: vision model client with placeholder fallbacks
//! - `session`: user actions and session state, including the critique cache
//! - `shell`: interactive line-based front end
//! - `config`: configuration and the injected API key
//! - `error`: structured error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use pixelperfect_id::{PhotoJob, Sizing, process_photo};
//! use pixelperfect_id::config::StudioConfig;
//!
//! let job = PhotoJob {
//!     input: "me.jpg".into(),
//!     sizing: Sizing::Preset("1inch".to_string()),
//!     critique: false,
//! };
//! let report = process_photo(StudioConfig::from_env(), job)?;
//! println!("saved {}", report.saved.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use ppid_scale::plan::{Size, TargetSpec};

pub mod config;
pub mod critique;
pub mod error;
pub mod loader;
pub mod render;
pub mod session;
pub mod shell;

pub use error::{HasRecoverySuggestion, HasSeverity, StudioError, StudioResult};
pub use session::{Action, Outcome, Session};

/// How a one-shot job sizes the photo.
#[derive(Debug, Clone, PartialEq)]
pub enum Sizing {
    /// Catalog preset id, center-cropped.
    Preset(String),
    /// Raw width/height text, stretched.
    Custom { width: String, height: String },
    /// Explicit size and mode.
    Exact(TargetSpec),
}

/// A single load → resize → (critique) → save run.
#[derive(Debug, Clone)]
pub struct PhotoJob {
    pub input: PathBuf,
    pub sizing: Sizing,
    pub critique: bool,
}

/// What a one-shot job produced.
#[derive(Debug, Clone)]
pub struct PhotoReport {
    pub original: Size,
    pub output: Size,
    pub saved: PathBuf,
    pub critique: Option<critique::Critique>,
}

/// Run a [`PhotoJob`] through a fresh [`Session`].
pub fn process_photo(config: config::StudioConfig, job: PhotoJob) -> Result<PhotoReport> {
    config.validate().map_err(anyhow::Error::msg)?;
    let mut session = Session::new(config);

    let original = match session
        .dispatch(Action::Load { path: job.input.clone() })
        .with_context(|| format!("loading {}", job.input.display()))?
    {
        Outcome::Loaded { size, .. } => size,
        other => return Err(anyhow!("unexpected outcome {:?}", other)),
    };

    let action = match job.sizing {
        Sizing::Preset(id) => Action::ApplyPreset { id },
        Sizing::Custom { width, height } => Action::ApplyCustom { width, height },
        Sizing::Exact(target) => Action::Resize { target },
    };
    let output = match session.dispatch(action)? {
        Outcome::Rendered { size, .. } => size,
        other => return Err(anyhow!("unexpected outcome {:?}", other)),
    };

    let critique = if job.critique {
        match session.dispatch(Action::Critique { force: false })? {
            Outcome::Critiqued { critique, .. } => Some(critique),
            other => return Err(anyhow!("unexpected outcome {:?}", other)),
        }
    } else {
        None
    };

    let saved = match session.dispatch(Action::Download { dir: None })? {
        Outcome::Saved { path, .. } => path,
        other => return Err(anyhow!("unexpected outcome {:?}", other)),
    };

    Ok(PhotoReport {
        original,
        output,
        saved,
        critique,
    })
}
