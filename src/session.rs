//! # Studio Session
//!
//! State and action handlers behind both the one-shot CLI and the interactive
//! shell. Every user action is an [`Action`] handled to completion by
//! [`Session::dispatch`]; nothing runs in the background.
//!
//! ## State
//!
//! - the uploaded [`SourceImage`], kept unmodified until the next upload
//! - the latest [`RenderedImage`], replaced by every resize
//! - which of the two is displayed (reset switches back to the original)
//! - the custom width/height inputs
//! - the last critique, keyed by the identity of the image it describes
//!
//! ## Invariants
//!
//! - Renders always read the source, never a previous render.
//! - A failed action leaves the state exactly as it was.
//! - A cached critique is only returned for the image it was computed from.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ppid_scale::plan::{ResizeMode, Size, TargetSpec};
use ppid_scale::presets;

use crate::config::StudioConfig;
use crate::critique::{Critic, Critique};
use crate::error::{StudioError, StudioResult};
use crate::loader::SourceImage;
use crate::render::{JPEG_MIME, RenderSurface, RenderedImage};

/// A discrete user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Load a new photo, replacing the current one.
    Load { path: PathBuf },
    /// Render a catalog preset (center crop).
    ApplyPreset { id: String },
    /// Render raw width/height input (stretch).
    ApplyCustom { width: String, height: String },
    /// Render an explicit target.
    Resize { target: TargetSpec },
    /// Display the original upload again.
    Reset,
    /// Save the displayed image into `dir`, or the configured output directory.
    Download { dir: Option<PathBuf> },
    /// Critique the displayed image. `force` bypasses the cache.
    Critique { force: bool },
    /// Report the current state.
    Status,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Load { .. } => "load",
            Action::ApplyPreset { .. } => "apply_preset",
            Action::ApplyCustom { .. } => "apply_custom",
            Action::Resize { .. } => "resize",
            Action::Reset => "reset",
            Action::Download { .. } => "download",
            Action::Critique { .. } => "critique",
            Action::Status => "status",
        }
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded { name: String, size: Size },
    Rendered { size: Size, mode: ResizeMode, render_id: u64 },
    Restored { size: Size },
    Saved { path: PathBuf, bytes: usize },
    Critiqued { critique: Critique, cached: bool },
    Status(Status),
}

/// Snapshot of the session for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub source: Option<(String, Size)>,
    pub displayed: Option<Size>,
    pub showing_original: bool,
    pub inputs: (String, String),
    pub critique_cached: bool,
    pub critique_available: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            None => write!(f, "No photo loaded")?,
            Some((name, size)) => {
                write!(f, "Photo: {} ({})", name, size)?;
                if let Some(shown) = self.displayed {
                    let what = if self.showing_original { "original" } else { "resized" };
                    write!(f, "\nShowing: {} {}", what, shown)?;
                }
                write!(f, "\nSize inputs: {} x {}", self.inputs.0, self.inputs.1)?;
            }
        }
        write!(
            f,
            "\nAI critique: {}",
            match (self.critique_available, self.critique_cached) {
                (false, _) => "no API key",
                (true, true) => "cached",
                (true, false) => "ready",
            }
        )
    }
}

/// Identity of the displayed image: which upload, and which render of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageKey {
    upload: u64,
    render: Option<u64>,
}

enum Displayed {
    Original,
    Rendered(RenderedImage),
}

/// Interactive studio state.
pub struct Session {
    config: StudioConfig,
    surface: RenderSurface,
    critic: Critic,
    source: Option<SourceImage>,
    upload_seq: u64,
    displayed: Displayed,
    inputs: (String, String),
    processing: bool,
    critique: Option<(ImageKey, Critique)>,
}

impl Session {
    /// Session with a critic built from the configured credential.
    pub fn new(config: StudioConfig) -> Self {
        let critic = Critic::from_config(&config);
        Self::with_critic(config, critic)
    }

    pub fn with_critic(config: StudioConfig, critic: Critic) -> Self {
        Self {
            surface: RenderSurface::new(config.jpeg_quality),
            config,
            critic,
            source: None,
            upload_seq: 0,
            displayed: Displayed::Original,
            inputs: (String::new(), String::new()),
            processing: false,
            critique: None,
        }
    }

    /// Handle one action to completion.
    pub fn dispatch(&mut self, action: Action) -> StudioResult<Outcome> {
        let name = action.name();
        log::debug!("▶️ {}", name);
        let result = match action {
            Action::Load { path } => self.load(&path),
            Action::ApplyPreset { id } => self.apply_preset(&id),
            Action::ApplyCustom { width, height } => self.apply_custom(&width, &height),
            Action::Resize { target } => self.apply_resize(target),
            Action::Reset => self.reset(),
            Action::Download { dir } => self.download(dir.as_deref()),
            Action::Critique { force } => self.request_critique(force),
            Action::Status => Ok(Outcome::Status(self.status())),
        };
        if let Err(e) = &result {
            log::warn!("⚠️ {} failed: {}", name, e);
        }
        result.map_err(|e| e.with_operation(name))
    }

    /// Replace the current photo. On failure nothing changes.
    pub fn load(&mut self, path: &Path) -> StudioResult<Outcome> {
        let source = SourceImage::open(path)?;
        Ok(self.install(source))
    }

    /// Replace the current photo with already decoded bytes.
    pub fn load_bytes(&mut self, bytes: Vec<u8>, name: &str) -> StudioResult<Outcome> {
        let source = SourceImage::decode(bytes, name)?;
        Ok(self.install(source))
    }

    fn install(&mut self, source: SourceImage) -> Outcome {
        let size = source.size();
        let name = source.name().to_string();
        self.upload_seq += 1;
        self.source = Some(source);
        self.displayed = Displayed::Original;
        self.set_inputs(size);
        self.critique = None;
        Outcome::Loaded { name, size }
    }

    pub fn apply_preset(&mut self, id: &str) -> StudioResult<Outcome> {
        let preset = presets::find(id).ok_or_else(|| {
            StudioError::validation("preset", "must be one of 1inch, 2inch, 2inch_lg", id)
        })?;
        self.apply_resize(preset.to_target()?)
    }

    /// Stretch to user-entered dimensions. Both must be positive integers.
    pub fn apply_custom(&mut self, width: &str, height: &str) -> StudioResult<Outcome> {
        let w = parse_dimension("width", width)?;
        let h = parse_dimension("height", height)?;
        self.apply_resize(TargetSpec::new(w, h, ResizeMode::Stretch)?)
    }

    pub fn apply_resize(&mut self, target: TargetSpec) -> StudioResult<Outcome> {
        let source = self.source.as_ref().ok_or_else(|| no_photo("resize"))?;

        self.processing = true;
        let result = self.surface.render(source, target);
        self.processing = false;

        let rendered = result?;
        let outcome = Outcome::Rendered {
            size: rendered.size(),
            mode: rendered.mode(),
            render_id: rendered.id(),
        };
        self.set_inputs(rendered.size());
        self.displayed = Displayed::Rendered(rendered);
        self.critique = None;
        Ok(outcome)
    }

    /// Show the original upload again, at its natural size.
    pub fn reset(&mut self) -> StudioResult<Outcome> {
        let size = self.require_source("reset")?.size();
        self.displayed = Displayed::Original;
        self.set_inputs(size);
        Ok(Outcome::Restored { size })
    }

    /// Write the displayed image as JPEG to `dir` (or the configured output directory).
    /// The original is encoded at its natural size when no render is shown.
    pub fn download(&mut self, dir: Option<&Path>) -> StudioResult<Outcome> {
        let source = self.source.as_ref().ok_or_else(|| no_photo("download"))?;
        let encoded;
        let bytes: &[u8] = match &self.displayed {
            Displayed::Rendered(r) => r.jpeg(),
            Displayed::Original => {
                encoded = self.surface.encode_original(source)?;
                &encoded
            }
        };
        let dir = dir.unwrap_or(&self.config.output_dir);
        let path = dir.join(download_name(&self.config.file_prefix, "jpg"));
        write_atomically(dir, &path, bytes)?;
        log::info!("💾 Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(Outcome::Saved {
            path,
            bytes: bytes.len(),
        })
    }

    /// Critique the displayed image, reusing the cached result for the same image.
    pub fn request_critique(&mut self, force: bool) -> StudioResult<Outcome> {
        let key = self.displayed_key("critique")?;
        if !force {
            if let Some((cached_key, critique)) = &self.critique {
                if *cached_key == key {
                    log::debug!("♻️ Critique cache hit for {:?}", key);
                    return Ok(Outcome::Critiqued {
                        critique: critique.clone(),
                        cached: true,
                    });
                }
            }
        }

        let (bytes, mime) = self.displayed_bytes("critique")?;
        let critique = self.critic.critique(bytes, mime);
        // Only model output is worth keeping; placeholders are retried on request.
        if matches!(critique, Critique::Report(_)) {
            self.critique = Some((key, critique.clone()));
        }
        Ok(Outcome::Critiqued {
            critique,
            cached: false,
        })
    }

    pub fn status(&self) -> Status {
        Status {
            source: self
                .source
                .as_ref()
                .map(|s| (s.name().to_string(), s.size())),
            displayed: self.displayed_size(),
            showing_original: matches!(self.displayed, Displayed::Original),
            inputs: self.inputs.clone(),
            critique_cached: match (&self.critique, self.displayed_key("status")) {
                (Some((k, _)), Ok(key)) => *k == key,
                _ => false,
            },
            critique_available: self.critic.is_available(),
        }
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn rendered(&self) -> Option<&RenderedImage> {
        match &self.displayed {
            Displayed::Rendered(r) => Some(r),
            Displayed::Original => None,
        }
    }

    /// Dimensions of whatever is currently shown.
    pub fn displayed_size(&self) -> Option<Size> {
        let source = self.source.as_ref()?;
        Some(match &self.displayed {
            Displayed::Rendered(r) => r.size(),
            Displayed::Original => source.size(),
        })
    }

    pub fn inputs(&self) -> (&str, &str) {
        (&self.inputs.0, &self.inputs.1)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    fn set_inputs(&mut self, size: Size) {
        self.inputs = (size.w.to_string(), size.h.to_string());
    }

    fn require_source(&self, operation: &str) -> StudioResult<&SourceImage> {
        self.source.as_ref().ok_or_else(|| no_photo(operation))
    }

    fn displayed_key(&self, operation: &str) -> StudioResult<ImageKey> {
        self.require_source(operation)?;
        Ok(ImageKey {
            upload: self.upload_seq,
            render: match &self.displayed {
                Displayed::Rendered(r) => Some(r.id()),
                Displayed::Original => None,
            },
        })
    }

    fn displayed_bytes(&self, operation: &str) -> StudioResult<(&[u8], &'static str)> {
        let source = self.require_source(operation)?;
        Ok(match &self.displayed {
            Displayed::Rendered(r) => (r.jpeg(), JPEG_MIME),
            Displayed::Original => (source.encoded(), source.mime_type()),
        })
    }
}

fn no_photo(operation: &str) -> StudioError {
    StudioError::state("no photo is loaded", operation, "nothing to work on")
        .with_recovery_suggestion("Load a photo first")
}

/// Parse a user-entered dimension: a positive integer, surrounding whitespace allowed.
pub fn parse_dimension(field: &str, raw: &str) -> StudioResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(StudioError::validation(field, "must be a positive integer", raw)
            .with_recovery_suggestion("Enter whole numbers greater than zero")),
    }
}

/// `<prefix>-<unix millis>.<ext>`
pub fn download_name(prefix: &str, ext: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}.{}", prefix, millis, ext)
}

/// Write through a temp file in `dir` so a failed save never leaves a partial image.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> StudioResult<()> {
    let display = path.display().to_string();
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| StudioError::io_at("download", &display, e))?;
    tmp.write_all(bytes)
        .map_err(|e| StudioError::io_at("download", &display, e))?;
    tmp.persist(path)
        .map_err(|e| StudioError::io_at("download", &display, e.error))?;
    Ok(())
}
