//! # Load Adapter
//!
//! Turns user-supplied bytes into a [`SourceImage`]: the decoded RGBA8 bitmap,
//! its natural size, and the untouched original bytes. Validation is left
//! entirely to the `image` decoders; anything they accept is accepted.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;
use ppid_scale::plan::Size;

use crate::error::{StudioError, StudioResult};

/// Decoded upload. Immutable; every render starts from this.
#[derive(Clone)]
pub struct SourceImage {
    name: String,
    size: Size,
    rgba: Arc<Vec<u8>>,
    encoded: Arc<Vec<u8>>,
    format: ImageFormat,
}

impl SourceImage {
    /// Decode `bytes`. `name` is used in logs and error messages only.
    pub fn decode(bytes: Vec<u8>, name: impl Into<String>) -> StudioResult<Self> {
        let name = name.into();
        let format = image::guess_format(&bytes).map_err(|e| {
            StudioError::decode(&name, e.to_string())
                .with_operation("load")
                .with_recovery_suggestion("Use a JPG, PNG or WEBP photo")
        })?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| StudioError::decode(&name, e.to_string()).with_operation("load"))?;

        let size = Size::new(decoded.width(), decoded.height());
        if size.is_empty() {
            return Err(StudioError::decode(&name, "image has no pixels").with_operation("load"));
        }

        log::info!(
            "📷 Loaded {} ({:?}, {}, {} bytes)",
            name,
            format,
            size,
            bytes.len()
        );

        Ok(Self {
            name,
            size,
            rgba: Arc::new(decoded.into_rgba8().into_raw()),
            encoded: Arc::new(bytes),
            format,
        })
    }

    /// Read and decode a file from disk.
    pub fn open(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| {
            StudioError::io_at("read upload", &display, e)
                .with_recovery_suggestion("Check that the file exists and is readable")
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(display);
        Self::decode(bytes, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Natural width and height in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Tightly packed RGBA8 pixels, `size.w * size.h * 4` bytes.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// The bytes exactly as uploaded.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("format", &self.format)
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}
