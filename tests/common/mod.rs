//! Shared helpers for integration tests: synthetic photos and a scripted vision model.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use pixelperfect_id::StudioResult;
use pixelperfect_id::critique::VisionModel;
use pixelperfect_id::error::StudioError;

/// Photo with a distinct colour per quadrant, so crops and flips are visible.
pub fn quadrant_photo(w: u32, h: u32) -> RgbaImage {
    ImageBuffer::from_fn(w, h, |x, y| match (x < w / 2, y < h / 2) {
        (true, true) => Rgba([220, 30, 30, 255]),
        (false, true) => Rgba([30, 220, 30, 255]),
        (true, false) => Rgba([30, 30, 220, 255]),
        (false, false) => Rgba([230, 230, 30, 255]),
    })
}

pub fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode test image");
    out.into_inner()
}

/// Write a PNG test photo into `dir` and return its path.
pub fn write_photo(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode(&quadrant_photo(w, h), ImageFormat::Png)).expect("write test photo");
    path
}

/// Vision model double: fixed reply, records every call.
#[derive(Clone)]
pub struct ScriptedModel {
    pub reply: Option<String>,
    pub calls: Rc<Cell<usize>>,
    pub seen: Rc<RefCell<Vec<(usize, String)>>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl VisionModel for ScriptedModel {
    fn generate(&self, image: &[u8], mime: &str, _prompt: &str) -> StudioResult<String> {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push((image.len(), mime.to_string()));
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(StudioError::http_status("critique", 503)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
