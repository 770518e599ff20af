//! # Interactive Shell
//!
//! Line-oriented front end for [`Session`]. One line is one action; the loop
//! handles it to completion, prints the outcome, then reads the next line.
//!
//! ```text
//! load <path>                 load a photo
//! preset <1inch|2inch|2inch_lg>
//! size <width> <height>       stretch to a custom size
//! mode <stretch|crop|fit> <width> <height>
//! reset                       show the original again
//! save [dir]                  save the displayed image
//! critique [--force]          AI suitability critique
//! presets | info | help | quit
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use ppid_scale::plan::{ResizeMode, TargetSpec};
use ppid_scale::presets;

use crate::critique::{Critique, Verdict};
use crate::error::{ErrorSeverity, HasRecoverySuggestion, HasSeverity, StudioResult};
use crate::session::{Action, Outcome, Session, parse_dimension};

pub const HELP: &str = "\
Commands:
  load <path>                      load a photo
  preset <1inch|2inch|2inch_lg>    crop to an ID preset
  size <width> <height>            stretch to a custom size
  mode <stretch|crop|fit> <w> <h>  resize with an explicit mode
  reset                            show the original photo again
  save [dir]                       save the displayed image
  critique [--force]               ask the AI for a suitability critique
  presets                          list ID presets
  info                             show the current state
  help                             show this help
  quit                             exit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Action),
    Presets,
    Help,
    Quit,
    Empty,
}

/// Parse one input line. Errors are usage messages for the user.
pub fn parse_line(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("load" | "open", [_, ..]) => Command::Run(Action::Load {
            path: PathBuf::from(line.trim()[verb.len()..].trim()),
        }),
        ("preset", [id]) => Command::Run(Action::ApplyPreset { id: id.to_string() }),
        ("size", [w, h]) => Command::Run(Action::ApplyCustom {
            width: w.to_string(),
            height: h.to_string(),
        }),
        ("mode", [mode, w, h]) => {
            let mode = ResizeMode::from_str(mode, true)
                .map_err(|_| format!("Unknown mode '{}'. Use stretch, crop or fit", mode))?;
            let w = parse_dimension("width", w).map_err(|e| e.to_string())?;
            let h = parse_dimension("height", h).map_err(|e| e.to_string())?;
            let target = TargetSpec::new(w, h, mode).map_err(|e| e.to_string())?;
            Command::Run(Action::Resize { target })
        }
        ("reset", []) => Command::Run(Action::Reset),
        ("save" | "download", []) => Command::Run(Action::Download { dir: None }),
        ("save" | "download", [_, ..]) => Command::Run(Action::Download {
            dir: Some(PathBuf::from(line.trim()[verb.len()..].trim())),
        }),
        ("critique" | "analyze", []) => Command::Run(Action::Critique { force: false }),
        ("critique" | "analyze", ["--force" | "-f"]) => {
            Command::Run(Action::Critique { force: true })
        }
        ("info" | "status", []) => Command::Run(Action::Status),
        ("presets", []) => Command::Presets,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        _ => return Err(format!("Unrecognized command: {}. Type 'help'.", line.trim())),
    };
    Ok(command)
}

/// Render an outcome as user-facing text.
pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Loaded { name, size } => format!("✅ Loaded {} ({})", name, size),
        Outcome::Rendered { size, mode, .. } => format!("✅ Resized to {} ({})", size, mode),
        Outcome::Restored { size } => format!("↩️ Showing original ({})", size),
        Outcome::Saved { path, bytes } => format!("💾 Saved {} ({} bytes)", path.display(), bytes),
        Outcome::Critiqued { critique, cached } => describe_critique(critique, *cached),
        Outcome::Status(status) => status.to_string(),
    }
}

fn describe_critique(critique: &Critique, cached: bool) -> String {
    let heading = match critique.verdict() {
        Verdict::Suitable => "AI Photo Analysis: suitable",
        Verdict::NeedsImprovement => "AI Photo Analysis: needs improvement",
        Verdict::Unknown => "AI Photo Analysis",
    };
    let note = if cached { " (cached)" } else { "" };
    format!("✨ {}{}\n{}", heading, note, critique.text())
}

/// Catalog listing for `presets`.
pub fn preset_table() -> String {
    presets::all()
        .iter()
        .map(|p| format!("  {:<9} {:>3}x{:<4} {}  ({})", p.id, p.width, p.height, p.label, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read commands from `input` until `quit` or EOF, writing results to `out`.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, mut out: W) -> StudioResult<()> {
    writeln!(out, "PixelPerfect ID. Type 'help' for commands.")?;
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(Command::Empty) => {}
            Ok(Command::Quit) => break,
            Ok(Command::Help) => writeln!(out, "{}", HELP)?,
            Ok(Command::Presets) => writeln!(out, "{}", preset_table())?,
            Ok(Command::Run(action)) => match session.dispatch(action) {
                Ok(outcome) => writeln!(out, "{}", describe(&outcome))?,
                Err(e) => {
                    let icon = match e.severity() {
                        ErrorSeverity::Warning => "⚠️",
                        ErrorSeverity::Error => "❌",
                    };
                    writeln!(out, "{} {}: {}", icon, e.user_notice(), e)?;
                    if let Some(hint) = e.recovery_suggestion() {
                        writeln!(out, "💡 {}", hint)?;
                    }
                }
            },
            Err(usage) => writeln!(out, "❌ {}", usage)?,
        }
        out.flush()?;
    }
    Ok(())
}
