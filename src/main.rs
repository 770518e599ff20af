use std::io;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use pixelperfect_id::config::StudioConfig;
use pixelperfect_id::{PhotoJob, Session, Sizing, StudioError, process_photo, shell};
use ppid_scale::plan::{ResizeMode, TargetSpec};
use ppid_scale::presets::PresetId;

/// Resize photos to standard ID-photo sizes.
#[derive(Parser, Debug)]
#[command(name = "ppid")]
#[command(about = "📸 Resize and crop photos to standard ID-photo sizes")]
#[command(long_about = "Resize and crop photos to standard ID-photo sizes (1 inch, 2 inch, large 2 inch)
or any custom size, optionally get an AI suitability critique, and save as JPEG.
Set GEMINI_API_KEY (or API_KEY) to enable critiques.")]
struct Args {
    /// Directory saved images are written to
    #[arg(short, long, global = true, default_value = ".", help = "Output directory for saved images")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resize one photo and save it
    Resize {
        /// Photo to resize
        input: PathBuf,

        /// ID preset (center crop)
        #[arg(short, long, value_enum, conflicts_with = "size")]
        preset: Option<PresetId>,

        /// Custom size as WIDTHxHEIGHT, e.g. 600x800
        #[arg(short, long)]
        size: Option<String>,

        /// Mode for a custom size
        #[arg(short, long, value_enum, requires = "size")]
        mode: Option<ResizeMode>,

        /// Ask the AI for a suitability critique of the result
        #[arg(long)]
        critique: bool,
    },
    /// List the ID presets
    Presets,
    /// Interactive session reading one command per line
    Shell {
        /// Photo to load at start
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = StudioConfig::from_env().with_output_dir(args.out);
    config.validate().map_err(anyhow::Error::msg)?;

    match args.command {
        Command::Presets => {
            println!("{}", shell::preset_table());
            Ok(())
        }
        Command::Resize {
            input,
            preset,
            size,
            mode,
            critique,
        } => {
            let sizing = parse_sizing(preset, size.as_deref(), mode)?;
            let report = process_photo(config, PhotoJob { input, sizing, critique })
                .map_err(explain)?;
            println!("✅ {} → {}", report.original, report.output);
            if let Some(critique) = &report.critique {
                println!("✨ AI Photo Analysis\n{}", critique.text());
            }
            println!("💾 Saved {}", report.saved.display());
            Ok(())
        }
        Command::Shell { input } => {
            let mut session = Session::new(config);
            if let Some(path) = input {
                let outcome = session.load(&path).map_err(|e| anyhow!("{}: {}", e.user_notice(), e))?;
                println!("{}", shell::describe(&outcome));
            }
            let stdin = io::stdin();
            shell::run(&mut session, stdin.lock(), io::stdout())?;
            Ok(())
        }
    }
}

/// Map the resize flags to a [`Sizing`]; a preset wins, custom size stretches by default.
fn parse_sizing(preset: Option<PresetId>, size: Option<&str>, mode: Option<ResizeMode>) -> Result<Sizing> {
    match (preset, size) {
        (Some(p), _) => Ok(Sizing::Preset(p.preset().id.to_string())),
        (None, Some(size)) => {
            let (w, h) = size
                .split_once(['x', 'X'])
                .ok_or_else(|| anyhow!("Invalid size format: {}. Use WIDTHxHEIGHT, e.g. 600x800", size))?;
            match mode {
                None | Some(ResizeMode::Stretch) => Ok(Sizing::Custom {
                    width: w.to_string(),
                    height: h.to_string(),
                }),
                Some(mode) => {
                    let w = pixelperfect_id::session::parse_dimension("width", w)?;
                    let h = pixelperfect_id::session::parse_dimension("height", h)?;
                    Ok(Sizing::Exact(TargetSpec::new(w, h, mode)?))
                }
            }
        }
        (None, None) => Err(anyhow!("Choose a --preset or a --size")),
    }
}

/// Prefix the user notice when the failure came from the studio.
fn explain(err: anyhow::Error) -> anyhow::Error {
    let notice = err.downcast_ref::<StudioError>().map(StudioError::user_notice);
    match notice {
        Some(notice) => err.context(notice),
        None => err,
    }
}
