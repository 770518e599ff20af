//! Drive the interactive shell with scripted input.

mod common;

use std::io::Cursor;

use common::{ScriptedModel, write_photo};
use pixelperfect_id::config::StudioConfig;
use pixelperfect_id::critique::Critic;
use pixelperfect_id::{Session, shell};
use ppid_scale::plan::Size;
use tempfile::TempDir;

fn run_script(session: &mut Session, script: &str) -> String {
    let mut out = Vec::new();
    shell::run(session, Cursor::new(script.as_bytes()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn full_workflow() {
    let dir = TempDir::new().unwrap();
    let photo = write_photo(dir.path(), "me.png", 800, 1000);
    let model = ScriptedModel::replying("⚠️ Needs Improvement\n- Shadow on the left cheek");
    let config = StudioConfig::default().with_output_dir(dir.path());
    let mut session = Session::with_critic(config, Critic::new(Some(Box::new(model.clone()))));

    let script = format!(
        "load {}\npreset 2inch\ncritique\ncritique\nsave\nreset\ninfo\nquit\npreset 1inch\n",
        photo.display()
    );
    let out = run_script(&mut session, &script);

    assert!(out.contains("Loaded me.png (800x1000)"), "{}", out);
    assert!(out.contains("Resized to 413x579"), "{}", out);
    assert!(out.contains("needs improvement"), "{}", out);
    assert!(out.contains("(cached)"), "{}", out);
    assert!(out.contains("Saved"), "{}", out);
    assert!(out.contains("Showing original (800x1000)"), "{}", out);
    assert_eq!(model.calls.get(), 1);

    // Nothing after quit runs.
    assert_eq!(session.displayed_size(), Some(Size::new(800, 1000)));

    let saved: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("pixelperfect-id-") && n.ends_with(".jpg"))
        .collect();
    assert_eq!(saved.len(), 1, "{:?}", saved);
}

#[test]
fn errors_are_reported_and_the_loop_continues() {
    let dir = TempDir::new().unwrap();
    let config = StudioConfig::default().with_output_dir(dir.path());
    let mut session = Session::with_critic(config, Critic::new(None));
    let photo = write_photo(dir.path(), "me.png", 300, 300);

    let script = format!(
        "preset 1inch\nsize 0 10\nrotate 90\n\nload {}\nsize 120 80\n",
        photo.display()
    );
    let out = run_script(&mut session, &script);

    assert!(out.contains("no photo is loaded"), "{}", out);
    assert!(out.contains("Load a photo first"), "{}", out);
    assert!(out.contains("⚠️ Please enter valid dimensions"), "{}", out);
    assert!(out.contains("Unrecognized command: rotate 90"), "{}", out);
    assert!(out.contains("Resized to 120x80 (stretch)"), "{}", out);
    assert_eq!(session.displayed_size(), Some(Size::new(120, 80)));
}

#[test]
fn help_and_presets_are_printed() {
    let mut session = Session::with_critic(StudioConfig::default(), Critic::new(None));
    let out = run_script(&mut session, "help\npresets\n");
    assert!(out.contains("Commands:"));
    assert!(out.contains("2inch_lg"));
    assert!(out.contains("413x626"));
}
