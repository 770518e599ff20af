//! Critique requests: caching by displayed image, forced refresh, placeholders.

mod common;

use common::{ScriptedModel, write_photo};
use pixelperfect_id::config::StudioConfig;
use pixelperfect_id::critique::{Critic, Critique, FAILURE_MESSAGE, MISSING_KEY_MESSAGE, Verdict};
use pixelperfect_id::{Action, Outcome, Session};
use tempfile::TempDir;

const REPORT: &str = "✅ Suitable\n- Plain background\n- Even lighting";

fn session_with(model: &ScriptedModel, dir: &TempDir) -> Session {
    let config = StudioConfig::default().with_output_dir(dir.path());
    let mut session = Session::with_critic(config, Critic::new(Some(Box::new(model.clone()))));
    let path = write_photo(dir.path(), "face.png", 600, 800);
    session.dispatch(Action::Load { path }).unwrap();
    session
}

fn critique(session: &mut Session, force: bool) -> (Critique, bool) {
    match session.dispatch(Action::Critique { force }).unwrap() {
        Outcome::Critiqued { critique, cached } => (critique, cached),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn same_render_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);
    session.dispatch(Action::ApplyPreset { id: "1inch".into() }).unwrap();

    let (first, cached) = critique(&mut session, false);
    assert!(!cached);
    assert_eq!(first, Critique::Report(REPORT.to_string()));
    assert_eq!(first.verdict(), Verdict::Suitable);

    let (second, cached) = critique(&mut session, false);
    assert!(cached);
    assert_eq!(second, first);
    assert_eq!(model.calls.get(), 1);
    assert!(session.status().critique_cached);
}

#[test]
fn rendered_image_is_sent_as_jpeg() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);
    session.dispatch(Action::ApplyPreset { id: "2inch".into() }).unwrap();
    critique(&mut session, false);

    let jpeg_len = session.rendered().unwrap().jpeg().len();
    assert_eq!(model.seen.borrow().as_slice(), &[(jpeg_len, "image/jpeg".to_string())]);
}

#[test]
fn original_is_sent_with_its_own_type() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);
    critique(&mut session, false);

    let png_len = session.source().unwrap().encoded().len();
    assert_eq!(model.seen.borrow().as_slice(), &[(png_len, "image/png".to_string())]);
}

#[test]
fn new_render_invalidates_cache() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);

    session.dispatch(Action::ApplyPreset { id: "1inch".into() }).unwrap();
    critique(&mut session, false);
    // Same preset again still produces a new image.
    session.dispatch(Action::ApplyPreset { id: "1inch".into() }).unwrap();
    assert!(!session.status().critique_cached);

    let (_, cached) = critique(&mut session, false);
    assert!(!cached);
    assert_eq!(model.calls.get(), 2);
}

#[test]
fn reset_and_new_upload_invalidate_cache() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);

    session.dispatch(Action::ApplyPreset { id: "2inch".into() }).unwrap();
    critique(&mut session, false);
    session.dispatch(Action::Reset).unwrap();
    let (_, cached) = critique(&mut session, false);
    assert!(!cached);

    let path = write_photo(dir.path(), "other.png", 300, 300);
    session.dispatch(Action::Load { path }).unwrap();
    let (_, cached) = critique(&mut session, false);
    assert!(!cached);
    assert_eq!(model.calls.get(), 3);
}

#[test]
fn force_bypasses_cache() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::replying(REPORT);
    let mut session = session_with(&model, &dir);

    critique(&mut session, false);
    let (_, cached) = critique(&mut session, true);
    assert!(!cached);
    assert_eq!(model.calls.get(), 2);
}

#[test]
fn failures_are_placeholders_and_not_cached() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::failing();
    let mut session = session_with(&model, &dir);

    let (first, _) = critique(&mut session, false);
    assert_eq!(first.text(), FAILURE_MESSAGE);
    assert_eq!(first.verdict(), Verdict::Unknown);

    let (_, cached) = critique(&mut session, false);
    assert!(!cached);
    assert_eq!(model.calls.get(), 2);
}

#[test]
fn missing_key_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let config = StudioConfig::from_lookup(|_| None).with_output_dir(dir.path());
    let mut session = Session::new(config);
    let path = write_photo(dir.path(), "face.png", 100, 120);
    session.dispatch(Action::Load { path }).unwrap();

    let (result, cached) = critique(&mut session, false);
    assert_eq!(result, Critique::Unavailable(MISSING_KEY_MESSAGE.to_string()));
    assert!(!cached);
    assert!(!session.status().critique_available);
}
