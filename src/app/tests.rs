use super::*;
use crate::config::BoothConfig;
use crate::display::NullDisplay;
use crate::movie::MovieEncoder;
use crate::store::FrameStore;
use crate::testutil::{
    CameraCounters, FailingEncoder, RecordingEncoder, ScriptedButtons, ScriptedKeyboard,
    StubCamera,
};
use crossterm::event::KeyCode;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn test_config(dir: &TempDir) -> BoothConfig {
    let mut config = BoothConfig::default();
    config.frames.path = dir.path().join("frames").to_string_lossy().into_owned();
    config.movies.path = dir.path().join("movies").to_string_lossy().into_owned();
    // Keep the loop fast under test; the throttle still runs.
    config.playback.fps = 250;
    config.display.splash_cycle_ticks = 2;
    config.display.font_path = dir.path().join("missing.ttf").to_string_lossy().into_owned();
    config
}

fn booth(
    config: BoothConfig,
    keys: Vec<Option<KeyCode>>,
    buttons: Vec<BTreeSet<u16>>,
    encoder: Box<dyn MovieEncoder>,
) -> (BoothController, Arc<CameraCounters>) {
    let camera = StubCamera::new();
    let counters = camera.counters();
    let peripherals = Peripherals {
        camera: Box::new(camera),
        buttons: Box::new(ScriptedButtons::new(buttons)),
        keyboard: Box::new(ScriptedKeyboard::new(keys)),
        display: Box::new(NullDisplay::new(64, 48)),
        encoder,
    };
    let controller = BoothController::new(config, peripherals).unwrap();
    (controller, counters)
}

fn mp4_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".mp4"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_escape_on_title_cleans_up_and_exits() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);

    // Seed leftover frames from a previous session.
    let store = FrameStore::open(config.frames.path.as_str()).unwrap();
    fs::write(store.frame_path(0), b"jpeg").unwrap();
    fs::write(store.frame_path(1), b"jpeg").unwrap();

    let encoder = RecordingEncoder::new();
    let (mut controller, counters) = booth(
        config,
        vec![Some(KeyCode::Esc)],
        vec![],
        Box::new(encoder.clone()),
    );

    controller.run().unwrap();

    assert!(store.list_indices().unwrap().is_empty());
    assert!(encoder.invocations().is_empty());
    assert_eq!(counters.previews_started.load(Ordering::SeqCst), 0);
    assert_eq!(counters.previews_stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_capture_erase_build_flow() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    let frames_path = config.frames.path.clone();
    let movies_path = config.movies.path.clone();
    let movie_fps = config.movies.fps;

    let keys = vec![
        // Title: any key wakes the booth.
        Some(KeyCode::Char('x')),
        // Idle: capture three frames, erase the last.
        Some(KeyCode::Enter),
        Some(KeyCode::Enter),
        Some(KeyCode::Enter),
        Some(KeyCode::Backspace),
        // Begin movie creation, type the title, confirm.
        Some(KeyCode::Char('s')),
        Some(KeyCode::Char('c')),
        Some(KeyCode::Char('a')),
        Some(KeyCode::Char('t')),
        Some(KeyCode::Enter),
        // PlayingMovie: any non-escape key restarts at Title.
        Some(KeyCode::Char('r')),
        // Title again: exhausted script escapes out.
    ];

    let encoder = RecordingEncoder::new();
    let (mut controller, counters) = booth(config, keys, vec![], Box::new(encoder.clone()));

    controller.run().unwrap();

    let store = FrameStore::open(frames_path.as_str()).unwrap();
    let invocations = encoder.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].frames,
        vec![store.frame_path(0), store.frame_path(1)]
    );
    assert_eq!(invocations[0].fps, movie_fps);

    let movies = mp4_files(Path::new(&movies_path));
    assert_eq!(movies.len(), 1);
    assert!(movies[0].starts_with("movie_cat_"));

    // Returning to Title cleared the frames; shutdown stopped the preview.
    assert!(store.list_indices().unwrap().is_empty());
    assert_eq!(counters.shots.load(Ordering::SeqCst), 3);
    assert!(counters.previews_stopped.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_preview_playback_pauses_live_preview() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);

    let keys = vec![
        Some(KeyCode::Char('x')),
        Some(KeyCode::Enter),
        Some(KeyCode::Enter),
        Some(KeyCode::Char(' ')),
        // Idle resumes after playback; exhausted script escapes out.
    ];

    let encoder = RecordingEncoder::new();
    let (mut controller, counters) = booth(config, keys, vec![], Box::new(encoder.clone()));

    controller.run().unwrap();

    // Started at wake and again after playback; stopped for playback and at
    // shutdown.
    assert_eq!(counters.previews_started.load(Ordering::SeqCst), 2);
    assert_eq!(counters.previews_stopped.load(Ordering::SeqCst), 2);
    assert!(encoder.invocations().is_empty());
}

#[test]
fn test_build_with_no_frames_skips_encoder() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    let movies_path = config.movies.path.clone();

    let keys = vec![
        Some(KeyCode::Char('x')),
        Some(KeyCode::Char('s')),
        // Confirm an empty title with no frames stored.
        Some(KeyCode::Enter),
        // Back in Idle; exhausted script escapes out.
    ];

    let encoder = RecordingEncoder::new();
    let (mut controller, _counters) = booth(config, keys, vec![], Box::new(encoder.clone()));

    controller.run().unwrap();

    assert!(encoder.invocations().is_empty());
    assert!(mp4_files(Path::new(&movies_path)).is_empty());
}

#[test]
fn test_encoder_failure_returns_to_idle() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    let movies_path = config.movies.path.clone();

    let keys = vec![
        Some(KeyCode::Char('x')),
        Some(KeyCode::Enter),
        Some(KeyCode::Char('s')),
        Some(KeyCode::Enter),
        // Build fails; booth drops back to Idle and the script escapes out.
    ];

    let (mut controller, counters) = booth(config, keys, vec![], Box::new(FailingEncoder));

    controller.run().unwrap();

    assert!(mp4_files(Path::new(&movies_path)).is_empty());
    // The booth resumed Idle after the failure (preview restarted).
    assert_eq!(counters.previews_started.load(Ordering::SeqCst), 2);
}

#[test]
fn test_button_driven_capture() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    let capture = config.input.buttons.capture;

    let buttons = vec![
        // Title: any button wakes the booth.
        ScriptedButtons::press(capture),
        // Idle: the capture button takes a shot.
        ScriptedButtons::press(capture),
        // Released afterwards; exhausted keyboard script escapes out.
    ];
    let keys = vec![None, None, None];

    let encoder = RecordingEncoder::new();
    let (mut controller, counters) = booth(config, keys, buttons, Box::new(encoder.clone()));

    controller.run().unwrap();

    assert_eq!(counters.shots.load(Ordering::SeqCst), 1);
}

#[test]
fn test_controller_starts_on_title() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    let encoder = RecordingEncoder::new();
    let (controller, _counters) = booth(config, vec![], vec![], Box::new(encoder));

    assert_eq!(controller.mode(), AppMode::Title);
}
