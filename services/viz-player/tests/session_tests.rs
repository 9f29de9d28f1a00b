//! Tests for `Session`: selection, rendering, placeholders, caching,
//! dataset reloads and export.

use std::sync::Arc;
use std::time::Duration;

use field_provider::{FieldProvider, InMemoryFieldProvider, QueuedFieldProvider, SyntheticFieldProvider};
use playback::PlaybackStatus;
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};
use test_utils::{small_dataset, temp_output_dir};
use viz_common::{Colormap, Dataset, Field, PlaybackSpeed, VisualizationSettings, VizError};
use viz_player::{CanvasConfig, FrameStatus, PlayerConfig, PngFileExporter, Session};

// ============================================================================
// Helpers
// ============================================================================

fn config() -> PlayerConfig {
    PlayerConfig {
        canvas: CanvasConfig {
            width: 144,
            height: 74,
        },
        ..PlayerConfig::default()
    }
}

fn synthetic_session(steps: usize) -> Session {
    let dataset = Arc::new(small_dataset(steps));
    let provider: Arc<dyn FieldProvider> = Arc::new(SyntheticFieldProvider::new(dataset.clone()));
    Session::new(dataset, provider, &config()).unwrap()
}

fn synthetic_provider(dataset: &Arc<Dataset>) -> Arc<dyn FieldProvider> {
    Arc::new(SyntheticFieldProvider::new(dataset.clone()))
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_new_session_defaults() {
    let session = synthetic_session(6);
    assert_eq!(session.variable(), "2t");
    assert_eq!(session.level(), 1000.0);
    assert_eq!(session.snapshot().status(), PlaybackStatus::Stopped);
    assert_eq!(session.snapshot().current_step(), 0);
    assert_eq!(session.snapshot().step_count(), 6);
}

#[test]
fn test_select_variable() {
    let mut session = synthetic_session(6);
    assert_ok!(session.select_variable("tp"));
    assert_eq!(session.variable(), "tp");

    let err = assert_err!(session.select_variable("msl"));
    assert!(matches!(err, VizError::UnknownVariable(_)));
    assert_eq!(session.variable(), "tp");
}

#[test]
fn test_select_level_snaps_to_available() {
    let mut session = synthetic_session(6);
    assert_eq!(session.select_level(850.0).unwrap(), 1000.0);
    assert_eq!(session.level(), 1000.0);
}

#[test]
fn test_unknown_colormap_falls_back_to_grayscale() {
    let mut session = synthetic_session(6);
    assert_eq!(session.set_colormap("coolwarm"), Colormap::Coolwarm);
    assert_eq!(session.set_colormap("jet"), Colormap::Grayscale);
}

#[test]
fn test_invalid_settings_rejected() {
    let mut session = synthetic_session(6);
    let bad = VisualizationSettings {
        transparency: 120,
        ..VisualizationSettings::default()
    };
    assert!(session.set_settings(bad).is_err());
    assert_eq!(session.settings().transparency, 0);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_current_then_cached() {
    let mut session = synthetic_session(6);

    let first = session.render_current().unwrap();
    assert_eq!(first.status, FrameStatus::Rendered);
    assert_eq!(first.image.width(), 144);
    assert_eq!(first.image.height(), 74);
    assert_eq!(first.valid_time, "2024-01-01 00:00 UTC");

    let second = session.render_current().unwrap();
    assert_eq!(second.status, FrameStatus::Cached);
    assert_eq!(first.image, second.image);
    assert_eq!(session.cached_frames(), 1);
}

#[test]
fn test_settings_change_renders_fresh_frame() {
    let mut session = synthetic_session(6);
    let plain = session.render_current().unwrap();

    let mut settings = session.settings().clone();
    settings.show_grid = true;
    session.set_settings(settings).unwrap();

    let gridded = session.render_current().unwrap();
    assert_eq!(gridded.status, FrameStatus::Rendered);
    assert_ne!(plain.image, gridded.image);
}

#[test]
fn test_missing_field_renders_placeholder() {
    let dataset = Arc::new(small_dataset(6));
    let provider: Arc<dyn FieldProvider> = Arc::new(
        InMemoryFieldProvider::new().with_field("2t", 0, 1000.0, Field::filled(72, 37, 280.0).unwrap()),
    );
    let mut session = Session::new(dataset, provider, &config()).unwrap();

    assert_eq!(session.render_step(0).unwrap().status, FrameStatus::Rendered);

    let frame = session.render_step(1).unwrap();
    assert!(frame.status.is_placeholder());
    assert!(frame.image.pixels().iter().all(|&b| b == 0));
    assert_eq!(frame.image.width(), 144);
    // Placeholders are not cached
    assert_eq!(session.cached_frames(), 1);
}

#[test]
fn test_render_step_clamps_to_time_axis() {
    let mut session = synthetic_session(6);
    let frame = session.render_step(40).unwrap();
    assert_eq!(frame.time_step, 5);
    assert_eq!(frame.valid_time, "2024-01-01 05:00 UTC");
}

#[tokio::test]
async fn test_pending_decode_renders_placeholder_then_frame() {
    let dataset = Arc::new(small_dataset(6));
    let queued = Arc::new(QueuedFieldProvider::spawn(synthetic_provider(&dataset), 8, 4));
    let mut session = Session::new(dataset, queued.clone(), &config()).unwrap();

    let frame = session.render_current().unwrap();
    match &frame.status {
        FrameStatus::Placeholder { reason } => assert!(reason.contains("pending")),
        other => panic!("expected placeholder, got {:?}", other),
    }

    queued.fetch("2t", 0, 1000.0).await.unwrap();
    assert_eq!(session.render_current().unwrap().status, FrameStatus::Rendered);
}

// ============================================================================
// Playback
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_render_follows_playback() {
    let mut session = synthetic_session(6);
    session.playback_mut().play();

    sleep(Duration::from_millis(2001)).await;
    let frame = session.render_current().unwrap();
    assert_eq!(frame.time_step, 2);
    assert_eq!(frame.valid_time, "2024-01-01 02:00 UTC");
}

#[tokio::test(start_paused = true)]
async fn test_playback_survives_placeholder_frames() {
    let dataset = Arc::new(small_dataset(4));
    let provider: Arc<dyn FieldProvider> = Arc::new(InMemoryFieldProvider::new());
    let mut session = Session::new(dataset, provider, &config()).unwrap();
    session.playback_mut().play();
    sleep(Duration::from_millis(1)).await;

    for expected in 1..4 {
        sleep(Duration::from_millis(1000)).await;
        let frame = session.render_current().unwrap();
        assert!(frame.status.is_placeholder());
        assert_eq!(frame.time_step, expected);
    }
    assert!(session.playback().is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_load_dataset_while_playing_cancels_old_timer() {
    let mut session = synthetic_session(24);
    session.playback_mut().set_speed(PlaybackSpeed::DOUBLE);
    let old_updates = session.playback().subscribe();
    session.playback_mut().play();

    sleep(Duration::from_millis(1100)).await;
    assert_eq!(session.snapshot().current_step(), 2);
    session.render_current().unwrap();
    assert_eq!(session.cached_frames(), 1);

    let replacement = Arc::new(small_dataset(12));
    let old_id = session.dataset().id();
    session
        .load_dataset(replacement.clone(), synthetic_provider(&replacement))
        .unwrap();

    assert_ne!(session.dataset().id(), old_id);
    let state = session.snapshot();
    assert_eq!(state.status(), PlaybackStatus::Stopped);
    assert_eq!(state.current_step(), 0);
    assert_eq!(state.step_count(), 12);
    assert_eq!(state.speed(), PlaybackSpeed::DOUBLE);
    assert_eq!(session.cached_frames(), 0);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(old_updates.borrow().current_step(), 2);
    assert_eq!(session.snapshot().current_step(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_dataset_keeps_matching_variable() {
    let mut session = synthetic_session(6);
    session.select_variable("10u").unwrap();

    let replacement = Arc::new(small_dataset(3));
    session
        .load_dataset(replacement.clone(), synthetic_provider(&replacement))
        .unwrap();
    assert_eq!(session.variable(), "10u");
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_current_writes_png() {
    let dir = temp_output_dir();
    let exporter = PngFileExporter::new(dir.path());
    let mut session = synthetic_session(6);
    session.select_variable("tp").unwrap();
    session.playback_mut().seek(3);

    let path = session.export_current(&exporter).unwrap();
    assert_eq!(path, dir.path().join("tp_3.png"));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
}

#[test]
fn test_export_into_missing_directory_is_created() {
    let dir = temp_output_dir();
    let exporter = PngFileExporter::new(dir.path().join("nested/frames"));
    let mut session = synthetic_session(6);
    let path = session.export_current(&exporter).unwrap();
    assert!(path.exists());
}

#[test]
fn test_export_zero_canvas_fails() {
    let dir = temp_output_dir();
    let dataset = Arc::new(small_dataset(6));
    let config = PlayerConfig {
        canvas: CanvasConfig { width: 0, height: 0 },
        ..PlayerConfig::default()
    };
    let mut session = Session::new(dataset.clone(), synthetic_provider(&dataset), &config).unwrap();
    let err = session.export_current(&PngFileExporter::new(dir.path())).unwrap_err();
    assert!(matches!(err, VizError::ExportError(_)));
}
