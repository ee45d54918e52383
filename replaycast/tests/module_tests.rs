//! Module entry point tests

use replaycast::module::{self, MODULE_VERSION, SOURCE_KIND_ID};
use replaycast::{EngineConfig, HostBackend, MockHost};
use replaycast_core::{PixelFormat, RawVideoFrame, SourceFilter};
use std::sync::Arc;
use std::time::Duration;

fn test_config(dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        output_directory: Some(dir.to_path_buf()),
        ring_seconds: 1,
        capture_fps: 8,
        live_frame_interval: Duration::from_millis(1),
        file_frame_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_load_registers_the_source_kind_and_starts_capture() {
    let dir = tempfile::tempdir().unwrap();
    let host = Arc::new(MockHost::new(&["A", "B"]));
    host.set_audio_sources(&["A"]);

    let engine = module::load(
        Arc::clone(&host) as Arc<dyn HostBackend>,
        test_config(dir.path()),
    )
    .unwrap();

    assert!(engine.is_enabled());
    assert_eq!(host.registered_source_kinds(), vec![SOURCE_KIND_ID]);
    assert_eq!(host.video_callback_count(), 1);

    let mut names = engine.registry().scene_names();
    names.sort();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn test_load_respects_a_disabled_config() {
    let dir = tempfile::tempdir().unwrap();
    let host = Arc::new(MockHost::new(&["A"]));

    let config = EngineConfig {
        enabled: false,
        ..test_config(dir.path())
    };
    let engine = module::load(Arc::clone(&host) as Arc<dyn HostBackend>, config).unwrap();

    assert!(!engine.is_enabled());
    assert_eq!(host.video_callback_count(), 0);
    // The source kind is registered even while capture is off.
    assert_eq!(host.registered_source_kinds(), vec![SOURCE_KIND_ID]);
}

#[tokio::test]
async fn test_load_rejects_an_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let host = Arc::new(MockHost::new(&["A"]));
    let config = EngineConfig {
        replay_sink: String::new(),
        ..test_config(dir.path())
    };
    assert!(module::load(Arc::clone(&host) as Arc<dyn HostBackend>, config).is_err());
}

#[tokio::test]
async fn test_unload_stops_capture_and_clears_rings() {
    let dir = tempfile::tempdir().unwrap();
    let host = Arc::new(MockHost::new(&["A"]));
    host.set_audio_sources(&["A"]);

    let engine = module::load(
        Arc::clone(&host) as Arc<dyn HostBackend>,
        test_config(dir.path()),
    )
    .unwrap();
    engine.ensure_replay_scene().unwrap();
    assert!(host.scene_exists("Replay"));

    module::unload(&engine);
    assert!(!engine.is_enabled());
    assert_eq!(host.video_callback_count(), 0);
    assert_eq!(host.audio_callback_count(), 0);
    assert!(engine.registry().scene_names().is_empty());
    assert!(!host.scene_exists("Replay"));
}

#[tokio::test]
async fn test_capture_filter_instance_taps_frames() {
    let dir = tempfile::tempdir().unwrap();
    let host = Arc::new(MockHost::new(&["A"]));

    let engine = module::load(
        Arc::clone(&host) as Arc<dyn HostBackend>,
        test_config(dir.path()),
    )
    .unwrap();

    let filter = host.create_source_instance(SOURCE_KIND_ID).unwrap();
    assert_eq!(filter.name(), "Replay Capture");

    let data = vec![0u8; 32 * 32];
    let mut raw = RawVideoFrame::new(32, 32, PixelFormat::Y800, 5);
    raw.data[0] = Some(&data);
    raw.linesize[0] = 32;
    filter.video_render(&raw);

    // The filter feeds the same ring the raw video callback would.
    assert_eq!(engine.registry().ring_sizes("A"), Some((1, 0)));
}

#[test]
fn test_module_metadata() {
    assert_eq!(module::module_name(), "replaycast");
    assert_eq!(module::module_version(), MODULE_VERSION);
    assert!(module::module_description().contains("replay"));
}
