//! Replay Engine Demo
//!
//! This example drives the full replay engine against the in-memory
//! mock host: capture frames into per-scene rings, trigger a replay
//! round trip over the command surface, and save every populated ring
//! to disk.

use replaycast::{module, EngineConfig, HostBackend, MockHost, ReplayEvent};
use replaycast_core::{PixelFormat, RawAudioFrame, RawVideoFrame};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🎬 Replaycast Demo");
    println!("==================");

    let output_dir = std::env::temp_dir().join("replaycast-demo");
    std::fs::create_dir_all(&output_dir)?;

    // A mock production host with two scenes; "Game" is the program.
    let host = Arc::new(MockHost::new(&["Game", "Intermission"]));
    host.set_audio_sources(&["Game", "Intermission"]);

    let config = EngineConfig {
        output_directory: Some(output_dir.clone()),
        ring_seconds: 2,
        capture_fps: 30,
        live_frame_interval: Duration::from_millis(5),
        file_frame_interval: Duration::from_millis(2),
        ..Default::default()
    };

    println!("\n📦 Demo 1: Load the module and start capture");
    let engine = module::load(Arc::clone(&host) as Arc<dyn HostBackend>, config)?;
    println!("   • engine enabled: {}", engine.is_enabled());
    println!("   • ring capacity: {} frames per stream", 2 * 30);

    println!("\n📹 Demo 2: Feed 60 frames of 640x360 I420 into the program scene");
    deliver_footage(&host, 60);
    let registry = engine.registry();
    let (video, audio) = registry.ring_sizes("Game").unwrap();
    println!("   • Game ring now holds {video} video / {audio} audio frames");

    println!("\n⏪ Demo 3: Replay the Game scene over the command surface");
    host.set_current_scene("Intermission")?;
    let mut events = engine.subscribe_events();
    let response = engine
        .handle_request("ReplayScene", serde_json::json!({"scene": "Game"}))
        .await;
    println!("   • response: success={}", response.success);

    loop {
        match events.recv().await? {
            ReplayEvent::ReplayStarted { scene } => {
                println!("   • replay started for {scene} (program is now Replay)");
            }
            ReplayEvent::ReplayFinished { scene, success } => {
                println!("   • replay finished for {scene}, success={success}");
                break;
            }
            _ => {}
        }
    }
    println!(
        "   • program restored to {:?}",
        host.current_scene().unwrap_or_default()
    );

    println!("\n💾 Demo 4: Save every populated ring to disk");
    let response = engine
        .handle_request("SaveAllReplays", serde_json::json!({}))
        .await;
    println!("   • response: success={}", response.success);
    for entry in std::fs::read_dir(&output_dir)? {
        println!("   • wrote {}", entry?.path().display());
    }

    println!("\n🛑 Demo 5: Unload");
    module::unload(&engine);
    println!("   • rings cleared: {}", engine.registry().scene_names().is_empty());

    println!("\n✨ Replay demo completed!");
    Ok(())
}

/// Push paired video and audio deliveries through the mock host's
/// capture fan-out, the way the real host's capture threads would.
fn deliver_footage(host: &MockHost, frames: u64) {
    let luma = vec![0x55u8; 640 * 360];
    let chroma = vec![0x80u8; 320 * 180];
    let samples = vec![0.2f32; 800];

    for ts in 0..frames {
        let mut raw = RawVideoFrame::new(640, 360, PixelFormat::I420, ts);
        raw.data[0] = Some(&luma);
        raw.data[1] = Some(&chroma);
        raw.data[2] = Some(&chroma);
        raw.linesize = [640, 320, 320, 0, 0, 0, 0, 0];
        host.deliver_video_frame(&raw);

        let mut audio = RawAudioFrame::new(800, 48_000, ts);
        audio.data[0] = Some(&samples);
        audio.data[1] = Some(&samples);
        host.deliver_audio_frame("Game", &audio, false);
    }
}
