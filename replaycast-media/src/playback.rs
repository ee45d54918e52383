//! Replay playback: ring snapshots back out as paced A/V streams.

use crate::registry::RingRegistry;
use replaycast_core::{HostBackend, OutputSettings, ReplayError, ReplayResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Playback pacing and sink configuration.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Name of the replay sink frames are emitted through
    pub sink_name: String,
    /// Per-frame delay during live replay (~30 fps)
    pub live_frame_interval: Duration,
    /// Per-frame delay while muxing to file (~60 fps)
    pub file_frame_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sink_name: "ReplaySource".to_string(),
            live_frame_interval: Duration::from_millis(33),
            file_frame_interval: Duration::from_millis(16),
        }
    }
}

/// Drains ring snapshots through the replay sink or into a host muxer
/// output.
pub struct PlaybackEngine {
    host: Arc<dyn HostBackend>,
    registry: Arc<RingRegistry>,
    config: PlaybackConfig,
}

impl PlaybackEngine {
    /// Create a playback engine over the given registry
    pub fn new(
        host: Arc<dyn HostBackend>,
        registry: Arc<RingRegistry>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            host,
            registry,
            config,
        }
    }

    /// Replay a scene's cached frames through the replay sink.
    ///
    /// The snapshot is taken under the registry mutex and iterated
    /// outside it. Audio is paired with video by position: audio index
    /// `i` is emitted before video index `i`, with no timestamp-based
    /// resync. A/V drift is bounded only by the relative ingestion
    /// rates of the two streams.
    ///
    /// Returns the number of video frames emitted.
    pub async fn play_live(&self, scene: &str) -> ReplayResult<usize> {
        let snapshot = self
            .registry
            .snapshot(scene)
            .ok_or_else(|| ReplayError::SceneUnknown {
                scene: scene.to_string(),
            })?;
        if snapshot.video.is_empty() {
            return Err(ReplayError::NoCachedFrames {
                scene: scene.to_string(),
            });
        }

        let sink =
            self.host
                .resolve_sink(&self.config.sink_name)
                .ok_or_else(|| ReplayError::SinkMissing {
                    sink: self.config.sink_name.clone(),
                })?;

        debug!(scene, frames = snapshot.video.len(), "live replay started");
        for (index, video) in snapshot.video.iter().enumerate() {
            if let Some(audio) = snapshot.audio.get(index) {
                sink.output_audio(audio);
            }
            sink.output_video(video);
            tokio::time::sleep(self.config.live_frame_interval).await;
        }

        Ok(snapshot.video.len())
    }

    /// Mux a scene's cached frames to
    /// `<output_dir>/<scene>_replay.mp4` (mp4 container, h264 video,
    /// aac audio).
    ///
    /// Frames are re-emitted through the replay sink while the output
    /// runs; a missing sink does not fail the save, the file is still
    /// produced. If the output refuses to start, the handle is
    /// released and no frames are emitted.
    pub async fn save_to_file(&self, scene: &str, output_dir: &Path) -> ReplayResult<PathBuf> {
        let snapshot = self
            .registry
            .snapshot(scene)
            .ok_or_else(|| ReplayError::SceneUnknown {
                scene: scene.to_string(),
            })?;

        let path = output_dir.join(format!("{scene}_replay.mp4"));
        let output = self
            .host
            .create_file_output(OutputSettings::mp4(path.clone()))?;
        output.start()?;

        let sink = self.host.resolve_sink(&self.config.sink_name);
        for (index, video) in snapshot.video.iter().enumerate() {
            if let Some(sink) = &sink {
                if let Some(audio) = snapshot.audio.get(index) {
                    sink.output_audio(audio);
                }
                sink.output_video(video);
            }
            tokio::time::sleep(self.config.file_frame_interval).await;
        }

        output.stop();
        info!(scene, path = %path.display(), "saved replay");
        Ok(path)
    }
}
