//! Replay scene ownership and the round-trip program switch.

use parking_lot::Mutex;
use replaycast_core::{HostBackend, ReplayResult};
use replaycast_media::{PlaybackEngine, RingRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Owns the synthetic replay scene and orchestrates the program
/// round trip.
pub struct ReplaySceneController {
    host: Arc<dyn HostBackend>,
    registry: Arc<RingRegistry>,
    playback: Arc<PlaybackEngine>,
    scene_name: String,
    sink_name: String,
    previous_scene: Mutex<Option<String>>,
}

impl ReplaySceneController {
    /// Create a controller for the named replay scene and sink
    pub fn new(
        host: Arc<dyn HostBackend>,
        registry: Arc<RingRegistry>,
        playback: Arc<PlaybackEngine>,
        scene_name: String,
        sink_name: String,
    ) -> Self {
        Self {
            host,
            registry,
            playback,
            scene_name,
            sink_name,
            previous_scene: Mutex::new(None),
        }
    }

    /// Create the replay scene and its media-consumer sink if either
    /// is missing. Idempotent; calling it twice never duplicates the
    /// sink.
    pub fn ensure_scene_and_sink(&self) -> ReplayResult<()> {
        if !self.host.scene_exists(&self.scene_name) {
            self.host.create_scene(&self.scene_name)?;
            debug!(scene = %self.scene_name, "created replay scene");
        }
        if !self.host.scene_has_sink(&self.scene_name, &self.sink_name) {
            self.host.add_media_sink(&self.scene_name, &self.sink_name)?;
            debug!(sink = %self.sink_name, "created replay sink");
        }
        Ok(())
    }

    /// Remove the replay scene (and its sink) from the host graph,
    /// if it was ever created
    pub fn remove_scene_and_sink(&self) {
        if self.host.scene_exists(&self.scene_name) {
            if let Err(e) = self.host.remove_scene(&self.scene_name) {
                self.registry.log_error(e.to_string());
            }
        }
    }

    /// The program scene captured by the most recent round trip
    pub fn previous_scene(&self) -> Option<String> {
        self.previous_scene.lock().clone()
    }

    fn switch_to(&self, scene: &str) {
        if let Err(e) = self.host.set_current_scene(scene) {
            self.registry.log_error(e.to_string());
        }
    }

    /// Run the full replay round trip for one scene.
    ///
    /// Order is fixed: capture the current program scene, switch to
    /// the replay scene, mux the ring to a file, play it live through
    /// the sink, switch back. A failure during save or playback is
    /// logged and does not skip the switch-back; emitted frames are
    /// not rolled back.
    ///
    /// Returns whether live playback completed without error.
    pub async fn play_and_return(&self, scene: &str, output_dir: &Path) -> bool {
        let previous = self.host.current_scene();
        *self.previous_scene.lock() = previous.clone();

        self.switch_to(&self.scene_name);

        if let Err(e) = self.playback.save_to_file(scene, output_dir).await {
            self.registry.log_error(e.to_string());
        }

        let played = match self.playback.play_live(scene).await {
            Ok(frames) => {
                debug!(scene, frames, "live replay finished");
                true
            }
            Err(e) => {
                self.registry.log_error(e.to_string());
                false
            }
        };

        if let Some(previous) = previous {
            self.switch_to(&previous);
        }

        played
    }
}
