//! Scene-keyed registry of frame rings.
//!
//! One mutex guards the whole registry state: the rings, the engine's
//! enabled flag, and the bounded error log. Admissions, snapshots,
//! structural rebuilds, and error appends all take it; nothing sleeps
//! or performs I/O while it is held, and snapshots leave by value so
//! consumers iterate outside the lock.

use crate::ring::{FrameRing, RingSnapshot};
use parking_lot::Mutex;
use replaycast_core::{AudioFrame, VideoFrame};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error};

/// Maximum number of retained error messages
pub const MAX_ERROR_LOG: usize = 10;

#[derive(Default)]
struct RegistryState {
    rings: HashMap<String, FrameRing>,
    enabled: bool,
    errors: VecDeque<String>,
}

/// Owner of all per-scene frame rings.
#[derive(Default)]
pub struct RingRegistry {
    state: Mutex<RegistryState>,
}

impl RingRegistry {
    /// Create an empty, disabled registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether admissions are currently accepted
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Flip the enabled flag; disabled registries reject every
    /// admission
    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    /// Atomically replace the ring set so that exactly `scenes` have
    /// rings of the given capacity; rings for any other scene are
    /// destroyed.
    pub fn rebuild_from_scenes<S: AsRef<str>>(&self, scenes: &[S], capacity: usize) {
        let mut state = self.state.lock();
        state.rings.clear();
        for scene in scenes {
            state
                .rings
                .insert(scene.as_ref().to_string(), FrameRing::with_capacity(capacity));
        }
        debug!(rings = state.rings.len(), capacity, "rebuilt scene rings");
    }

    /// Idempotent per-scene ring creation
    pub fn ensure(&self, scene: &str, capacity: usize) {
        let mut state = self.state.lock();
        state
            .rings
            .entry(scene.to_string())
            .or_insert_with(|| FrameRing::with_capacity(capacity));
    }

    /// Destroy every ring
    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        for ring in state.rings.values_mut() {
            ring.clear();
        }
        state.rings.clear();
    }

    /// Admit a video frame to `scene`'s ring, creating the ring if the
    /// scene has none yet.
    ///
    /// Returns false when the engine is disabled; the frame is dropped
    /// and its buffers released.
    pub fn ensure_and_admit_video(
        &self,
        scene: &str,
        capacity: usize,
        frame: Arc<VideoFrame>,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.enabled {
            return false;
        }
        state
            .rings
            .entry(scene.to_string())
            .or_insert_with(|| FrameRing::with_capacity(capacity))
            .admit_video(frame)
    }

    /// Admit an audio frame to the ring keyed by `source`.
    ///
    /// Deliveries for sources without a ring are discarded, not
    /// buffered elsewhere.
    pub fn admit_audio(&self, source: &str, frame: Arc<AudioFrame>) -> bool {
        let mut state = self.state.lock();
        if !state.enabled {
            return false;
        }
        match state.rings.get_mut(source) {
            Some(ring) => ring.admit_audio(frame),
            None => false,
        }
    }

    /// Stable snapshot of one scene's ring, or `None` when the scene
    /// has no ring
    pub fn snapshot(&self, scene: &str) -> Option<RingSnapshot> {
        let state = self.state.lock();
        state.rings.get(scene).map(|ring| RingSnapshot {
            video: ring.snapshot_video(),
            audio: ring.snapshot_audio(),
        })
    }

    /// Names of all scenes that currently have rings
    pub fn scene_names(&self) -> Vec<String> {
        self.state.lock().rings.keys().cloned().collect()
    }

    /// Scenes whose rings hold both video and audio frames
    pub fn scenes_with_media(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut scenes: Vec<String> = state
            .rings
            .iter()
            .filter(|(_, ring)| ring.video_len() > 0 && ring.audio_len() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        scenes.sort();
        scenes
    }

    /// `(video, audio)` frame counts for one ring
    pub fn ring_sizes(&self, scene: &str) -> Option<(usize, usize)> {
        let state = self.state.lock();
        state
            .rings
            .get(scene)
            .map(|ring| (ring.video_len(), ring.audio_len()))
    }

    /// Append to the bounded error log and emit a log line
    pub fn log_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        let mut state = self.state.lock();
        if state.errors.len() >= MAX_ERROR_LOG {
            state.errors.pop_front();
        }
        state.errors.push_back(message);
    }

    /// The retained error messages, oldest first
    pub fn recent_errors(&self) -> Vec<String> {
        self.state.lock().errors.iter().cloned().collect()
    }

    /// Error log rendered as a multi-line text block
    pub fn error_log_text(&self) -> String {
        let state = self.state.lock();
        let mut text = String::new();
        for error in &state.errors {
            text.push_str("[ERROR] ");
            text.push_str(error);
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_log_is_bounded() {
        let registry = RingRegistry::new();
        for i in 0..15 {
            registry.log_error(format!("error {i}"));
        }
        let errors = registry.recent_errors();
        assert_eq!(errors.len(), MAX_ERROR_LOG);
        assert_eq!(errors[0], "error 5");
        assert_eq!(errors[9], "error 14");
    }

    #[test]
    fn test_error_log_text_shape() {
        let registry = RingRegistry::new();
        registry.log_error("Scene not found: Game");
        assert_eq!(registry.error_log_text(), "[ERROR] Scene not found: Game\n");
    }

    #[test]
    fn test_rebuild_replaces_ring_set() {
        let registry = RingRegistry::new();
        registry.rebuild_from_scenes(&["A", "B"], 8);
        let mut names = registry.scene_names();
        names.sort();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);

        registry.rebuild_from_scenes(&["C"], 8);
        assert_eq!(registry.scene_names(), vec!["C".to_string()]);
        assert!(registry.snapshot("A").is_none());
    }
}
