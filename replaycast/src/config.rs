//! Engine configuration

use replaycast_core::{ReplayError, ReplayResult};
use replaycast_media::PlaybackConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the synthetic scene the engine replays through
pub const REPLAY_SCENE_NAME: &str = "Replay";

/// Name of the media-consumer sink inside the replay scene
pub const REPLAY_SINK_NAME: &str = "ReplaySource";

/// Private data store key for the persisted output directory
pub const OUTPUT_DIRECTORY_KEY: &str = "output_directory";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether capture starts as soon as the module loads
    pub enabled: bool,

    /// Directory replay files are written to; `None` resolves to the
    /// persisted value in the host data store, then to the host's
    /// module config path
    pub output_directory: Option<PathBuf>,

    /// Seconds of footage each ring retains
    pub ring_seconds: u64,

    /// Capture frame rate the ring capacity is sized for
    pub capture_fps: u64,

    /// Name of the replay scene
    pub replay_scene: String,

    /// Name of the replay sink
    pub replay_sink: String,

    /// Per-frame delay during live replay
    pub live_frame_interval: Duration,

    /// Per-frame delay while muxing to file
    pub file_frame_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_directory: None,
            ring_seconds: 30,
            capture_fps: 60,
            replay_scene: REPLAY_SCENE_NAME.to_string(),
            replay_sink: REPLAY_SINK_NAME.to_string(),
            live_frame_interval: Duration::from_millis(33),
            file_frame_interval: Duration::from_millis(16),
        }
    }
}

impl EngineConfig {
    /// Per-stream ring capacity in frames
    pub fn ring_capacity(&self) -> usize {
        (self.ring_seconds * self.capture_fps) as usize
    }

    /// Validate configuration
    pub fn validate(&self) -> ReplayResult<()> {
        if self.replay_scene.is_empty() {
            return Err(ReplayError::Initialization {
                reason: "replay scene name must not be empty".to_string(),
            });
        }
        if self.replay_sink.is_empty() {
            return Err(ReplayError::Initialization {
                reason: "replay sink name must not be empty".to_string(),
            });
        }
        if self.live_frame_interval.is_zero() || self.file_frame_interval.is_zero() {
            return Err(ReplayError::Initialization {
                reason: "frame intervals must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Playback configuration derived from this engine configuration
    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            sink_name: self.replay_sink.clone(),
            live_frame_interval: self.live_frame_interval,
            file_frame_interval: self.file_frame_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_is_thirty_seconds_at_sixty_fps() {
        let config = EngineConfig::default();
        assert_eq!(config.ring_capacity(), 1800);
        assert!(config.enabled);
        assert_eq!(config.replay_scene, "Replay");
        assert_eq!(config.replay_sink, "ReplaySource");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let config = EngineConfig {
            replay_scene: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            replay_sink: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_duration_rings_are_allowed() {
        // A capacity-0 ring is valid; it just retains nothing.
        let config = EngineConfig {
            ring_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.ring_capacity(), 0);
        assert!(config.validate().is_ok());
    }
}
