//! Error types for replaycast operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for replay engine operations
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Engine initialization failed
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Scene name has no frame ring
    #[error("No cached frames for scene: {scene}")]
    SceneUnknown {
        /// Scene that was requested
        scene: String,
    },

    /// Ring exists but holds no video frames
    #[error("Cached frames are empty for scene: {scene}")]
    NoCachedFrames {
        /// Scene whose ring was empty
        scene: String,
    },

    /// Replay sink was not present at playback time
    #[error("Replay sink not found: {sink}")]
    SinkMissing {
        /// Sink name that failed to resolve
        sink: String,
    },

    /// Host muxer refused to start
    #[error("Failed to start output for {path}: {reason}")]
    OutputStartFailed {
        /// Target file path of the output
        path: PathBuf,
        /// Reason reported by the host
        reason: String,
    },

    /// Admission validation rejected a delivered frame
    #[error("Invalid frame: {reason}")]
    InvalidFrame {
        /// Why the frame was rejected
        reason: String,
    },

    /// Scene switch target could not be resolved
    #[error("Scene not found: {scene}")]
    SceneNotFound {
        /// Scene that failed to resolve
        scene: String,
    },

    /// A host-side operation failed
    #[error("Host operation failed: {operation} - {reason}")]
    Host {
        /// Operation that failed
        operation: String,
        /// Reason reported by the host
        reason: String,
    },
}

/// Result type alias for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

impl ReplayError {
    /// Check whether the error leaves the engine in a usable state.
    ///
    /// Every error surfaced by the core is recovered locally; this
    /// distinguishes the ones a caller may retry from hard setup
    /// failures.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReplayError::Initialization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ReplayError::SceneUnknown {
            scene: "Game".to_string(),
        };
        assert_eq!(error.to_string(), "No cached frames for scene: Game");

        let error = ReplayError::SinkMissing {
            sink: "ReplaySource".to_string(),
        };
        assert_eq!(error.to_string(), "Replay sink not found: ReplaySource");
    }

    #[test]
    fn test_recoverability() {
        let error = ReplayError::NoCachedFrames {
            scene: "Game".to_string(),
        };
        assert!(error.is_recoverable());

        let error = ReplayError::Initialization {
            reason: "vendor registration failed".to_string(),
        };
        assert!(!error.is_recoverable());
    }
}
