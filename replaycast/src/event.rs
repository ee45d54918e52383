//! Engine events observable by the embedding host's UI

use std::path::PathBuf;

/// Events emitted on the engine's broadcast channel.
#[derive(Debug, Clone)]
pub enum ReplayEvent {
    /// Capture started and rings were built
    EngineEnabled,
    /// Capture stopped and rings were cleared
    EngineDisabled,
    /// The ring set was rebuilt from the host's scene list
    RingsRebuilt {
        /// Number of rings after the rebuild
        scenes: usize,
    },
    /// A detached replay worker began its round trip
    ReplayStarted {
        /// Scene being replayed
        scene: String,
    },
    /// A replay worker finished and the program was restored
    ReplayFinished {
        /// Scene that was replayed
        scene: String,
        /// Whether live playback completed without error
        success: bool,
    },
    /// A ring was muxed to a file
    ReplaySaved {
        /// Scene whose ring was saved
        scene: String,
        /// File the replay was written to
        path: PathBuf,
    },
    /// The output directory was changed at runtime
    OutputDirectoryChanged {
        /// New output directory
        path: PathBuf,
    },
}
