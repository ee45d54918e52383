//! # Replaycast - Instant Replay for Live Production
//!
//! Replaycast is an instant-replay capture engine for embedding in a
//! live video production host. For every monitored scene it keeps the
//! most recent seconds of raw video and audio in a bounded in-memory
//! ring; on demand it switches the program output to a dedicated
//! replay scene, flushes a chosen scene's cached frames through it,
//! restores the previous program scene, and muxes cached frames to
//! disk.
//!
//! ## Key Features
//!
//! - **Bounded frame cache**: per-scene rings of deep-copied frames,
//!   evicting the oldest on overflow
//! - **Host-driven capture**: raw video and per-source audio callbacks
//!   feed the rings under the host's real-time threading model
//! - **Round-trip replay**: program switches to the replay scene, the
//!   cached footage plays through a dedicated sink, then the previous
//!   program is restored
//! - **File export**: any populated ring can be muxed to an mp4 on
//!   demand
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replaycast::{module, EngineConfig, MockHost};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Stand-in for the production host
//!     let host = Arc::new(MockHost::new(&["Game", "Intermission"]));
//!
//!     // Load the module and start capturing
//!     let engine = module::load(host, EngineConfig::default())?;
//!
//!     // Replay the "Game" scene's cached frames on the program
//!     let response = engine
//!         .handle_request("ReplayScene", serde_json::json!({"scene": "Game"}))
//!         .await;
//!     assert!(response.success);
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use replaycast_core::{
    AudioFrame, CommandResponse, FrontendEvent, HostBackend, MockHost, OutputSettings,
    PixelFormat, RawAudioFrame, RawVideoFrame, ReplayError, ReplayResult, ReplaySceneRequest,
    SourceFilter, SourceKind, SourceRole, VideoFrame, ERROR_NO_SCENE_NAME, REQUEST_REPLAY_SCENE,
    REQUEST_SAVE_ALL_REPLAYS, VENDOR_NAME,
};

pub use replaycast_media::{
    CaptureFeeder, FrameRing, PlaybackConfig, PlaybackEngine, RingRegistry, RingSnapshot,
    MAX_ERROR_LOG,
};

// Public API modules
pub mod config;
pub mod engine;
pub mod event;
pub mod module;
pub mod scene;

// Re-export main API types
pub use config::{EngineConfig, OUTPUT_DIRECTORY_KEY, REPLAY_SCENE_NAME, REPLAY_SINK_NAME};
pub use engine::ReplayEngine;
pub use event::ReplayEvent;
pub use scene::ReplaySceneController;
