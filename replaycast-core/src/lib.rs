//! # Replaycast Core
//!
//! Host integration layer for the replaycast engine: the abstraction
//! over the production host's scene graph and capture threads, the
//! owned frame types every cached frame is deep-copied into, and the
//! command vendor protocol.

#![warn(clippy::all)]

pub mod commands;
pub mod error;
pub mod frames;
pub mod host;

pub use commands::{
    CommandResponse, ReplaySceneRequest, ERROR_NO_SCENE_NAME, REQUEST_REPLAY_SCENE,
    REQUEST_SAVE_ALL_REPLAYS, VENDOR_NAME,
};
pub use error::{ReplayError, ReplayResult};
pub use frames::{
    AudioFrame, PixelFormat, PlaneSpec, RawAudioFrame, RawVideoFrame, VideoFrame, MAX_AV_PLANES,
};
pub use host::{
    AudioCaptureCallback, CallbackId, FileOutput, FrameSink, FrontendEvent, HostBackend, MockHost,
    MockOutput, MockSink, OutputSettings, RawVideoCallback, SinkEmission, SourceFilter,
    SourceFilterFactory, SourceKind, SourceRole,
};
