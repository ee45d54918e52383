//! # Replaycast Media
//!
//! The frame-cache core: bounded per-scene rings of deep-copied
//! frames, the capture ingestion that feeds them from host callbacks,
//! and the playback engine that drains them back out with correct
//! pacing and A/V interleaving.

#![warn(clippy::all)]

pub mod capture;
pub mod playback;
pub mod registry;
pub mod ring;

pub use capture::CaptureFeeder;
pub use playback::{PlaybackConfig, PlaybackEngine};
pub use registry::{RingRegistry, MAX_ERROR_LOG};
pub use ring::{FrameRing, RingSnapshot};
