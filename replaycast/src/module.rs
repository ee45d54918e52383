//! Module entry points and host registrations.
//!
//! The embedding host calls [`load`] once at startup and [`unload`]
//! at shutdown. Loading registers the `replay_capture` source kind
//! with the host and returns the engine; the embedder wires the
//! engine's [`ReplayEngine::handle_request`] to its command transport
//! under [`replaycast_core::VENDOR_NAME`] with the
//! [`replaycast_core::REQUEST_REPLAY_SCENE`] and
//! [`replaycast_core::REQUEST_SAVE_ALL_REPLAYS`] request names.

use crate::config::EngineConfig;
use crate::engine::ReplayEngine;
use replaycast_core::{
    HostBackend, RawVideoFrame, ReplayError, ReplayResult, SourceFilter, SourceKind, SourceRole,
    VideoFrame,
};
use replaycast_media::RingRegistry;
use std::sync::Arc;
use tracing::info;

/// Internal module name
pub const MODULE_NAME: &str = "replaycast";

/// Module description shown by the host
pub const MODULE_DESCRIPTION: &str = "Replay engine: caches the last 30 seconds of each scene, \
     creates a replay scene, and replays footage dynamically on demand.";

/// Module version
pub const MODULE_VERSION: &str = "1.0.0";

/// Minimum host version the module supports
pub const MIN_HOST_VERSION: &str = "29.1.0";

/// Identifier of the custom source kind registered with the host
pub const SOURCE_KIND_ID: &str = "replay_capture";

/// Module name accessor for the host's metadata hooks
pub fn module_name() -> &'static str {
    MODULE_NAME
}

/// Module description accessor for the host's metadata hooks
pub fn module_description() -> &'static str {
    MODULE_DESCRIPTION
}

/// Module version accessor for the host's metadata hooks
pub fn module_version() -> &'static str {
    MODULE_VERSION
}

/// Video-filter instance behind the `replay_capture` source kind.
///
/// Attached to a source, it taps every frame flowing through that
/// source's video path into the current program scene's ring, the
/// same admission the global raw video callback performs.
struct ReplayCaptureFilter {
    host: Arc<dyn HostBackend>,
    registry: Arc<RingRegistry>,
    capacity: usize,
}

impl SourceFilter for ReplayCaptureFilter {
    fn name(&self) -> &'static str {
        "Replay Capture"
    }

    fn video_render(&self, frame: &RawVideoFrame<'_>) {
        let Some(scene) = self.host.current_scene() else {
            return;
        };
        match VideoFrame::copy_from(frame) {
            Ok(frame) => {
                self.registry
                    .ensure_and_admit_video(&scene, self.capacity, Arc::new(frame));
            }
            Err(e) => {
                self.registry
                    .log_error(format!("Rejected video frame for scene {scene}: {e}"));
            }
        }
    }
}

/// Load the module: build the engine, register the `replay_capture`
/// source kind, and start capture when configured enabled.
///
/// Fails when the configuration is invalid or the host refuses the
/// source-kind registration.
pub fn load(host: Arc<dyn HostBackend>, config: EngineConfig) -> ReplayResult<ReplayEngine> {
    info!(
        version = MODULE_VERSION,
        min_host = MIN_HOST_VERSION,
        "loading replay module"
    );

    let enabled = config.enabled;
    let capacity = config.ring_capacity();
    let engine = ReplayEngine::new(Arc::clone(&host), config)?;

    let filter_host = Arc::clone(&host);
    let filter_registry = engine.registry();
    host.register_source_kind(SourceKind {
        id: SOURCE_KIND_ID,
        display_name: "Replay Capture",
        role: SourceRole::VideoFilter,
        factory: Arc::new(move || {
            Box::new(ReplayCaptureFilter {
                host: Arc::clone(&filter_host),
                registry: Arc::clone(&filter_registry),
                capacity,
            }) as Box<dyn SourceFilter>
        }),
    })
    .map_err(|e| ReplayError::Initialization {
        reason: format!("source kind registration failed: {e}"),
    })?;

    if enabled {
        engine.set_enabled(true);
    }

    info!("replay module loaded");
    Ok(engine)
}

/// Unload the module: stop captures and release every cached frame
pub fn unload(engine: &ReplayEngine) {
    engine.shutdown();
    info!("replay module unloaded");
}
