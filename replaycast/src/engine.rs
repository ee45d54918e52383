//! Engine lifecycle and command dispatch.

use crate::config::{EngineConfig, OUTPUT_DIRECTORY_KEY};
use crate::event::ReplayEvent;
use crate::scene::ReplaySceneController;
use parking_lot::RwLock;
use replaycast_core::{
    CommandResponse, FrontendEvent, HostBackend, ReplaySceneRequest, ReplayResult,
    ERROR_NO_SCENE_NAME, REQUEST_REPLAY_SCENE, REQUEST_SAVE_ALL_REPLAYS,
};
use replaycast_media::{CaptureFeeder, PlaybackEngine, RingRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// The instant-replay engine.
///
/// One value owns all process-wide state the engine needs: the ring
/// registry, the capture feeder, the playback engine, and the replay
/// scene controller. Clones share the same engine; host callbacks and
/// detached replay workers each hold one.
#[derive(Clone)]
pub struct ReplayEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    host: Arc<dyn HostBackend>,
    registry: Arc<RingRegistry>,
    feeder: CaptureFeeder,
    playback: Arc<PlaybackEngine>,
    controller: ReplaySceneController,
    config: RwLock<EngineConfig>,
    output_directory: RwLock<PathBuf>,
    events: broadcast::Sender<ReplayEvent>,
}

impl ReplayEngine {
    /// Build an engine over the given host.
    ///
    /// The engine starts disabled; call [`ReplayEngine::set_enabled`]
    /// (or go through [`crate::module::load`]) to begin capturing. The
    /// output directory resolves, in order, to the configured path,
    /// the value persisted in the host's data store, then the host's
    /// module config path.
    pub fn new(host: Arc<dyn HostBackend>, config: EngineConfig) -> ReplayResult<Self> {
        config.validate()?;

        let registry = Arc::new(RingRegistry::new());
        let playback = Arc::new(PlaybackEngine::new(
            Arc::clone(&host),
            Arc::clone(&registry),
            config.playback(),
        ));
        let feeder = CaptureFeeder::new(
            Arc::clone(&host),
            Arc::clone(&registry),
            config.ring_capacity(),
        );
        let controller = ReplaySceneController::new(
            Arc::clone(&host),
            Arc::clone(&registry),
            Arc::clone(&playback),
            config.replay_scene.clone(),
            config.replay_sink.clone(),
        );

        let output_directory = config
            .output_directory
            .clone()
            .or_else(|| host.load_private_data(OUTPUT_DIRECTORY_KEY).map(PathBuf::from))
            .unwrap_or_else(|| host.config_path());
        info!(path = %output_directory.display(), "output directory resolved");

        let (events, _) = broadcast::channel(100);

        Ok(Self {
            inner: Arc::new(EngineInner {
                host,
                registry,
                feeder,
                playback,
                controller,
                config: RwLock::new(config),
                output_directory: RwLock::new(output_directory),
                events,
            }),
        })
    }

    /// Whether capture is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.inner.registry.is_enabled()
    }

    /// Enable or disable capture.
    ///
    /// Enabling rebuilds the ring set from the host's scene list and
    /// registers the capture callbacks; disabling unregisters them and
    /// clears every ring. In-flight replay workers keep the snapshots
    /// they already hold.
    pub fn set_enabled(&self, enabled: bool) {
        if self.is_enabled() == enabled {
            return;
        }

        if enabled {
            self.inner.registry.set_enabled(true);
            self.rebuild_rings();
            self.inner.feeder.start_video();
            self.inner.feeder.start_audio();
            info!("replay capture enabled");
            self.send_event(ReplayEvent::EngineEnabled);
        } else {
            self.inner.feeder.stop();
            self.inner.registry.set_enabled(false);
            self.inner.registry.clear_all();
            info!("replay capture disabled");
            self.send_event(ReplayEvent::EngineDisabled);
        }
    }

    /// Rebuild the ring set from the host's current scene list
    fn rebuild_rings(&self) {
        let scenes = self.inner.host.scene_names();
        let capacity = self.inner.config.read().ring_capacity();
        self.inner.registry.rebuild_from_scenes(&scenes, capacity);
        self.send_event(ReplayEvent::RingsRebuilt {
            scenes: scenes.len(),
        });
    }

    /// React to a host frontend event
    pub fn handle_frontend_event(&self, event: FrontendEvent) {
        match event {
            FrontendEvent::SceneChanged { scene } => {
                if self.is_enabled() {
                    let capacity = self.inner.config.read().ring_capacity();
                    self.inner.registry.ensure(&scene, capacity);
                }
            }
            FrontendEvent::FinishedLoading => {
                self.rebuild_rings();
                if self.is_enabled() {
                    self.inner.feeder.start_video();
                    self.inner.feeder.start_audio();
                }
            }
        }
    }

    /// Dispatch a vendor request delivered by the command transport.
    ///
    /// `ReplayScene` spawns a detached worker and responds
    /// immediately; `SaveAllReplays` saves inline before responding.
    /// Unknown request names fail without side effects.
    pub async fn handle_request(
        &self,
        request: &str,
        payload: serde_json::Value,
    ) -> CommandResponse {
        match request {
            REQUEST_REPLAY_SCENE => {
                let request: ReplaySceneRequest =
                    serde_json::from_value(payload).unwrap_or_default();
                match request.scene.as_deref() {
                    Some(scene) if !scene.is_empty() => {
                        self.replay_scene(scene);
                        CommandResponse::ok()
                    }
                    _ => CommandResponse::failure(ERROR_NO_SCENE_NAME),
                }
            }
            REQUEST_SAVE_ALL_REPLAYS => {
                self.save_all_replays().await;
                CommandResponse::ok()
            }
            other => {
                warn!(request = other, "unknown vendor request");
                CommandResponse::failure(format!("Unknown request: {other}"))
            }
        }
    }

    /// Spawn a detached worker that replays the named scene on the
    /// program output and then restores the previous program scene.
    ///
    /// The worker runs to completion; it cannot be cancelled from
    /// outside. Failures land in the error log, never in the caller.
    pub fn replay_scene(&self, scene: &str) {
        if let Err(e) = self.inner.controller.ensure_scene_and_sink() {
            self.inner.registry.log_error(e.to_string());
        }

        let engine = self.clone();
        let scene = scene.to_string();
        tokio::spawn(async move {
            engine.send_event(ReplayEvent::ReplayStarted {
                scene: scene.clone(),
            });
            let output_dir = engine.output_directory();
            let success = engine
                .inner
                .controller
                .play_and_return(&scene, &output_dir)
                .await;
            engine.send_event(ReplayEvent::ReplayFinished { scene, success });
        });
    }

    /// Save every ring holding both video and audio to a file.
    ///
    /// Rings that fail to save are logged and skipped; the remaining
    /// rings still save.
    pub async fn save_all_replays(&self) {
        let output_dir = self.output_directory();
        for scene in self.inner.registry.scenes_with_media() {
            match self
                .inner
                .playback
                .save_to_file(&scene, &output_dir)
                .await
            {
                Ok(path) => self.send_event(ReplayEvent::ReplaySaved { scene, path }),
                Err(e) => self.inner.registry.log_error(e.to_string()),
            }
        }
    }

    /// Create the replay scene and sink if they are missing
    pub fn ensure_replay_scene(&self) -> ReplayResult<()> {
        self.inner.controller.ensure_scene_and_sink()
    }

    /// Directory replay files are written to
    pub fn output_directory(&self) -> PathBuf {
        self.inner.output_directory.read().clone()
    }

    /// Change the output directory and persist it in the host's data
    /// store
    pub fn set_output_directory(&self, path: PathBuf) {
        self.inner
            .host
            .store_private_data(OUTPUT_DIRECTORY_KEY, &path.to_string_lossy());
        info!(path = %path.display(), "output directory set");
        *self.inner.output_directory.write() = path.clone();
        self.send_event(ReplayEvent::OutputDirectoryChanged { path });
    }

    /// Subscribe to engine events
    pub fn subscribe_events(&self) -> broadcast::Receiver<ReplayEvent> {
        self.inner.events.subscribe()
    }

    /// The retained error messages, oldest first
    pub fn recent_errors(&self) -> Vec<String> {
        self.inner.registry.recent_errors()
    }

    /// Error log rendered as a multi-line text block
    pub fn error_log_text(&self) -> String {
        self.inner.registry.error_log_text()
    }

    /// Handle to the ring registry
    pub fn registry(&self) -> Arc<RingRegistry> {
        Arc::clone(&self.inner.registry)
    }

    /// Stop captures, clear every ring, disable the engine, and
    /// remove the replay scene from the host graph.
    ///
    /// Called on module unload; safe to call more than once.
    pub fn shutdown(&self) {
        self.inner.feeder.stop();
        self.inner.registry.set_enabled(false);
        self.inner.registry.clear_all();
        self.inner.controller.remove_scene_and_sink();
    }

    fn send_event(&self, event: ReplayEvent) {
        let _ = self.inner.events.send(event);
    }
}
