//! Abstraction over the production host.
//!
//! The engine never talks to the host's source graph directly; it goes
//! through [`HostBackend`], which covers the handful of host services
//! the replay core needs: scene enumeration, program switching,
//! capture callback registration, sink resolution, muxer outputs, and
//! the host's private data store. A full in-memory [`MockHost`] lives
//! alongside the trait for tests and demos.

use crate::error::{ReplayError, ReplayResult};
use crate::frames::{AudioFrame, RawAudioFrame, RawVideoFrame, VideoFrame};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Identifier for a registered capture callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// Raw video callback invoked from the host's video thread
pub type RawVideoCallback = Arc<dyn Fn(&RawVideoFrame<'_>) + Send + Sync>;

/// Per-source audio callback; the second argument is the muted flag
pub type AudioCaptureCallback = Arc<dyn Fn(&RawAudioFrame<'_>, bool) + Send + Sync>;

/// A source in the host graph that accepts frames programmatically
/// and renders them as part of its scene.
pub trait FrameSink: Send + Sync {
    /// Emit a video frame through the sink
    fn output_video(&self, frame: &Arc<VideoFrame>);

    /// Emit an audio frame through the sink
    fn output_audio(&self, frame: &Arc<AudioFrame>);
}

/// Settings for a host muxer output.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Target file path
    pub path: PathBuf,
    /// Container format name
    pub format: String,
    /// Video encoder name
    pub video_encoder: String,
    /// Audio encoder name
    pub audio_encoder: String,
}

impl OutputSettings {
    /// mp4 container with h264 video and aac audio
    pub fn mp4(path: PathBuf) -> Self {
        Self {
            path,
            format: "mp4".to_string(),
            video_encoder: "h264".to_string(),
            audio_encoder: "aac".to_string(),
        }
    }
}

/// Handle to a host muxer output.
///
/// The handle owns a host reference; dropping it releases the output.
pub trait FileOutput: Send + Sync {
    /// Start the output; fails with [`ReplayError::OutputStartFailed`]
    /// when the host muxer refuses
    fn start(&self) -> ReplayResult<()>;

    /// Stop the output and flush the container
    fn stop(&self);
}

/// Role a registered source kind plays in the host graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// Filter attached to another source's video path
    VideoFilter,
    /// Standalone source that consumes programmatic media
    MediaConsumer,
}

/// Instance of a custom source kind created by the host.
///
/// The host calls `video_render` on its render thread; dropping the
/// instance is the destroy hook.
pub trait SourceFilter: Send + Sync {
    /// Display name reported to the host's `get_name` hook
    fn name(&self) -> &'static str;

    /// Render hook invoked with the frame currently flowing through
    /// the filtered source
    fn video_render(&self, frame: &RawVideoFrame<'_>);
}

/// Factory the host invokes for its `create` hook
pub type SourceFilterFactory = Arc<dyn Fn() -> Box<dyn SourceFilter> + Send + Sync>;

/// A custom source kind registration.
#[derive(Clone)]
pub struct SourceKind {
    /// Stable kind identifier, e.g. `replay_capture`
    pub id: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Role within the host graph
    pub role: SourceRole,
    /// Instance factory for the host's create hook
    pub factory: SourceFilterFactory,
}

impl std::fmt::Debug for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceKind")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}

/// Events forwarded from the host frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendEvent {
    /// The program scene changed; carries the new scene name
    SceneChanged {
        /// Scene that became the program
        scene: String,
    },
    /// The host finished loading its scene collection
    FinishedLoading,
}

/// Host services required by the replay engine.
///
/// Implementations are called concurrently from the host's video,
/// audio, UI, and command threads; every method must be safe to call
/// without external locking, and none may re-enter the engine.
pub trait HostBackend: Send + Sync {
    /// Names of all scenes in the current collection
    fn scene_names(&self) -> Vec<String>;

    /// Name of the current program scene, if any
    fn current_scene(&self) -> Option<String>;

    /// Switch the program output to the named scene
    fn set_current_scene(&self, scene: &str) -> ReplayResult<()>;

    /// Whether a scene with this name exists
    fn scene_exists(&self, scene: &str) -> bool;

    /// Create an empty scene
    fn create_scene(&self, scene: &str) -> ReplayResult<()>;

    /// Remove a scene and the sink entities inside it
    fn remove_scene(&self, scene: &str) -> ReplayResult<()>;

    /// Whether the named sink already exists inside the scene
    fn scene_has_sink(&self, scene: &str, sink: &str) -> bool;

    /// Add a media-consumer sink to a scene
    fn add_media_sink(&self, scene: &str, sink: &str) -> ReplayResult<()>;

    /// Resolve a sink by name; the handle stays valid independently of
    /// the registry mutex
    fn resolve_sink(&self, sink: &str) -> Option<Arc<dyn FrameSink>>;

    /// Names of all audio-capable sources
    fn audio_source_names(&self) -> Vec<String>;

    /// Register a callback on the host's raw video output
    fn add_raw_video_callback(&self, callback: RawVideoCallback) -> CallbackId;

    /// Remove a previously registered raw video callback
    fn remove_raw_video_callback(&self, id: CallbackId);

    /// Register an audio capture callback on the named source
    fn add_audio_capture_callback(
        &self,
        source: &str,
        callback: AudioCaptureCallback,
    ) -> ReplayResult<CallbackId>;

    /// Remove a previously registered audio capture callback
    fn remove_audio_capture_callback(&self, id: CallbackId);

    /// Create (but do not start) a muxer output
    fn create_file_output(&self, settings: OutputSettings) -> ReplayResult<Box<dyn FileOutput>>;

    /// Register a custom source kind with the host
    fn register_source_kind(&self, kind: SourceKind) -> ReplayResult<()>;

    /// The module's private configuration directory
    fn config_path(&self) -> PathBuf;

    /// Read a value from the host's private data store
    fn load_private_data(&self, key: &str) -> Option<String>;

    /// Write a value to the host's private data store
    fn store_private_data(&self, key: &str, value: &str);
}

/// One frame emitted through a [`MockSink`], in emission order.
#[derive(Debug, Clone)]
pub enum SinkEmission {
    /// Video frame emission
    Video(Arc<VideoFrame>),
    /// Audio frame emission
    Audio(Arc<AudioFrame>),
}

/// In-memory sink that records everything emitted through it.
#[derive(Default)]
pub struct MockSink {
    emissions: Mutex<Vec<SinkEmission>>,
}

impl MockSink {
    /// All emissions in order
    pub fn emissions(&self) -> Vec<SinkEmission> {
        self.emissions.lock().clone()
    }

    /// Number of video frames emitted
    pub fn video_count(&self) -> usize {
        self.emissions
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEmission::Video(_)))
            .count()
    }

    /// Number of audio frames emitted
    pub fn audio_count(&self) -> usize {
        self.emissions
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEmission::Audio(_)))
            .count()
    }
}

impl FrameSink for MockSink {
    fn output_video(&self, frame: &Arc<VideoFrame>) {
        self.emissions
            .lock()
            .push(SinkEmission::Video(Arc::clone(frame)));
    }

    fn output_audio(&self, frame: &Arc<AudioFrame>) {
        self.emissions
            .lock()
            .push(SinkEmission::Audio(Arc::clone(frame)));
    }
}

/// Record of a muxer output created through the mock host.
pub struct MockOutput {
    settings: OutputSettings,
    started: AtomicBool,
    stopped: AtomicBool,
    fail_start: bool,
}

impl MockOutput {
    /// Settings the output was created with
    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Whether `start` succeeded on this output
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether the output was stopped
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl FileOutput for Arc<MockOutput> {
    fn start(&self) -> ReplayResult<()> {
        if self.fail_start {
            return Err(ReplayError::OutputStartFailed {
                path: self.settings.path.clone(),
                reason: "mock output configured to fail".to_string(),
            });
        }
        // The mock muxer's only observable side effect: the file exists.
        std::fs::File::create(&self.settings.path).map_err(|e| {
            ReplayError::OutputStartFailed {
                path: self.settings.path.clone(),
                reason: e.to_string(),
            }
        })?;
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockHostState {
    scenes: Vec<String>,
    current_scene: Option<String>,
    program_history: Vec<String>,
    scene_sinks: HashMap<String, Vec<String>>,
    sinks: HashMap<String, Arc<MockSink>>,
    audio_sources: Vec<String>,
    video_callbacks: HashMap<u64, RawVideoCallback>,
    audio_callbacks: HashMap<u64, (String, AudioCaptureCallback)>,
    next_callback_id: u64,
    outputs: Vec<Arc<MockOutput>>,
    fail_output_start: bool,
    source_kinds: Vec<SourceKind>,
    data_store: HashMap<String, String>,
}

/// In-memory host implementation for tests and demos.
///
/// Frames pushed through [`MockHost::deliver_video_frame`] and
/// [`MockHost::deliver_audio_frame`] fan out to every registered
/// capture callback, the way the host's capture threads would.
pub struct MockHost {
    state: Mutex<MockHostState>,
    config_path: PathBuf,
}

impl MockHost {
    /// Create a mock host with the given scenes; the first one becomes
    /// the program scene
    pub fn new(scenes: &[&str]) -> Self {
        let state = MockHostState {
            scenes: scenes.iter().map(|s| s.to_string()).collect(),
            current_scene: scenes.first().map(|s| s.to_string()),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            config_path: std::env::temp_dir().join("replaycast"),
        }
    }

    /// Override the module config path reported to the engine
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = path;
        self
    }

    /// Make every subsequently created output refuse to start
    pub fn fail_output_start(&self, fail: bool) {
        self.state.lock().fail_output_start = fail;
    }

    /// Add a scene to the collection without switching to it
    pub fn add_scene(&self, scene: &str) {
        let mut state = self.state.lock();
        if !state.scenes.iter().any(|s| s == scene) {
            state.scenes.push(scene.to_string());
        }
    }

    /// Declare the audio-capable sources the host exposes
    pub fn set_audio_sources(&self, sources: &[&str]) {
        self.state.lock().audio_sources = sources.iter().map(|s| s.to_string()).collect();
    }

    /// Sink handle by name, for inspecting emissions
    pub fn sink(&self, name: &str) -> Option<Arc<MockSink>> {
        self.state.lock().sinks.get(name).cloned()
    }

    /// Number of sink entities inside a scene
    pub fn scene_sink_count(&self, scene: &str) -> usize {
        self.state
            .lock()
            .scene_sinks
            .get(scene)
            .map_or(0, |sinks| sinks.len())
    }

    /// Every program switch in order
    pub fn program_history(&self) -> Vec<String> {
        self.state.lock().program_history.clone()
    }

    /// Outputs created so far, oldest first
    pub fn outputs(&self) -> Vec<Arc<MockOutput>> {
        self.state.lock().outputs.clone()
    }

    /// Ids of the source kinds registered with the host
    pub fn registered_source_kinds(&self) -> Vec<&'static str> {
        self.state.lock().source_kinds.iter().map(|k| k.id).collect()
    }

    /// Instantiate a registered source kind, as the host's create hook
    /// would
    pub fn create_source_instance(&self, kind_id: &str) -> Option<Box<dyn SourceFilter>> {
        let factory = self
            .state
            .lock()
            .source_kinds
            .iter()
            .find(|k| k.id == kind_id)
            .map(|k| Arc::clone(&k.factory))?;
        Some(factory())
    }

    /// Number of live audio capture callbacks
    pub fn audio_callback_count(&self) -> usize {
        self.state.lock().audio_callbacks.len()
    }

    /// Number of live raw video callbacks
    pub fn video_callback_count(&self) -> usize {
        self.state.lock().video_callbacks.len()
    }

    /// Fan a raw video frame out to all registered video callbacks
    pub fn deliver_video_frame(&self, frame: &RawVideoFrame<'_>) {
        let callbacks: Vec<RawVideoCallback> =
            self.state.lock().video_callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(frame);
        }
    }

    /// Deliver an audio frame to the callbacks registered on `source`
    pub fn deliver_audio_frame(&self, source: &str, frame: &RawAudioFrame<'_>, muted: bool) {
        let callbacks: Vec<AudioCaptureCallback> = self
            .state
            .lock()
            .audio_callbacks
            .values()
            .filter(|(name, _)| name == source)
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(frame, muted);
        }
    }
}

impl HostBackend for MockHost {
    fn scene_names(&self) -> Vec<String> {
        self.state.lock().scenes.clone()
    }

    fn current_scene(&self) -> Option<String> {
        self.state.lock().current_scene.clone()
    }

    fn set_current_scene(&self, scene: &str) -> ReplayResult<()> {
        let mut state = self.state.lock();
        if !state.scenes.iter().any(|s| s == scene) {
            return Err(ReplayError::SceneNotFound {
                scene: scene.to_string(),
            });
        }
        state.current_scene = Some(scene.to_string());
        state.program_history.push(scene.to_string());
        debug!(scene, "mock program switch");
        Ok(())
    }

    fn scene_exists(&self, scene: &str) -> bool {
        self.state.lock().scenes.iter().any(|s| s == scene)
    }

    fn create_scene(&self, scene: &str) -> ReplayResult<()> {
        let mut state = self.state.lock();
        if !state.scenes.iter().any(|s| s == scene) {
            state.scenes.push(scene.to_string());
        }
        Ok(())
    }

    fn remove_scene(&self, scene: &str) -> ReplayResult<()> {
        let mut state = self.state.lock();
        if !state.scenes.iter().any(|s| s == scene) {
            return Err(ReplayError::SceneNotFound {
                scene: scene.to_string(),
            });
        }
        state.scenes.retain(|s| s != scene);
        if state.current_scene.as_deref() == Some(scene) {
            state.current_scene = state.scenes.first().cloned();
        }
        if let Some(sinks) = state.scene_sinks.remove(scene) {
            for sink in sinks {
                state.sinks.remove(&sink);
            }
        }
        Ok(())
    }

    fn scene_has_sink(&self, scene: &str, sink: &str) -> bool {
        self.state
            .lock()
            .scene_sinks
            .get(scene)
            .is_some_and(|sinks| sinks.iter().any(|s| s == sink))
    }

    fn add_media_sink(&self, scene: &str, sink: &str) -> ReplayResult<()> {
        let mut state = self.state.lock();
        if !state.scenes.iter().any(|s| s == scene) {
            return Err(ReplayError::SceneNotFound {
                scene: scene.to_string(),
            });
        }
        state
            .scene_sinks
            .entry(scene.to_string())
            .or_default()
            .push(sink.to_string());
        state
            .sinks
            .entry(sink.to_string())
            .or_insert_with(|| Arc::new(MockSink::default()));
        Ok(())
    }

    fn resolve_sink(&self, sink: &str) -> Option<Arc<dyn FrameSink>> {
        self.state
            .lock()
            .sinks
            .get(sink)
            .map(|s| Arc::clone(s) as Arc<dyn FrameSink>)
    }

    fn audio_source_names(&self) -> Vec<String> {
        self.state.lock().audio_sources.clone()
    }

    fn add_raw_video_callback(&self, callback: RawVideoCallback) -> CallbackId {
        let mut state = self.state.lock();
        state.next_callback_id += 1;
        let id = state.next_callback_id;
        state.video_callbacks.insert(id, callback);
        CallbackId(id)
    }

    fn remove_raw_video_callback(&self, id: CallbackId) {
        self.state.lock().video_callbacks.remove(&id.0);
    }

    fn add_audio_capture_callback(
        &self,
        source: &str,
        callback: AudioCaptureCallback,
    ) -> ReplayResult<CallbackId> {
        let mut state = self.state.lock();
        if !state.audio_sources.iter().any(|s| s == source) {
            return Err(ReplayError::Host {
                operation: "add_audio_capture_callback".to_string(),
                reason: format!("no audio source named {source}"),
            });
        }
        state.next_callback_id += 1;
        let id = state.next_callback_id;
        state
            .audio_callbacks
            .insert(id, (source.to_string(), callback));
        Ok(CallbackId(id))
    }

    fn remove_audio_capture_callback(&self, id: CallbackId) {
        self.state.lock().audio_callbacks.remove(&id.0);
    }

    fn create_file_output(&self, settings: OutputSettings) -> ReplayResult<Box<dyn FileOutput>> {
        let mut state = self.state.lock();
        let output = Arc::new(MockOutput {
            settings,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            fail_start: state.fail_output_start,
        });
        state.outputs.push(Arc::clone(&output));
        Ok(Box::new(output))
    }

    fn register_source_kind(&self, kind: SourceKind) -> ReplayResult<()> {
        self.state.lock().source_kinds.push(kind);
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn load_private_data(&self, key: &str) -> Option<String> {
        self.state.lock().data_store.get(key).cloned()
    }

    fn store_private_data(&self, key: &str, value: &str) {
        self.state
            .lock()
            .data_store
            .insert(key.to_string(), value.to_string());
    }
}
