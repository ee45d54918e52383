//! Capture ingestion: host callbacks to ring admissions.
//!
//! The host drives two delivery paths. Raw video frames arrive on a
//! single global callback and are routed to the ring of the current
//! program scene; audio arrives on one callback per audio-capable
//! source and is routed to the ring keyed by the source's name. Both
//! paths deep-copy the host's ephemeral plane data before admission;
//! the borrowed views die with the callback.

use crate::registry::RingRegistry;
use parking_lot::Mutex;
use replaycast_core::{
    AudioCaptureCallback, AudioFrame, CallbackId, HostBackend, RawVideoCallback, VideoFrame,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Registers capture callbacks on the host and feeds the ring
/// registry.
pub struct CaptureFeeder {
    host: Arc<dyn HostBackend>,
    registry: Arc<RingRegistry>,
    capacity: usize,
    video_callback: Mutex<Option<CallbackId>>,
    audio_callbacks: Mutex<Vec<CallbackId>>,
}

impl CaptureFeeder {
    /// Create a feeder; `capacity` sizes any ring created lazily on
    /// the video path
    pub fn new(host: Arc<dyn HostBackend>, registry: Arc<RingRegistry>, capacity: usize) -> Self {
        Self {
            host,
            registry,
            capacity,
            video_callback: Mutex::new(None),
            audio_callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Register the global raw video callback.
    ///
    /// Each delivered frame is deep-copied and admitted to the current
    /// program scene's ring, which is created on first use. The
    /// callback takes only the registry mutex and never blocks on I/O.
    pub fn start_video(&self) {
        let mut slot = self.video_callback.lock();
        if slot.is_some() {
            return;
        }

        let host = Arc::clone(&self.host);
        let registry = Arc::clone(&self.registry);
        let capacity = self.capacity;
        let callback: RawVideoCallback = Arc::new(move |raw| {
            let Some(scene) = host.current_scene() else {
                return;
            };
            match VideoFrame::copy_from(raw) {
                Ok(frame) => {
                    if !registry.ensure_and_admit_video(&scene, capacity, Arc::new(frame)) {
                        trace!(scene = %scene, "video frame dropped, capture disabled");
                    }
                }
                Err(e) => {
                    registry.log_error(format!("Rejected video frame for scene {scene}: {e}"));
                }
            }
        });

        *slot = Some(self.host.add_raw_video_callback(callback));
        debug!("raw video capture started");
    }

    /// Register an audio capture callback on every audio-capable
    /// source the host reports.
    ///
    /// Muted deliveries are dropped; deliveries for sources without a
    /// ring are discarded at admission.
    pub fn start_audio(&self) {
        let mut ids = self.audio_callbacks.lock();
        if !ids.is_empty() {
            return;
        }

        for source in self.host.audio_source_names() {
            let registry = Arc::clone(&self.registry);
            let source_name = source.clone();
            let callback: AudioCaptureCallback = Arc::new(move |raw, muted| {
                if muted {
                    return;
                }
                match AudioFrame::copy_from(raw) {
                    Ok(frame) => {
                        if !registry.admit_audio(&source_name, Arc::new(frame)) {
                            trace!(source = %source_name, "audio frame discarded, no ring");
                        }
                    }
                    Err(e) => {
                        registry
                            .log_error(format!("Rejected audio frame from {source_name}: {e}"));
                    }
                }
            });

            match self.host.add_audio_capture_callback(&source, callback) {
                Ok(id) => ids.push(id),
                Err(e) => warn!(source = %source, "audio capture registration failed: {e}"),
            }
        }
        debug!(sources = ids.len(), "audio capture started");
    }

    /// Unregister every capture callback
    pub fn stop(&self) {
        if let Some(id) = self.video_callback.lock().take() {
            self.host.remove_raw_video_callback(id);
        }
        for id in self.audio_callbacks.lock().drain(..) {
            self.host.remove_audio_capture_callback(id);
        }
        debug!("capture stopped");
    }

    /// Whether the video callback is currently registered
    pub fn is_capturing(&self) -> bool {
        self.video_callback.lock().is_some()
    }
}

impl Drop for CaptureFeeder {
    fn drop(&mut self) {
        self.stop();
    }
}
