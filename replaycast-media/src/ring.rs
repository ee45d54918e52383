//! Bounded per-scene frame cache.

use replaycast_core::{AudioFrame, VideoFrame};
use std::collections::VecDeque;
use std::sync::Arc;

/// Bounded FIFO store of the most recent video and audio frames for
/// one scene.
///
/// The two sequences are independent: each is bounded by the same
/// frame capacity, and no alignment between them is maintained beyond
/// insertion order. Replay pairs them positionally.
///
/// The ring itself is not synchronized; the owning
/// [`RingRegistry`](crate::RingRegistry) serializes all access.
#[derive(Debug)]
pub struct FrameRing {
    capacity: usize,
    video: VecDeque<Arc<VideoFrame>>,
    audio: VecDeque<Arc<AudioFrame>>,
}

impl FrameRing {
    /// Create a ring holding at most `seconds * fps` frames per stream
    pub fn with_duration(seconds: u64, fps: u64) -> Self {
        Self::with_capacity((seconds * fps) as usize)
    }

    /// Create a ring with an explicit per-stream frame capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            video: VecDeque::new(),
            audio: VecDeque::new(),
        }
    }

    /// Per-stream frame capacity, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a video frame, evicting the oldest when at capacity.
    ///
    /// Returns false when the ring cannot hold frames (capacity 0).
    pub fn admit_video(&mut self, frame: Arc<VideoFrame>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.video.len() >= self.capacity {
            self.video.pop_front();
        }
        self.video.push_back(frame);
        true
    }

    /// Append an audio frame, evicting the oldest when at capacity
    pub fn admit_audio(&mut self, frame: Arc<AudioFrame>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.audio.len() >= self.capacity {
            self.audio.pop_front();
        }
        self.audio.push_back(frame);
        true
    }

    /// Ordered copy of the current video sequence.
    ///
    /// The returned handles stay valid regardless of later admissions
    /// or ring destruction.
    pub fn snapshot_video(&self) -> Vec<Arc<VideoFrame>> {
        self.video.iter().cloned().collect()
    }

    /// Ordered copy of the current audio sequence
    pub fn snapshot_audio(&self) -> Vec<Arc<AudioFrame>> {
        self.audio.iter().cloned().collect()
    }

    /// Number of retained video frames
    pub fn video_len(&self) -> usize {
        self.video.len()
    }

    /// Number of retained audio frames
    pub fn audio_len(&self) -> usize {
        self.audio.len()
    }

    /// Release every retained frame
    pub fn clear(&mut self) {
        self.video.clear();
        self.audio.clear();
    }
}

/// Stable copy of one ring's contents, taken under the registry mutex
/// and iterated outside it.
#[derive(Debug, Clone, Default)]
pub struct RingSnapshot {
    /// Video frames in admission order
    pub video: Vec<Arc<VideoFrame>>,
    /// Audio frames in admission order
    pub audio: Vec<Arc<AudioFrame>>,
}

impl RingSnapshot {
    /// Whether both streams are populated
    pub fn has_media(&self) -> bool {
        !self.video.is_empty() && !self.audio.is_empty()
    }
}
