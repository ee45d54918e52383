//! Unit tests for the frame ring and the ring registry
//!
//! These pin the bounded-buffer invariants: capacity is never
//! exceeded, eviction keeps the newest frames in admission order,
//! snapshots are stable, and structural rebuilds leave exactly the
//! requested ring set.

use replaycast_core::{AudioFrame, PixelFormat, RawAudioFrame, RawVideoFrame, VideoFrame};
use replaycast_media::{FrameRing, RingRegistry};
use std::sync::Arc;

fn video_frame(timestamp: u64) -> Arc<VideoFrame> {
    let data = vec![0u8; 32 * 32];
    let mut raw = RawVideoFrame::new(32, 32, PixelFormat::Y800, timestamp);
    raw.data[0] = Some(&data);
    raw.linesize[0] = 32;
    Arc::new(VideoFrame::copy_from(&raw).unwrap())
}

fn audio_frame(timestamp: u64) -> Arc<AudioFrame> {
    let samples = vec![0.0f32; 128];
    let mut raw = RawAudioFrame::new(128, 48_000, timestamp);
    raw.data[0] = Some(&samples);
    Arc::new(AudioFrame::copy_from(&raw).unwrap())
}

// ============================================================================
// FRAME RING TESTS
// ============================================================================

#[test]
fn test_ring_never_exceeds_capacity() {
    let mut ring = FrameRing::with_capacity(1800);
    for ts in 0..1900u64 {
        ring.admit_video(video_frame(ts));
        ring.admit_audio(audio_frame(ts));
    }
    assert_eq!(ring.video_len(), 1800);
    assert_eq!(ring.audio_len(), 1800);
}

#[test]
fn test_wraparound_keeps_last_capacity_frames_in_order() {
    let capacity = 1800;
    let mut ring = FrameRing::with_capacity(capacity);
    for ts in 0..(capacity as u64 + 100) {
        ring.admit_video(video_frame(ts));
    }

    let snapshot = ring.snapshot_video();
    assert_eq!(snapshot.len(), capacity);
    // The first 100 admissions are gone; the rest survive in order.
    assert_eq!(snapshot[0].timestamp(), 100);
    assert_eq!(snapshot[capacity - 1].timestamp(), capacity as u64 + 99);
    for window in snapshot.windows(2) {
        assert_eq!(window[1].timestamp(), window[0].timestamp() + 1);
    }
}

#[test]
fn test_snapshot_is_stable_against_later_admissions() {
    let mut ring = FrameRing::with_capacity(4);
    for ts in 0..4 {
        ring.admit_video(video_frame(ts));
    }
    let snapshot = ring.snapshot_video();

    for ts in 4..12 {
        ring.admit_video(video_frame(ts));
    }

    let timestamps: Vec<u64> = snapshot.iter().map(|f| f.timestamp()).collect();
    assert_eq!(timestamps, vec![0, 1, 2, 3]);
    let current: Vec<u64> = ring.snapshot_video().iter().map(|f| f.timestamp()).collect();
    assert_eq!(current, vec![8, 9, 10, 11]);
}

#[test]
fn test_video_and_audio_sequences_are_independent() {
    let mut ring = FrameRing::with_capacity(8);
    for ts in 0..8 {
        ring.admit_video(video_frame(ts));
    }
    for ts in 0..3 {
        ring.admit_audio(audio_frame(ts));
    }
    assert_eq!(ring.video_len(), 8);
    assert_eq!(ring.audio_len(), 3);
}

#[test]
fn test_clear_releases_everything() {
    let mut ring = FrameRing::with_capacity(8);
    for ts in 0..8 {
        ring.admit_video(video_frame(ts));
        ring.admit_audio(audio_frame(ts));
    }
    ring.clear();
    assert_eq!(ring.video_len(), 0);
    assert_eq!(ring.audio_len(), 0);
    assert!(ring.snapshot_video().is_empty());
}

#[test]
fn test_snapshot_outlives_ring() {
    let snapshot = {
        let mut ring = FrameRing::with_capacity(4);
        ring.admit_video(video_frame(7));
        ring.snapshot_video()
    };
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].timestamp(), 7);
    assert_eq!(snapshot[0].planes()[0].len(), 32 * 32);
}

// ============================================================================
// REGISTRY TESTS
// ============================================================================

#[test]
fn test_rebuild_leaves_exactly_the_requested_scenes() {
    let registry = RingRegistry::new();
    registry.rebuild_from_scenes(&["A", "B", "C"], 16);

    let mut names = registry.scene_names();
    names.sort();
    assert_eq!(names, vec!["A", "B", "C"]);

    registry.rebuild_from_scenes(&["B", "D"], 16);
    let mut names = registry.scene_names();
    names.sort();
    assert_eq!(names, vec!["B", "D"]);
    assert!(registry.snapshot("A").is_none());
    assert!(registry.snapshot("C").is_none());
}

#[test]
fn test_rebuild_resets_ring_contents() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.rebuild_from_scenes(&["A"], 16);
    registry.ensure_and_admit_video("A", 16, video_frame(0));
    assert_eq!(registry.ring_sizes("A"), Some((1, 0)));

    registry.rebuild_from_scenes(&["A"], 16);
    assert_eq!(registry.ring_sizes("A"), Some((0, 0)));
}

#[test]
fn test_ensure_is_idempotent() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.ensure("A", 16);
    registry.ensure_and_admit_video("A", 16, video_frame(0));
    registry.ensure("A", 16);
    // A second ensure must not recreate the ring and lose frames.
    assert_eq!(registry.ring_sizes("A"), Some((1, 0)));
}

#[test]
fn test_disabled_registry_rejects_admissions() {
    let registry = RingRegistry::new();
    registry.rebuild_from_scenes(&["A"], 16);
    assert!(!registry.is_enabled());

    assert!(!registry.ensure_and_admit_video("A", 16, video_frame(0)));
    assert!(!registry.admit_audio("A", audio_frame(0)));
    assert_eq!(registry.ring_sizes("A"), Some((0, 0)));
}

#[test]
fn test_audio_for_unknown_source_is_discarded() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.rebuild_from_scenes(&["A"], 16);

    assert!(!registry.admit_audio("Mic", audio_frame(0)));
    assert_eq!(registry.ring_sizes("A"), Some((0, 0)));
    assert!(registry.snapshot("Mic").is_none());
}

#[test]
fn test_scenes_with_media_requires_both_streams() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.rebuild_from_scenes(&["A", "B", "C"], 16);

    registry.ensure_and_admit_video("A", 16, video_frame(0));
    registry.admit_audio("A", audio_frame(0));
    registry.ensure_and_admit_video("B", 16, video_frame(0));

    assert_eq!(registry.scenes_with_media(), vec!["A"]);
}

#[test]
fn test_clear_all_empties_the_registry() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.rebuild_from_scenes(&["A", "B"], 16);
    registry.ensure_and_admit_video("A", 16, video_frame(0));

    registry.clear_all();
    assert!(registry.scene_names().is_empty());
    assert!(registry.snapshot("A").is_none());
}

#[test]
fn test_snapshot_taken_before_clear_survives() {
    let registry = RingRegistry::new();
    registry.set_enabled(true);
    registry.rebuild_from_scenes(&["A"], 16);
    registry.ensure_and_admit_video("A", 16, video_frame(3));

    let snapshot = registry.snapshot("A").unwrap();
    registry.clear_all();

    assert_eq!(snapshot.video.len(), 1);
    assert_eq!(snapshot.video[0].timestamp(), 3);
}
