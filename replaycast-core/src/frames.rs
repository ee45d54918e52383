//! Owned media frame types and the ephemeral host-delivered views
//! they are copied from.
//!
//! The host hands out borrowed plane data that is only valid for the
//! duration of a capture callback. Anything the engine wants to keep
//! must be deep-copied into [`VideoFrame`] / [`AudioFrame`], which own
//! their plane buffers for their whole lifetime.

use crate::error::{ReplayError, ReplayResult};
use bytes::Bytes;

/// Maximum number of planes a frame can carry (host convention).
pub const MAX_AV_PLANES: usize = 8;

/// Pixel formats accepted by the capture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar 4:2:0, three planes, chroma at half width and height
    I420,
    /// Semi-planar 4:2:0, luma plane plus interleaved chroma plane
    Nv12,
    /// Packed 4:2:2, single plane
    Yuy2,
    /// Packed RGBA, single plane
    Rgba,
    /// Packed BGRA, single plane
    Bgra,
    /// Packed BGRX, single plane
    Bgrx,
    /// Single luma plane
    Y800,
}

/// Per-plane sizing rule for a pixel format.
///
/// A plane holds `height / height_divisor` rows of
/// `(width / width_divisor) * bytes_per_sample` meaningful bytes; the
/// host may pad rows, so admission sizes rows by the delivered line
/// stride instead of the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSpec {
    /// Divisor applied to the frame width for this plane
    pub width_divisor: u32,
    /// Divisor applied to the frame height for this plane
    pub height_divisor: u32,
    /// Bytes per sample in this plane
    pub bytes_per_sample: u32,
}

const fn plane(width_divisor: u32, height_divisor: u32, bytes_per_sample: u32) -> PlaneSpec {
    PlaneSpec {
        width_divisor,
        height_divisor,
        bytes_per_sample,
    }
}

impl PixelFormat {
    /// Plane layout table for this format.
    ///
    /// Getting a divisor wrong here corrupts every frame admitted in
    /// that format, so the table is the single source of truth for
    /// plane sizing.
    pub fn plane_layout(&self) -> &'static [PlaneSpec] {
        const I420: [PlaneSpec; 3] = [plane(1, 1, 1), plane(2, 2, 1), plane(2, 2, 1)];
        const NV12: [PlaneSpec; 2] = [plane(1, 1, 1), plane(2, 2, 2)];
        const YUY2: [PlaneSpec; 1] = [plane(1, 1, 2)];
        const PACKED4: [PlaneSpec; 1] = [plane(1, 1, 4)];
        const Y800: [PlaneSpec; 1] = [plane(1, 1, 1)];
        match self {
            PixelFormat::I420 => &I420,
            PixelFormat::Nv12 => &NV12,
            PixelFormat::Yuy2 => &YUY2,
            PixelFormat::Rgba | PixelFormat::Bgra | PixelFormat::Bgrx => &PACKED4,
            PixelFormat::Y800 => &Y800,
        }
    }

    /// Number of planes frames of this format carry
    pub fn plane_count(&self) -> usize {
        self.plane_layout().len()
    }
}

/// Borrowed view of a raw video frame as delivered by the host.
///
/// Plane slices are only valid inside the capture callback; the view
/// cannot be stored.
#[derive(Debug, Clone, Copy)]
pub struct RawVideoFrame<'a> {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format of the plane data
    pub format: PixelFormat,
    /// Host-provided timestamp in nanoseconds
    pub timestamp: u64,
    /// Plane data, one entry per plane in the format's layout
    pub data: [Option<&'a [u8]>; MAX_AV_PLANES],
    /// Line stride in bytes for each plane
    pub linesize: [usize; MAX_AV_PLANES],
}

impl<'a> RawVideoFrame<'a> {
    /// Create an empty raw frame header with no plane data attached
    pub fn new(width: u32, height: u32, format: PixelFormat, timestamp: u64) -> Self {
        Self {
            width,
            height,
            format,
            timestamp,
            data: [None; MAX_AV_PLANES],
            linesize: [0; MAX_AV_PLANES],
        }
    }
}

/// Borrowed view of a raw audio delivery from the host.
#[derive(Debug, Clone, Copy)]
pub struct RawAudioFrame<'a> {
    /// Samples per channel in this delivery
    pub frames: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Host-provided timestamp in nanoseconds
    pub timestamp: u64,
    /// Planar f32 channel data
    pub data: [Option<&'a [f32]>; MAX_AV_PLANES],
}

impl<'a> RawAudioFrame<'a> {
    /// Create an empty raw audio header with no channel data attached
    pub fn new(frames: usize, sample_rate: u32, timestamp: u64) -> Self {
        Self {
            frames,
            sample_rate,
            timestamp,
            data: [None; MAX_AV_PLANES],
        }
    }
}

/// Owned copy of a video frame.
///
/// Format and dimensions are immutable after construction; each plane
/// buffer is exclusively owned by the frame and released with it.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    format: PixelFormat,
    timestamp: u64,
    planes: Vec<Bytes>,
    linesize: Vec<usize>,
}

impl VideoFrame {
    /// Deep-copy a host-delivered raw frame into an owned frame.
    ///
    /// Each plane's byte size is `linesize * (height / height_divisor)`
    /// per the format's layout table. Frames with zero dimensions or
    /// missing plane data are rejected so that consumers never observe
    /// an invalid frame.
    pub fn copy_from(raw: &RawVideoFrame<'_>) -> ReplayResult<Self> {
        if raw.width == 0 || raw.height == 0 {
            return Err(ReplayError::InvalidFrame {
                reason: format!("zero dimensions: {}x{}", raw.width, raw.height),
            });
        }

        let layout = raw.format.plane_layout();
        let mut planes = Vec::with_capacity(layout.len());
        let mut linesize = Vec::with_capacity(layout.len());

        for (index, spec) in layout.iter().enumerate() {
            let data = raw.data[index].ok_or_else(|| ReplayError::InvalidFrame {
                reason: format!("missing plane {index}"),
            })?;
            let stride = raw.linesize[index];
            if stride == 0 {
                return Err(ReplayError::InvalidFrame {
                    reason: format!("zero line stride for plane {index}"),
                });
            }

            let rows = (raw.height / spec.height_divisor) as usize;
            let size = stride * rows;
            if data.len() < size {
                return Err(ReplayError::InvalidFrame {
                    reason: format!(
                        "plane {index} holds {} bytes, layout requires {size}",
                        data.len()
                    ),
                });
            }

            planes.push(Bytes::copy_from_slice(&data[..size]));
            linesize.push(stride);
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            format: raw.format,
            timestamp: raw.timestamp,
            planes,
            linesize,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format of the plane data
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Host-provided timestamp in nanoseconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Owned plane buffers, one per plane in the format's layout
    pub fn planes(&self) -> &[Bytes] {
        &self.planes
    }

    /// Line stride in bytes for the given plane
    pub fn linesize(&self, plane: usize) -> usize {
        self.linesize[plane]
    }

    /// Total bytes retained across all planes
    pub fn plane_bytes(&self) -> usize {
        self.planes.iter().map(|p| p.len()).sum()
    }
}

/// Owned copy of an audio delivery, planar f32 samples per channel.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    frames: usize,
    sample_rate: u32,
    timestamp: u64,
    channels: Vec<Vec<f32>>,
}

impl AudioFrame {
    /// Deep-copy a host audio delivery into an owned frame.
    ///
    /// Copies `frames` samples from every non-null channel plane;
    /// deliveries with no samples or no channels are rejected.
    pub fn copy_from(raw: &RawAudioFrame<'_>) -> ReplayResult<Self> {
        if raw.frames == 0 {
            return Err(ReplayError::InvalidFrame {
                reason: "zero sample count".to_string(),
            });
        }

        let mut channels = Vec::new();
        for (index, data) in raw.data.iter().enumerate() {
            let Some(data) = data else { continue };
            if data.len() < raw.frames {
                return Err(ReplayError::InvalidFrame {
                    reason: format!(
                        "channel {index} holds {} samples, delivery claims {}",
                        data.len(),
                        raw.frames
                    ),
                });
            }
            channels.push(data[..raw.frames].to_vec());
        }

        if channels.is_empty() {
            return Err(ReplayError::InvalidFrame {
                reason: "no channel data".to_string(),
            });
        }

        Ok(Self {
            frames: raw.frames,
            sample_rate: raw.sample_rate,
            timestamp: raw.timestamp,
            channels,
        })
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Host-provided timestamp in nanoseconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Number of channels retained
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples for one channel
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i420_frame(width: u32, height: u32) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let luma = vec![0x10u8; (width * height) as usize];
        let chroma = vec![0x80u8; ((width / 2) * (height / 2)) as usize];
        (luma, chroma.clone(), chroma)
    }

    #[test]
    fn test_i420_plane_layout() {
        let layout = PixelFormat::I420.plane_layout();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[0], plane(1, 1, 1));
        assert_eq!(layout[1], plane(2, 2, 1));
        assert_eq!(layout[2], plane(2, 2, 1));
    }

    #[test]
    fn test_packed_formats_are_single_plane() {
        assert_eq!(PixelFormat::Yuy2.plane_count(), 1);
        assert_eq!(PixelFormat::Rgba.plane_count(), 1);
        assert_eq!(PixelFormat::Bgra.plane_count(), 1);
        assert_eq!(PixelFormat::Y800.plane_count(), 1);
        assert_eq!(PixelFormat::Nv12.plane_count(), 2);
    }

    #[test]
    fn test_video_copy_honors_subsampling() {
        let (y, u, v) = i420_frame(640, 360);
        let mut raw = RawVideoFrame::new(640, 360, PixelFormat::I420, 42);
        raw.data[0] = Some(&y);
        raw.data[1] = Some(&u);
        raw.data[2] = Some(&v);
        raw.linesize = [640, 320, 320, 0, 0, 0, 0, 0];

        let frame = VideoFrame::copy_from(&raw).unwrap();
        assert_eq!(frame.planes()[0].len(), 640 * 360);
        assert_eq!(frame.planes()[1].len(), 320 * 180);
        assert_eq!(frame.planes()[2].len(), 320 * 180);
        assert_eq!(frame.timestamp(), 42);
        assert_eq!(frame.linesize(1), 320);
    }

    #[test]
    fn test_video_copy_is_deep() {
        let (y, u, v) = i420_frame(64, 36);
        let mut raw = RawVideoFrame::new(64, 36, PixelFormat::I420, 0);
        raw.data[0] = Some(&y);
        raw.data[1] = Some(&u);
        raw.data[2] = Some(&v);
        raw.linesize = [64, 32, 32, 0, 0, 0, 0, 0];

        let frame = VideoFrame::copy_from(&raw).unwrap();
        drop(raw);
        drop((y, u, v));
        assert_eq!(frame.planes()[0][0], 0x10);
        assert_eq!(frame.planes()[1][0], 0x80);
    }

    #[test]
    fn test_zero_dimension_frame_rejected() {
        let raw = RawVideoFrame::new(0, 360, PixelFormat::I420, 0);
        assert!(matches!(
            VideoFrame::copy_from(&raw),
            Err(ReplayError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_missing_plane_rejected() {
        let y = vec![0u8; 640 * 360];
        let mut raw = RawVideoFrame::new(640, 360, PixelFormat::I420, 0);
        raw.data[0] = Some(&y);
        raw.linesize = [640, 320, 320, 0, 0, 0, 0, 0];
        assert!(matches!(
            VideoFrame::copy_from(&raw),
            Err(ReplayError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_short_plane_rejected() {
        let y = vec![0u8; 100];
        let (_, u, v) = i420_frame(640, 360);
        let mut raw = RawVideoFrame::new(640, 360, PixelFormat::I420, 0);
        raw.data[0] = Some(&y);
        raw.data[1] = Some(&u);
        raw.data[2] = Some(&v);
        raw.linesize = [640, 320, 320, 0, 0, 0, 0, 0];
        assert!(VideoFrame::copy_from(&raw).is_err());
    }

    #[test]
    fn test_audio_copy_per_channel() {
        let left = vec![0.5f32; 480];
        let right = vec![-0.5f32; 480];
        let mut raw = RawAudioFrame::new(480, 48_000, 7);
        raw.data[0] = Some(&left);
        raw.data[1] = Some(&right);

        let frame = AudioFrame::copy_from(&raw).unwrap();
        assert_eq!(frame.frames(), 480);
        assert_eq!(frame.channel_count(), 2);
        assert_eq!(frame.channel(0)[0], 0.5);
        assert_eq!(frame.channel(1)[0], -0.5);
        assert_eq!(frame.sample_rate(), 48_000);
    }

    #[test]
    fn test_empty_audio_rejected() {
        let raw = RawAudioFrame::new(0, 48_000, 0);
        assert!(AudioFrame::copy_from(&raw).is_err());

        let raw = RawAudioFrame::new(480, 48_000, 0);
        assert!(matches!(
            AudioFrame::copy_from(&raw),
            Err(ReplayError::InvalidFrame { .. })
        ));
    }
}
