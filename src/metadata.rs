//! Media metadata types.
//!
//! Produced by [`MediaProbe::probe`](crate::MediaProbe::probe) for an input
//! video before it is compressed.

use std::time::Duration;

/// Metadata for an input file.
///
/// # Example
///
/// ```no_run
/// use videocompress::MediaProbe;
///
/// let metadata = MediaProbe::probe("recording.mp4").unwrap();
/// println!("Duration: {:?}", metadata.duration);
/// println!("Format: {}", metadata.format);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Best video stream, if present.
    pub video: Option<VideoMetadata>,
    /// Best audio stream, if present.
    pub audio: Option<AudioMetadata>,
    /// Total duration of the media file.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Container bit rate in bits per second, `0` when unknown.
    pub bit_rate: u64,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate recordings).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"hevc"`).
    pub codec: String,
}

/// Metadata for an audio stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct AudioMetadata {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    pub channels: u16,
    /// Codec name (e.g. `"aac"`, `"amr_nb"`).
    pub codec: String,
    /// Bit rate in bits per second.
    pub bit_rate: u64,
}
