//! Input probing through libav.
//!
//! [`MediaProbe`] opens the input with `ffmpeg-next`, reads its best video
//! and audio streams, and closes it again. The compressor uses the probed
//! duration to turn ffmpeg's `time=` field into a percentage.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{
    codec::context::Context as CodecContext, format::context::Input, format::stream::Stream,
    media::Type,
};

use crate::error::CompressError;
use crate::metadata::{AudioMetadata, MediaMetadata, VideoMetadata};

/// Lightweight media file probe.
///
/// # Example
///
/// ```no_run
/// use videocompress::MediaProbe;
///
/// let metadata = MediaProbe::probe("recording.mp4")?;
/// if let Some(video) = &metadata.video {
///     println!("Video: {}x{} @ {} fps", video.width, video.height, video.frames_per_second);
/// }
/// # Ok::<(), videocompress::CompressError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a media file and return its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::FileOpen`] if libav cannot be initialised,
    /// the file cannot be opened, or a stream's codec parameters are
    /// unreadable.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaMetadata, CompressError> {
        let path = path.as_ref();
        log::debug!("Probing media file: {}", path.display());

        let open_error = |reason: String| CompressError::FileOpen {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let video = match input_context.streams().best(Type::Video) {
            Some(stream) => Some(video_metadata(&stream, duration).map_err(open_error)?),
            None => None,
        };
        let audio = match input_context.streams().best(Type::Audio) {
            Some(stream) => Some(audio_metadata(&stream).map_err(open_error)?),
            None => None,
        };

        Ok(MediaMetadata {
            video,
            audio,
            duration,
            format: input_context.format().name().to_string(),
            bit_rate: container_bit_rate(&input_context),
        })
    }

    /// Probe only the duration. Returns `None` instead of an error so that
    /// callers can fall back to progress without percentages.
    pub fn duration<P: AsRef<Path>>(path: P) -> Option<Duration> {
        match Self::probe(path.as_ref()) {
            Ok(metadata) if !metadata.duration.is_zero() => Some(metadata.duration),
            Ok(_) => None,
            Err(error) => {
                log::warn!("Could not probe {}: {error}", path.as_ref().display());
                None
            }
        }
    }
}

fn container_bit_rate(input_context: &Input) -> u64 {
    input_context.bit_rate().max(0) as u64
}

fn video_metadata(stream: &Stream, duration: Duration) -> Result<VideoMetadata, String> {
    let index = stream.index();
    let decoder = CodecContext::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().video())
        .map_err(|error| format!("Failed to read video stream {index}: {error}"))?;

    let rate = stream.avg_frame_rate();
    let rate = if rate.denominator() != 0 && rate.numerator() != 0 {
        rate
    } else {
        stream.rate()
    };
    let frames_per_second = if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    };

    let frame_count = if stream.frames() > 0 {
        stream.frames() as u64
    } else if frames_per_second > 0.0 {
        (duration.as_secs_f64() * frames_per_second) as u64
    } else {
        0
    };

    Ok(VideoMetadata {
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        frame_count,
        codec: decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

fn audio_metadata(stream: &Stream) -> Result<AudioMetadata, String> {
    let index = stream.index();
    let decoder = CodecContext::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().audio())
        .map_err(|error| format!("Failed to read audio stream {index}: {error}"))?;

    Ok(AudioMetadata {
        sample_rate: decoder.rate(),
        channels: decoder.channels(),
        codec: decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        bit_rate: decoder.bit_rate() as u64,
    })
}
