//! Validation tests.
//!
//! Fixture-based tests require `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;
use std::time::Duration;

use videocompress::{
    AudioMetadata, Dimensions, MediaMetadata, MediaProbe, VideoMetadata, validate_file,
    validate_for_compression,
};

fn phone_recording() -> MediaMetadata {
    MediaMetadata {
        video: Some(VideoMetadata {
            width: 1920,
            height: 1080,
            frames_per_second: 30.0,
            frame_count: 300,
            codec: "h264".to_string(),
        }),
        audio: Some(AudioMetadata {
            sample_rate: 48_000,
            channels: 2,
            codec: "aac".to_string(),
            bit_rate: 128_000,
        }),
        duration: Duration::from_secs(10),
        format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        bit_rate: 17_000_000,
    }
}

#[test]
fn ordinary_recording_is_valid() {
    let report = validate_for_compression(&phone_recording(), Dimensions::default());
    assert!(report.is_valid());
    assert!(report.warnings.is_empty());
    assert_eq!(report.info.len(), 2);
}

#[test]
fn missing_video_is_an_error() {
    let mut metadata = phone_recording();
    metadata.video = None;
    let report = validate_for_compression(&metadata, Dimensions::default());
    assert!(!report.is_valid());
    assert!(report.to_string().contains("[ERROR] File contains no video stream"));
}

#[test]
fn upscale_is_a_warning() {
    let mut metadata = phone_recording();
    if let Some(video) = metadata.video.as_mut() {
        video.width = 320;
        video.height = 240;
    }
    let report = validate_for_compression(&metadata, Dimensions::new(480, 320));
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("upscaled"));
}

#[test]
fn silent_recording_is_info_only() {
    let mut metadata = phone_recording();
    metadata.audio = None;
    metadata.duration = Duration::ZERO;
    let report = validate_for_compression(&metadata, Dimensions::default());
    assert!(report.is_valid());
    assert!(report.info.iter().any(|line| line.contains("silent")));
    assert!(report.warnings.iter().any(|line| line.contains("duration is zero")));
}

#[test]
fn validate_fixture() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let report = validate_file(path, Dimensions::default()).expect("Failed to validate");
    assert!(report.is_valid(), "{report}");

    let metadata = MediaProbe::probe(path).expect("Failed to probe");
    let video = metadata.video.expect("Fixture has no video");
    assert_eq!((video.width, video.height), (640, 480));
    assert!(metadata.duration > Duration::from_secs(4));
    assert_eq!(metadata.audio.map(|audio| audio.channels), Some(2));
}

#[test]
fn validate_video_only_fixture() {
    let path = "tests/fixtures/sample_video_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let report = validate_file(path, Dimensions::default()).expect("Failed to validate");
    assert!(report.is_valid());
    // 320x240 source against the 480x320 default target.
    assert!(!report.warnings.is_empty());
}

#[test]
fn validate_audio_only_fixture() {
    let path = "tests/fixtures/sample_audio_only.m4a";
    if !Path::new(path).exists() {
        return;
    }

    let report = validate_file(path, Dimensions::default()).expect("Failed to validate");
    assert!(!report.is_valid());
}
