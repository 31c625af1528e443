//! CompressOptions, command template, and storage layout tests.

use std::path::Path;

use videocompress::{
    CancellationToken, CompressOptions, CompressionCommand, CompressionSession, Dimensions,
    Preset, StorageRoot,
};

// ── CompressOptions builder ──────────────────────────────────────

#[test]
fn options_defaults() {
    let options = CompressOptions::new();
    let debug = format!("{options:?}");
    assert!(debug.contains("CompressOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 1"));
    assert!(debug.contains("probe: true"));
    assert!(debug.contains("stderr_tail: 20"));
}

#[test]
fn options_with_cancellation() {
    let options = CompressOptions::new().with_cancellation(CancellationToken::new());
    assert!(format!("{options:?}").contains("has_cancellation: true"));
}

#[test]
fn options_clamp_zero_values() {
    let options = CompressOptions::new().with_batch_size(0).with_stderr_tail(0);
    let debug = format!("{options:?}");
    assert!(debug.contains("batch_size: 1"));
    assert!(debug.contains("stderr_tail: 1"));
}

// ── Command template ─────────────────────────────────────────────

#[test]
fn template_matches_fixed_command() {
    let command = CompressionCommand::new(
        "/storage/emulated/0/DCIM/Camera/VID_1.mp4",
        "/storage/emulated/0/MyVideo/compress.mp4",
    );
    let args = command.to_args();
    assert_eq!(
        args,
        [
            "-y", "-i", "/storage/emulated/0/DCIM/Camera/VID_1.mp4", "-strict", "-2", "-vcodec",
            "libx264", "-preset", "ultrafast", "-crf", "24", "-acodec", "aac", "-ar", "44100",
            "-ac", "2", "-b:a", "96k", "-s", "480x320", "-aspect", "16:9",
            "/storage/emulated/0/MyVideo/compress.mp4",
        ]
    );
}

#[test]
fn every_preset_round_trips_through_its_name() {
    for preset in Preset::ALL {
        assert_eq!(preset.as_str().parse::<Preset>().unwrap(), preset);
    }
    assert_eq!(Preset::default(), Preset::Ultrafast);
}

#[test]
fn default_size() {
    assert_eq!(Dimensions::default().to_string(), "480x320");
}

// ── Storage layout ───────────────────────────────────────────────

#[test]
fn output_path_under_storage_root() {
    let root = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(root.path());
    let output = storage.output_path().unwrap();

    assert_eq!(output, root.path().join("MyVideo").join("compress.mp4"));
    assert!(output.parent().unwrap().is_dir());
    assert!(!output.exists());
}

#[test]
fn session_from_storage() {
    let root = tempfile::tempdir().unwrap();
    let session = CompressionSession::with_storage(&StorageRoot::new(root.path())).unwrap();
    assert!(session.output().ends_with(Path::new("MyVideo/compress.mp4")));
    assert!(session.command().to_string().ends_with("compress.mp4"));
}

#[test]
fn output_path_with_existing_directory() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("MyVideo")).unwrap();
    let output = videocompress::storage::output_path(root.path()).unwrap();
    assert!(output.ends_with("MyVideo/compress.mp4"));
}
