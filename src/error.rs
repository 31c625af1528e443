//! Error types for the `videocompress` crate.
//!
//! [`CompressError`] is returned by every fallible operation: loading the
//! ffmpeg binary, building a command, probing the input and running the
//! compression itself. Variants carry the free-text reason reported by
//! ffmpeg where one exists.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `videocompress` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompressError {
    /// The ffmpeg binary could not be located or failed verification.
    #[error("Failed to load ffmpeg binary: {reason}")]
    LoadFailed {
        /// Why loading failed.
        reason: String,
    },

    /// No input video is set, or the input path does not exist.
    #[error("No input video: record or select a video first")]
    NoInputVideo,

    /// The command string was empty or blank.
    #[error("Command is empty: please enter a command")]
    EmptyCommand,

    /// An encoding parameter was outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A `WxH` size string could not be parsed or had a zero side.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// ffmpeg ran but exited unsuccessfully.
    #[error("Compression failed (exit code {code:?}): {reason}")]
    ExecutionFailed {
        /// Process exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Tail of ffmpeg's stderr.
        reason: String,
    },

    /// The input file could not be opened for probing.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was probed.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// An error originating from the libav libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for CompressError {
    fn from(error: FfmpegError) -> Self {
        CompressError::FfmpegError(error.to_string())
    }
}
