//! # videocompress
//!
//! Compress recorded videos by handing a fixed x264/AAC command to an
//! external `ffmpeg` binary.
//!
//! `videocompress` does no encoding itself. It builds the command template,
//! keeps the output location stable (`<storage>/MyVideo/compress.mp4`),
//! clears the previous output, runs ffmpeg, and reports progress and the
//! outcome. Inputs are probed with
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) so progress can be
//! given as a percentage.
//!
//! ## Quick Start
//!
//! ```no_run
//! use videocompress::{CompressOptions, CompressionSession, Compressor, StorageRoot};
//!
//! let compressor = Compressor::load().unwrap();
//! let mut session = CompressionSession::with_storage(&StorageRoot::resolve(None)).unwrap();
//! session.set_input("VID_20240101_120000.mp4");
//!
//! let report = session.compress(&compressor, &CompressOptions::new()).unwrap();
//! println!("{} -> {}", report.input.display(), report.output.display());
//! ```
//!
//! ### Inspect the command
//!
//! ```
//! use videocompress::CompressionCommand;
//!
//! let command = CompressionCommand::new("in.mp4", "out.mp4");
//! assert_eq!(
//!     command.to_string(),
//!     "-y -i in.mp4 -strict -2 -vcodec libx264 -preset ultrafast -crf 24 -acodec aac \
//!      -ar 44100 -ac 2 -b:a 96k -s 480x320 -aspect 16:9 out.mp4",
//! );
//! ```
//!
//! ## Features
//!
//! - **Command template** with x264 preset, CRF, size and audio settings
//! - **Binary discovery** via `$VIDEOCOMPRESS_FFMPEG`, a bundled copy, or `PATH`
//! - **Progress & cancellation** parsed from ffmpeg's status lines
//! - **Probing and validation** of the input before compressing
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `CompressFuture` runs compression on a Tokio blocking thread |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! An `ffmpeg` executable built with `libx264` is needed at run time, and
//! the FFmpeg development libraries at build time (for probing).

pub mod command;
pub mod compressor;
pub mod configuration;
pub mod error;
pub mod metadata;
pub mod probe;
pub mod progress;
pub mod session;
pub mod storage;
#[cfg(feature = "async")]
pub mod stream;
pub mod validation;

pub use command::{CommandLine, CompressionCommand, Dimensions, MAX_CRF, Preset};
pub use compressor::{Compressor, ExecOutcome, FFMPEG_ENV};
pub use configuration::CompressOptions;
pub use error::CompressError;
pub use metadata::{AudioMetadata, MediaMetadata, VideoMetadata};
pub use probe::MediaProbe;
pub use progress::{
    CancellationToken, EncoderStatus, OperationType, ProgressCallback, ProgressInfo,
};
pub use session::{CompressionReport, CompressionSession};
pub use storage::StorageRoot;
#[cfg(feature = "async")]
pub use stream::CompressFuture;
pub use validation::{ValidationReport, validate_file, validate_for_compression};
