//! Compression options.
//!
//! [`CompressOptions`] is a builder that threads progress callbacks,
//! cancellation tokens, and other operational settings through
//! [`Compressor::exec_command`](crate::Compressor::exec_command) and
//! [`CompressionSession::compress`](crate::CompressionSession::compress)
//! without polluting their signatures.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use videocompress::{CancellationToken, CompressOptions, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:?}: frame {:?}", info.operation, info.current_frame);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = CompressOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

const DEFAULT_STDERR_TAIL: usize = 20;

/// Options for a single compression run.
///
/// All fields have sensible defaults: no progress callback, no cancellation,
/// a callback on every status line, probing enabled, and the last 20 stderr
/// lines kept as the failure reason.
#[derive(Clone)]
pub struct CompressOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// Fire the progress callback every N status lines.
    pub(crate) batch_size: u64,
    /// Probe the input with libav to learn its duration.
    pub(crate) probe: bool,
    /// How many trailing stderr lines to keep for messages.
    pub(crate) stderr_tail: usize,
}

impl Debug for CompressOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CompressOptions")
            .field("has_progress", &true)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("probe", &self.probe)
            .field("stderr_tail", &self.stderr_tail)
            .finish()
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressOptions {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
            probe: true,
            stderr_tail: DEFAULT_STDERR_TAIL,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the running ffmpeg process is killed and
    /// the call returns [`CompressError::Cancelled`](crate::CompressError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Enable or disable probing the input for its duration before
    /// compressing. Without it, progress reports carry no percentage.
    #[must_use]
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Number of trailing stderr lines reported as the failure reason or
    /// success message. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_stderr_tail(mut self, lines: usize) -> Self {
        self.stderr_tail = lines.max(1);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
