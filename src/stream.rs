//! Async compression.
//!
//! [`CompressFuture`] runs a compression on a Tokio blocking thread, so the
//! async runtime is not tied up while ffmpeg works. Progress callbacks are
//! invoked from that blocking thread.
//!
//! # Example
//!
//! ```no_run
//! use videocompress::{CompressError, CompressOptions, CompressionSession, Compressor};
//!
//! # async fn example() -> Result<(), CompressError> {
//! let compressor = Compressor::load()?;
//! let mut session = CompressionSession::new("compress.mp4");
//! session.set_input("recording.mp4");
//!
//! let report = session
//!     .compress_async(&compressor, CompressOptions::new())
//!     .await?;
//! println!("saved {} bytes", report.saved_bytes());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::compressor::Compressor;
use crate::configuration::CompressOptions;
use crate::error::CompressError;
use crate::session::{CompressionReport, CompressionSession};

/// A future resolving to the result of a background compression.
///
/// If the blocking task panics or is aborted, the future resolves to
/// [`CompressError::Cancelled`].
pub struct CompressFuture {
    handle: JoinHandle<Result<CompressionReport, CompressError>>,
}

impl Future for CompressFuture {
    type Output = Result<CompressionReport, CompressError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(CompressError::Cancelled)))
    }
}

impl CompressionSession {
    /// Compress on a blocking thread.
    ///
    /// The session and compressor are cloned into the task. Must be called
    /// from within a Tokio runtime.
    pub fn compress_async(
        &self,
        compressor: &Compressor,
        options: CompressOptions,
    ) -> CompressFuture {
        let session = self.clone();
        let compressor = compressor.clone();
        let handle =
            tokio::task::spawn_blocking(move || session.compress(&compressor, &options));
        CompressFuture { handle }
    }
}
