//! Progress reporting and cancellation support.
//!
//! ffmpeg writes a status line to stderr while it encodes:
//!
//! ```text
//! frame=  120 fps= 60 q=28.0 size=     256kB time=00:00:04.00 bitrate= 524.3kbits/s speed=2.01x
//! ```
//!
//! [`EncoderStatus::parse`] reads those lines, and the compressor turns each
//! one into a [`ProgressInfo`] delivered to a [`ProgressCallback`].
//! [`CancellationToken`] lets another thread stop a running compression.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use videocompress::{
//!     CompressError, CompressOptions, CompressionSession, Compressor,
//!     ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("compressing: {pct:.1}%");
//!         }
//!     }
//! }
//!
//! let compressor = Compressor::load()?;
//! let mut session = CompressionSession::new("compress.mp4");
//! session.set_input("recording.mp4");
//! let options = CompressOptions::new().with_progress(Arc::new(PrintProgress));
//! session.compress(&compressor, &options)?;
//! # Ok::<(), CompressError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Running the template compression command.
    Compression,
    /// Running a free-text command.
    CustomCommand,
}

/// One parsed ffmpeg status line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderStatus {
    /// Frames encoded so far.
    pub frame: Option<u64>,
    /// Current encoding rate in frames per second.
    pub fps: Option<f64>,
    /// Output size so far, as printed (e.g. `"256kB"`).
    pub size: Option<String>,
    /// Output timestamp reached.
    pub time: Option<Duration>,
    /// Current output bitrate, as printed (e.g. `"524.3kbits/s"`).
    pub bitrate: Option<String>,
    /// Encoding speed relative to real time.
    pub speed: Option<f64>,
}

impl EncoderStatus {
    /// Parse a status line. Returns `None` for lines that carry neither a
    /// `frame=` nor a `time=` field.
    pub fn parse(line: &str) -> Option<Self> {
        if !line.contains("frame=") && !line.contains("time=") {
            return None;
        }

        // "frame=  120" -> "frame=120" so that split_whitespace keeps pairs.
        let mut normalized = String::with_capacity(line.len());
        let mut after_equals = false;
        for character in line.chars() {
            if after_equals && character == ' ' {
                continue;
            }
            after_equals = character == '=';
            normalized.push(character);
        }

        let mut status = EncoderStatus::default();
        for pair in normalized.split_whitespace() {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "frame" => status.frame = value.parse().ok(),
                "fps" => status.fps = value.parse().ok(),
                "size" | "Lsize" => status.size = Some(value.to_string()),
                "time" => status.time = parse_clock(value),
                "bitrate" => status.bitrate = Some(value.to_string()),
                "speed" => status.speed = value.trim_end_matches('x').parse().ok(),
                _ => {}
            }
        }

        if status.frame.is_none() && status.time.is_none() {
            return None;
        }
        Some(status)
    }
}

/// Parse an ffmpeg clock value `HH:MM:SS.ss`. `N/A` and negative clocks
/// yield `None`.
pub fn parse_clock(value: &str) -> Option<Duration> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60) + Duration::from_secs_f64(seconds))
}

/// A snapshot of compression progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many status updates have been received so far.
    pub current: u64,
    /// Input duration, if it was probed.
    pub total: Option<Duration>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since ffmpeg was started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// The frame number ffmpeg last reported.
    pub current_frame: Option<u64>,
    /// The output timestamp ffmpeg last reported.
    pub current_timestamp: Option<Duration>,
    /// Encoding speed relative to real time.
    pub speed: Option<f64>,
}

/// Trait for receiving progress updates during compression.
///
/// Implementations must be [`Send`] and [`Sync`]; the async API invokes
/// callbacks from a blocking worker thread.
///
/// Progress callbacks are **infallible**. Use [`CancellationToken`] to stop
/// a compression.
pub trait ProgressCallback: Send + Sync {
    /// Called for every batch of status lines ffmpeg prints.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and call [`cancel`](CancellationToken::cancel) from any
/// thread. The compressor checks it between ffmpeg output lines and kills
/// the child process once it is set.
///
/// # Example
///
/// ```
/// use videocompress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing across status lines and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<Duration>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    updates_since_last_report: u64,
    last_status: Option<EncoderStatus>,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<Duration>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total: total.filter(|duration| !duration.is_zero()),
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            updates_since_last_report: 0,
            last_status: None,
        }
    }

    /// Record one status line and fire the callback if the batch threshold
    /// is reached.
    pub(crate) fn advance(&mut self, status: EncoderStatus) {
        self.current += 1;
        self.updates_since_last_report += 1;
        self.last_status = Some(status);

        if self.updates_since_last_report >= self.batch_size {
            self.report();
            self.updates_since_last_report = 0;
        }
    }

    pub(crate) fn updates(&self) -> u64 {
        self.current
    }

    /// Emit a final report if anything was recorded since the last one.
    pub(crate) fn finish(&mut self) {
        if self.updates_since_last_report > 0 {
            self.report();
            self.updates_since_last_report = 0;
        }
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();
        let status = self.last_status.clone().unwrap_or_default();

        let fraction = match (self.total, status.time) {
            (Some(total), Some(time)) => Some((time.as_secs_f64() / total.as_secs_f64()).min(1.0)),
            _ => None,
        };

        let estimated_remaining = fraction.filter(|&f| f > 0.0).map(|f| {
            let projected = elapsed.as_secs_f64() / f;
            Duration::from_secs_f64((projected - elapsed.as_secs_f64()).max(0.0))
        });

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage: fraction.map(|f| (f * 100.0) as f32),
            elapsed,
            estimated_remaining,
            current_frame: status.frame,
            current_timestamp: status.time,
            speed: status.speed,
        };

        self.callback.on_progress(&info);
    }
}
