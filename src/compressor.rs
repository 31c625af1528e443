//! The external ffmpeg binary.
//!
//! [`Compressor`] locates an `ffmpeg` executable, checks that it really is
//! ffmpeg, and runs commands against it. All encoding work happens inside
//! that child process; this module only feeds it arguments, watches its
//! stderr for status lines, and maps the exit status to a result.
//!
//! # Example
//!
//! ```no_run
//! use videocompress::{CommandLine, CompressOptions, Compressor, CompressError};
//!
//! let compressor = Compressor::load()?;
//! let command = CommandLine::parse("-y -i in.mp4 -s 480x320 out.mp4")?;
//! let outcome = compressor.exec_command(&command, &CompressOptions::new())?;
//! println!("done in {:?}", outcome.elapsed);
//! # Ok::<(), CompressError>(())
//! ```

use std::collections::VecDeque;
use std::env;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::command::{CommandLine, CompressionCommand};
use crate::configuration::CompressOptions;
use crate::error::CompressError;
use crate::probe::MediaProbe;
use crate::progress::{EncoderStatus, OperationType, ProgressTracker};

/// Environment variable naming the ffmpeg binary to use.
pub const FFMPEG_ENV: &str = "VIDEOCOMPRESS_FFMPEG";

/// How often the cancellation token is checked while ffmpeg is quiet.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a successful ffmpeg run.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    /// Trailing non-status lines ffmpeg printed (its final summary).
    pub message: String,
    /// Wall-clock time the process ran for.
    pub elapsed: Duration,
    /// Number of status lines received.
    pub status_updates: u64,
}

/// Handle to a verified ffmpeg binary.
#[derive(Debug, Clone)]
pub struct Compressor {
    binary: PathBuf,
    version: String,
}

impl Compressor {
    /// Locate and verify ffmpeg using the default search order.
    ///
    /// See [`load_from`](Compressor::load_from).
    pub fn load() -> Result<Self, CompressError> {
        Self::load_from(None)
    }

    /// Locate and verify ffmpeg.
    ///
    /// Search order: `explicit`, `$VIDEOCOMPRESS_FFMPEG`, an `ffmpeg` next to
    /// the running executable, then `PATH`. The binary must answer
    /// `-version` with output mentioning ffmpeg.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::LoadFailed`] if no binary is found or the
    /// one found fails verification.
    pub fn load_from(explicit: Option<PathBuf>) -> Result<Self, CompressError> {
        let result = locate_binary(explicit).and_then(|binary| {
            let version = verify_binary(&binary)?;
            Ok(Self { binary, version })
        });

        match &result {
            Ok(compressor) => log::debug!(
                "load library succeed: {} ({})",
                compressor.binary.display(),
                compressor.version
            ),
            Err(error) => log::info!("load library fail: {error}"),
        }
        result
    }

    /// Path of the binary in use.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// First line of `ffmpeg -version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Run a compression command template.
    ///
    /// # Errors
    ///
    /// - [`CompressError::ExecutionFailed`] if ffmpeg exits unsuccessfully
    ///   or cannot be started.
    /// - [`CompressError::Cancelled`] if the options' token is cancelled.
    pub fn compress(
        &self,
        command: &CompressionCommand,
        options: &CompressOptions,
    ) -> Result<ExecOutcome, CompressError> {
        let total = probe_total(Some(command.input()), options);
        self.run(&command.to_args(), OperationType::Compression, total, options)
    }

    /// Run a free-text command.
    ///
    /// When probing is enabled and the command has an `-i` argument, that
    /// input is probed so progress can carry percentages.
    ///
    /// # Errors
    ///
    /// Same as [`compress`](Compressor::compress).
    pub fn exec_command(
        &self,
        command: &CommandLine,
        options: &CompressOptions,
    ) -> Result<ExecOutcome, CompressError> {
        let total = probe_total(command.input().map(Path::new), options);
        self.run(command.args(), OperationType::CustomCommand, total, options)
    }

    fn run<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        operation: OperationType,
        total: Option<Duration>,
        options: &CompressOptions,
    ) -> Result<ExecOutcome, CompressError> {
        if log::log_enabled!(log::Level::Debug) {
            let rendered: Vec<_> = args.iter().map(|arg| arg.as_ref().to_string_lossy()).collect();
            log::debug!("Running {} {}", self.binary.display(), rendered.join(" "));
        }
        let start_time = Instant::now();

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| CompressError::ExecutionFailed {
                code: None,
                reason: format!("failed to start {}: {error}", self.binary.display()),
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CompressError::ExecutionFailed {
                code: None,
                reason: "ffmpeg stderr was not captured".to_string(),
            })?;

        let (sender, receiver) = mpsc::channel();
        let reader = thread::spawn(move || forward_lines(stderr, sender));

        let mut tracker =
            ProgressTracker::new(options.progress.clone(), operation, total, options.batch_size);
        let mut tail: VecDeque<String> = VecDeque::with_capacity(options.stderr_tail);

        loop {
            if options.is_cancelled() {
                log::info!("Cancelling ffmpeg (pid {})", child.id());
                terminate(&mut child);
                return Err(CompressError::Cancelled);
            }

            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match EncoderStatus::parse(&line) {
                    Some(status) => tracker.advance(status),
                    None => {
                        log::trace!("ffmpeg: {line}");
                        if tail.len() == options.stderr_tail {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                },
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if reader.join().is_err() {
            log::warn!("ffmpeg stderr reader panicked");
        }
        tracker.finish();

        // stderr is closed but the process may still be running.
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if options.is_cancelled() {
                log::info!("Cancelling ffmpeg (pid {})", child.id());
                terminate(&mut child);
                return Err(CompressError::Cancelled);
            }
            thread::sleep(POLL_INTERVAL);
        };
        let message = Vec::from(tail).join("\n");
        let elapsed = start_time.elapsed();

        if status.success() {
            log::debug!("ffmpeg finished in {elapsed:?}");
            Ok(ExecOutcome {
                message,
                elapsed,
                status_updates: tracker.updates(),
            })
        } else {
            let reason = if message.is_empty() {
                format!("ffmpeg exited with {status}")
            } else {
                message
            };
            Err(CompressError::ExecutionFailed {
                code: status.code(),
                reason,
            })
        }
    }
}

fn probe_total(input: Option<&Path>, options: &CompressOptions) -> Option<Duration> {
    if !options.probe {
        return None;
    }
    input
        .filter(|path| path.is_file())
        .and_then(MediaProbe::duration)
}

fn locate_binary(explicit: Option<PathBuf>) -> Result<PathBuf, CompressError> {
    let configured = explicit.or_else(|| {
        env::var_os(FFMPEG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    });

    if let Some(path) = configured {
        return which::which(&path).map_err(|error| CompressError::LoadFailed {
            reason: format!("{} is not an executable: {error}", path.display()),
        });
    }

    let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
    let bundled = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(name)))
        .filter(|path| path.is_file());
    if let Some(path) = bundled {
        return Ok(path);
    }

    which::which("ffmpeg").map_err(|error| CompressError::LoadFailed {
        reason: format!("ffmpeg not found on PATH: {error}"),
    })
}

fn verify_binary(binary: &Path) -> Result<String, CompressError> {
    let output = Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|error| CompressError::LoadFailed {
            reason: format!("failed to run {}: {error}", binary.display()),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or_default().trim().to_string();
    if !output.status.success() || !first_line.to_ascii_lowercase().contains("ffmpeg") {
        return Err(CompressError::LoadFailed {
            reason: format!("{} does not look like ffmpeg", binary.display()),
        });
    }
    Ok(first_line)
}

/// Split ffmpeg's stderr on both `\r` (status lines) and `\n`.
fn forward_lines<R: Read>(stream: R, sender: Sender<String>) {
    let reader = BufReader::new(stream);
    for segment in reader.split(b'\r') {
        let Ok(segment) = segment else {
            return;
        };
        for raw in segment.split(|&byte| byte == b'\n') {
            let line = String::from_utf8_lossy(raw).trim().to_string();
            if line.is_empty() {
                continue;
            }
            if sender.send(line).is_err() {
                return;
            }
        }
    }
}

fn terminate(child: &mut Child) {
    if let Err(error) = child.kill() {
        log::warn!("Failed to kill ffmpeg: {error}");
    }
    let _ = child.wait();
}
