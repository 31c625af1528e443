//! The compression session.
//!
//! [`CompressionSession`] holds what a recording screen holds: the path of
//! the most recently captured video, the fixed output path, and the command
//! template derived from both. Setting a new input rebuilds the template;
//! [`compress`](CompressionSession::compress) clears the previous output and
//! hands the template to a [`Compressor`].
//!
//! # Example
//!
//! ```no_run
//! use videocompress::{
//!     CompressError, CompressOptions, CompressionSession, Compressor, StorageRoot,
//! };
//!
//! let compressor = Compressor::load()?;
//! let mut session = CompressionSession::with_storage(&StorageRoot::resolve(None))?;
//! session.set_input("/sdcard/DCIM/Camera/VID_0001.mp4");
//!
//! let report = session.compress(&compressor, &CompressOptions::new())?;
//! println!("{} -> {} bytes", report.input_size, report.output_size);
//! # Ok::<(), CompressError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::{CommandLine, CompressionCommand, Dimensions, Preset};
use crate::compressor::{Compressor, ExecOutcome};
use crate::configuration::CompressOptions;
use crate::error::CompressError;
use crate::storage::{self, StorageRoot};

/// Summary of a successful compression.
#[derive(Debug, Clone)]
pub struct CompressionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Input size in bytes.
    pub input_size: u64,
    /// Output size in bytes, `0` if ffmpeg wrote nothing at `output`.
    pub output_size: u64,
    pub elapsed: Duration,
    /// ffmpeg's closing summary lines.
    pub message: String,
}

impl CompressionReport {
    /// Output size divided by input size, `None` for an empty input.
    pub fn ratio(&self) -> Option<f64> {
        (self.input_size > 0).then(|| self.output_size as f64 / self.input_size as f64)
    }

    /// Bytes saved, zero when the output grew.
    pub fn saved_bytes(&self) -> u64 {
        self.input_size.saturating_sub(self.output_size)
    }
}

/// Current input/output paths and the command built from them.
#[derive(Debug, Clone)]
pub struct CompressionSession {
    input: Option<PathBuf>,
    output: PathBuf,
    command: CompressionCommand,
}

impl CompressionSession {
    /// Create a session writing to `output`. No input is set yet.
    pub fn new<P: AsRef<Path>>(output: P) -> Self {
        let output = output.as_ref().to_path_buf();
        Self {
            input: None,
            command: CompressionCommand::new("", &output),
            output,
        }
    }

    /// Create a session writing to `<root>/MyVideo/compress.mp4`.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::IoError`] if the output directory cannot be
    /// created.
    pub fn with_storage(root: &StorageRoot) -> Result<Self, CompressError> {
        Ok(Self::new(root.output_path()?))
    }

    /// Set the captured video and rebuild the command. An empty path
    /// clears the input.
    pub fn set_input<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        self.input = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        log::debug!("Current input video: {:?}", self.input);
        self.refresh_command();
    }

    pub fn clear_input(&mut self) {
        self.input = None;
        self.refresh_command();
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The command that [`compress`](CompressionSession::compress) will run.
    pub fn command(&self) -> &CompressionCommand {
        &self.command
    }

    pub fn set_preset(&mut self, preset: Preset) {
        self.command = self.command.clone().with_preset(preset);
    }

    /// # Errors
    ///
    /// Returns [`CompressError::InvalidParameter`] for values above 51. The
    /// previous value is kept.
    pub fn set_crf(&mut self, crf: u8) -> Result<(), CompressError> {
        self.command = self.command.clone().with_crf(crf)?;
        Ok(())
    }

    pub fn set_size(&mut self, size: Dimensions) {
        self.command = self.command.clone().with_size(size);
    }

    fn refresh_command(&mut self) {
        let input = self.input.clone().unwrap_or_default();
        self.command = self
            .command
            .clone()
            .with_input(input)
            .with_output(&self.output);
    }

    /// Compress the current input with the session's command.
    ///
    /// A pre-existing output file is deleted first.
    ///
    /// # Errors
    ///
    /// - [`CompressError::NoInputVideo`] if no input is set or it does not
    ///   exist. ffmpeg is not started in that case.
    /// - Anything [`Compressor::compress`] returns.
    pub fn compress(
        &self,
        compressor: &Compressor,
        options: &CompressOptions,
    ) -> Result<CompressionReport, CompressError> {
        let input = self.checked_input()?;
        storage::remove_existing(&self.output)?;
        let outcome = compressor.compress(&self.command, options);
        self.conclude(input, &self.output, outcome)
    }

    /// Run a free-text command in place of the template.
    ///
    /// The same checks apply: the command must not be blank and an input
    /// must be set. The command's output (its last argument) is cleared
    /// first and reported on; a command with no recognisable output falls
    /// back to the session's output.
    ///
    /// # Errors
    ///
    /// - [`CompressError::EmptyCommand`] for a blank command.
    /// - [`CompressError::NoInputVideo`] if no input is set.
    /// - [`CompressError::InvalidParameter`] if the command writes to its
    ///   own input.
    /// - Anything [`Compressor::exec_command`] returns.
    pub fn exec_custom(
        &self,
        compressor: &Compressor,
        command: &str,
        options: &CompressOptions,
    ) -> Result<CompressionReport, CompressError> {
        let command = CommandLine::parse(command)?;
        let input = self.checked_input()?;
        let output = command.output().map_or(self.output.as_path(), Path::new);
        if output == input || command.input().map(Path::new) == Some(output) {
            return Err(CompressError::InvalidParameter(format!(
                "command writes over its input {}",
                output.display()
            )));
        }

        storage::remove_existing(output)?;
        let outcome = compressor.exec_command(&command, options);
        self.conclude(input, output, outcome)
    }

    fn checked_input(&self) -> Result<&Path, CompressError> {
        match self.input.as_deref() {
            Some(path) if path.exists() => Ok(path),
            Some(path) => {
                log::info!("Input video {} does not exist", path.display());
                Err(CompressError::NoInputVideo)
            }
            None => {
                log::info!("No input video set");
                Err(CompressError::NoInputVideo)
            }
        }
    }

    fn conclude(
        &self,
        input: &Path,
        output: &Path,
        outcome: Result<ExecOutcome, CompressError>,
    ) -> Result<CompressionReport, CompressError> {
        match outcome {
            Ok(outcome) => {
                log::info!("success {}", outcome.message);
                log::debug!(
                    "input {} ({}) output {} ({})",
                    input.display(),
                    storage::format_file_size(input),
                    output.display(),
                    storage::format_file_size(output),
                );
                Ok(CompressionReport {
                    input: input.to_path_buf(),
                    output: output.to_path_buf(),
                    input_size: storage::file_size(input),
                    output_size: storage::file_size(output),
                    elapsed: outcome.elapsed,
                    message: outcome.message,
                })
            }
            Err(error) => {
                log::info!("fail {error}");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_input() {
        let session = CompressionSession::new("/tmp/MyVideo/compress.mp4");
        assert!(session.input().is_none());
        assert!(session.command().to_string().ends_with("/tmp/MyVideo/compress.mp4"));
    }

    #[test]
    fn set_input_refreshes_command() {
        let mut session = CompressionSession::new("out.mp4");
        session.set_input("clip.mp4");
        assert_eq!(session.input(), Some(Path::new("clip.mp4")));
        assert!(session.command().to_string().starts_with("-y -i clip.mp4 "));

        session.set_input("");
        assert!(session.input().is_none());
    }

    #[test]
    fn parameters_survive_input_change() {
        let mut session = CompressionSession::new("out.mp4");
        session.set_preset(Preset::Medium);
        session.set_size(Dimensions::new(640, 480));
        session.set_crf(20).unwrap();
        session.set_input("next.mp4");

        let rendered = session.command().to_string();
        assert!(rendered.contains("-preset medium -crf 20"));
        assert!(rendered.contains("-s 640x480"));
        assert!(rendered.contains("-i next.mp4"));
    }

    #[test]
    fn invalid_crf_keeps_previous() {
        let mut session = CompressionSession::new("out.mp4");
        assert!(session.set_crf(60).is_err());
        assert_eq!(session.command().crf(), 24);
    }

    #[test]
    fn report_ratio() {
        let report = CompressionReport {
            input: PathBuf::from("a"),
            output: PathBuf::from("b"),
            input_size: 1000,
            output_size: 250,
            elapsed: Duration::ZERO,
            message: String::new(),
        };
        assert_eq!(report.ratio(), Some(0.25));
        assert_eq!(report.saved_bytes(), 750);
    }
}
