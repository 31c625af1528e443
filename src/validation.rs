//! Pre-flight checks on an input video.
//!
//! [`validate_for_compression`] looks at probed metadata and reports what
//! would go wrong, or look odd, when compressing it to a target size.
//!
//! # Example
//!
//! ```no_run
//! use videocompress::{Dimensions, validate_file};
//!
//! let report = validate_file("recording.mp4", Dimensions::new(480, 320))?;
//! if !report.is_valid() {
//!     print!("{report}");
//! }
//! # Ok::<(), videocompress::CompressError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::Duration;

use crate::command::Dimensions;
use crate::error::CompressError;
use crate::metadata::MediaMetadata;
use crate::probe::MediaProbe;

/// Findings for one input file.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that still allow compression.
    pub warnings: Vec<String>,
    /// Issues that will make compression fail.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check metadata against a target output size.
pub fn validate_for_compression(metadata: &MediaMetadata, target: Dimensions) -> ValidationReport {
    let mut report = ValidationReport::default();

    match &metadata.video {
        None => report
            .errors
            .push("File contains no video stream".to_string()),
        Some(video) => {
            if video.width == 0 || video.height == 0 {
                report.errors.push(format!(
                    "Invalid video dimensions: {}x{}",
                    video.width, video.height,
                ));
            } else if target.width > video.width || target.height > video.height {
                report.warnings.push(format!(
                    "Target size {target} is larger than the source {}x{}; output will be upscaled",
                    video.width, video.height,
                ));
            }

            report.info.push(format!(
                "Video: {} {}x{} @ {:.2} fps, ~{} frames",
                video.codec, video.width, video.height, video.frames_per_second, video.frame_count,
            ));
        }
    }

    match &metadata.audio {
        None => report
            .info
            .push("No audio stream; output will be silent".to_string()),
        Some(audio) => report.info.push(format!(
            "Audio: {} {}Hz {}ch",
            audio.codec, audio.sample_rate, audio.channels,
        )),
    }

    if metadata.duration == Duration::ZERO {
        report
            .warnings
            .push("Media duration is zero; progress percentages will be unavailable".to_string());
    }

    report
}

/// Probe `path` and validate it against `target`.
///
/// # Errors
///
/// Returns [`CompressError::FileOpen`] if the file cannot be probed.
pub fn validate_file<P: AsRef<Path>>(
    path: P,
    target: Dimensions,
) -> Result<ValidationReport, CompressError> {
    let metadata = MediaProbe::probe(path)?;
    Ok(validate_for_compression(&metadata, target))
}
