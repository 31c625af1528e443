//! Output location and file-size helpers.
//!
//! Compressed videos always land at `<storage root>/MyVideo/compress.mp4`.
//! The storage root plays the part of a phone's external storage directory
//! and is resolved from an explicit path, then from the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CompressError;

/// Directory created under the storage root to hold compressed output.
pub const OUTPUT_DIRECTORY: &str = "MyVideo";

/// File name of the compressed output.
pub const OUTPUT_FILE_NAME: &str = "compress.mp4";

/// Environment variable overriding the storage root.
pub const STORAGE_DIR_ENV: &str = "VIDEOCOMPRESS_STORAGE_DIR";

/// Android's external-storage environment variable.
pub const EXTERNAL_STORAGE_ENV: &str = "EXTERNAL_STORAGE";

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Base directory under which the output directory is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self(path.as_ref().to_path_buf())
    }

    /// Resolve the storage root.
    ///
    /// Order: `explicit`, `$VIDEOCOMPRESS_STORAGE_DIR`, `$EXTERNAL_STORAGE`,
    /// `$HOME` (or `%USERPROFILE%`), then the current directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let candidates = [STORAGE_DIR_ENV, EXTERNAL_STORAGE_ENV, "HOME", "USERPROFILE"];
        let path = explicit
            .or_else(|| {
                candidates
                    .iter()
                    .filter_map(env::var_os)
                    .find(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!("Storage root resolved to {}", path.display());
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Compute the output path, creating the output directory if needed.
    pub fn output_path(&self) -> Result<PathBuf, CompressError> {
        output_path(&self.0)
    }
}

/// Return `<root>/MyVideo/compress.mp4`, creating `<root>/MyVideo` when it
/// does not exist yet.
pub fn output_path<P: AsRef<Path>>(root: P) -> Result<PathBuf, CompressError> {
    let directory = root.as_ref().join(OUTPUT_DIRECTORY);
    if !directory.is_dir() {
        log::debug!("Creating output directory {}", directory.display());
        fs::create_dir_all(&directory)?;
    }
    Ok(directory.join(OUTPUT_FILE_NAME))
}

/// Delete `path` if it exists. Returns `true` when a file was removed.
pub fn remove_existing<P: AsRef<Path>>(path: P) -> Result<bool, CompressError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    log::debug!("Removing existing output {}", path.display());
    fs::remove_file(path)?;
    Ok(true)
}

/// Size of the file in bytes, `0` when it does not exist.
pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// Size of the file in mebibytes, `0.0` when it does not exist.
pub fn file_size_megabytes<P: AsRef<Path>>(path: P) -> f64 {
    file_size(path) as f64 / BYTES_PER_MEGABYTE
}

/// Human-readable file size: `"0 MB"` for a missing file, otherwise two
/// decimals, e.g. `"12.34 MB"`.
pub fn format_file_size<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if !path.exists() {
        return "0 MB".to_string();
    }
    format!("{:.2} MB", file_size_megabytes(path))
}
