//! Shared helpers: a fake `ffmpeg` shell script standing in for the real
//! binary, so the execution paths can be tested without FFmpeg installed.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Writes two status lines, creates the output (last argument) and exits 0.
/// Exits 3 if the output already existed when it was started.
pub const SUCCEEDS: &str = r#"
if [ -e "$last" ]; then
  echo "output already exists: $last" >&2
  exit 3
fi
printf 'frame=   10 fps=0.0 q=28.0 size=       1kB time=00:00:01.00 bitrate=   8.0kbits/s speed=2.00x\r' >&2
printf 'frame=   20 fps=0.0 q=28.0 size=       2kB time=00:00:02.00 bitrate=   8.0kbits/s speed=2.00x\r' >&2
printf 'compressed' > "$last"
echo "video:2kB audio:1kB subtitle:0kB other streams:0kB" >&2
exit 0
"#;

/// Rejects the input like ffmpeg does for a corrupt file.
pub const FAILS: &str = r#"
echo "$3: Invalid data found when processing input" >&2
exit 1
"#;

/// Never finishes on its own.
pub const HANGS: &str = r#"
sleep 30
exit 0
"#;

pub struct FakeFfmpeg {
    pub dir: TempDir,
    pub binary: PathBuf,
    /// Created the first time the script runs anything other than `-version`.
    pub marker: PathBuf,
}

impl FakeFfmpeg {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let binary = dir.path().join("ffmpeg");
        let marker = dir.path().join("invoked");

        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"-version\" ]; then\n\
             \x20 echo \"ffmpeg version 6.1-fake Copyright (c) 2000-2023 the FFmpeg developers\"\n\
             \x20 exit 0\n\
             fi\n\
             touch \"{}\"\n\
             for last; do :; done\n\
             {body}\n",
            marker.display()
        );
        write_executable(&binary, &script);

        Self {
            dir,
            binary,
            marker,
        }
    }

    pub fn was_invoked(&self) -> bool {
        self.marker.exists()
    }

    /// A throwaway input file inside the fake's directory.
    pub fn input(&self) -> PathBuf {
        let path = self.dir.path().join("VID_0001.mp4");
        fs::write(&path, vec![0u8; 4096]).expect("Failed to write input");
        path
    }

    /// `<dir>/MyVideo/compress.mp4`. The directory is created, the file is not.
    pub fn output(&self) -> PathBuf {
        videocompress::storage::output_path(self.dir.path()).expect("Failed to create output dir")
    }
}

pub fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).expect("Failed to write script");
    let mut permissions = fs::metadata(path).expect("Failed to stat script").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("Failed to chmod script");
}
