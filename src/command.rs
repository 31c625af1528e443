//! The ffmpeg command template.
//!
//! [`CompressionCommand`] holds the two file paths and the encoding
//! parameters, and renders them as the argument vector passed to ffmpeg:
//!
//! ```text
//! -y -i <input> -strict -2 -vcodec libx264 -preset ultrafast -crf 24 -acodec aac
//! -ar 44100 -ac 2 -b:a 96k -s <WxH> -aspect 16:9 <output>
//! ```
//!
//! # Example
//!
//! ```
//! use videocompress::{CompressionCommand, Dimensions, Preset};
//!
//! let command = CompressionCommand::new("in.mp4", "out.mp4")
//!     .with_preset(Preset::Fast)
//!     .with_size(Dimensions::new(640, 480));
//! assert!(command.to_string().contains("-preset fast"));
//! ```

use std::ffi::OsString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CompressError;

/// Highest CRF value accepted by x264.
pub const MAX_CRF: u8 = 51;

/// x264 encoding preset.
///
/// Presets trade encoding speed against compression ratio. They change the
/// output quality very little; `Ultrafast` produces the largest files and
/// `Placebo` the smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Fastest encode, largest output. This is the default.
    #[default]
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    /// x264's own default.
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

impl Preset {
    /// All presets, fastest first.
    pub const ALL: [Preset; 10] = [
        Preset::Ultrafast,
        Preset::Superfast,
        Preset::Veryfast,
        Preset::Faster,
        Preset::Fast,
        Preset::Medium,
        Preset::Slow,
        Preset::Slower,
        Preset::Veryslow,
        Preset::Placebo,
    ];

    /// The name x264 expects after `-preset`.
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Superfast => "superfast",
            Preset::Veryfast => "veryfast",
            Preset::Faster => "faster",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Slower => "slower",
            Preset::Veryslow => "veryslow",
            Preset::Placebo => "placebo",
        }
    }
}

impl Display for Preset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = CompressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == lower)
            .ok_or_else(|| CompressError::InvalidParameter(format!("unknown preset: {value}")))
    }
}

/// Output frame size, rendered as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(480, 320)
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = CompressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CompressError::InvalidDimensions(value.to_string());
        let (width, height) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }
}

/// The ffmpeg argument template for a single compression.
///
/// Built from the input and output paths plus encoding parameters. The
/// defaults reproduce the fixed command used for phone recordings: x264
/// `ultrafast` at CRF 24, stereo AAC at 44.1 kHz / 96 kbit/s, scaled to
/// 480x320 with a 16:9 display aspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionCommand {
    input: PathBuf,
    output: PathBuf,
    video_codec: String,
    preset: Preset,
    crf: u8,
    audio_codec: String,
    audio_sample_rate: u32,
    audio_channels: u16,
    audio_bitrate: String,
    size: Dimensions,
    aspect: String,
}

impl CompressionCommand {
    /// Create a command with the default encoding parameters.
    pub fn new<I: AsRef<Path>, O: AsRef<Path>>(input: I, output: O) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            video_codec: "libx264".to_string(),
            preset: Preset::default(),
            crf: 24,
            audio_codec: "aac".to_string(),
            audio_sample_rate: 44_100,
            audio_channels: 2,
            audio_bitrate: "96k".to_string(),
            size: Dimensions::default(),
            aspect: "16:9".to_string(),
        }
    }

    #[must_use]
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Set the constant rate factor.
    ///
    /// Lower values mean higher quality and larger files. Values above
    /// [`MAX_CRF`] are rejected.
    pub fn with_crf(mut self, crf: u8) -> Result<Self, CompressError> {
        if crf > MAX_CRF {
            return Err(CompressError::InvalidParameter(format!(
                "crf must be between 0 and {MAX_CRF}, got {crf}"
            )));
        }
        self.crf = crf;
        Ok(self)
    }

    #[must_use]
    pub fn with_size(mut self, size: Dimensions) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_aspect<S: Into<String>>(mut self, aspect: S) -> Self {
        self.aspect = aspect.into();
        self
    }

    /// Set the audio bitrate, e.g. `"96k"` or `"128k"`.
    #[must_use]
    pub fn with_audio_bitrate<S: Into<String>>(mut self, bitrate: S) -> Self {
        self.audio_bitrate = bitrate.into();
        self
    }

    #[must_use]
    pub fn with_audio_sample_rate(mut self, rate: u32) -> Self {
        self.audio_sample_rate = rate;
        self
    }

    #[must_use]
    pub fn with_audio_channels(mut self, channels: u16) -> Self {
        self.audio_channels = channels;
        self
    }

    /// Replace the input path, keeping every encoding parameter.
    #[must_use]
    pub fn with_input<P: AsRef<Path>>(mut self, input: P) -> Self {
        self.input = input.as_ref().to_path_buf();
        self
    }

    /// Replace the output path, keeping every encoding parameter.
    #[must_use]
    pub fn with_output<P: AsRef<Path>>(mut self, output: P) -> Self {
        self.output = output.as_ref().to_path_buf();
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn crf(&self) -> u8 {
        self.crf
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Render the argument vector, in the order ffmpeg receives it.
    ///
    /// Paths are passed through as-is, so non-UTF-8 file names reach ffmpeg
    /// unchanged.
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-y"),
            OsString::from("-i"),
            OsString::from(&self.input),
            OsString::from("-strict"),
            OsString::from("-2"),
            OsString::from("-vcodec"),
            OsString::from(&self.video_codec),
            OsString::from("-preset"),
            OsString::from(self.preset.as_str()),
            OsString::from("-crf"),
            OsString::from(self.crf.to_string()),
            OsString::from("-acodec"),
            OsString::from(&self.audio_codec),
            OsString::from("-ar"),
            OsString::from(self.audio_sample_rate.to_string()),
            OsString::from("-ac"),
            OsString::from(self.audio_channels.to_string()),
            OsString::from("-b:a"),
            OsString::from(&self.audio_bitrate),
            OsString::from("-s"),
            OsString::from(self.size.to_string()),
            OsString::from("-aspect"),
            OsString::from(&self.aspect),
            OsString::from(&self.output),
        ]
    }
}

impl Display for CompressionCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let rendered: Vec<String> = self
            .to_args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

/// A free-text ffmpeg command split into arguments.
///
/// Splitting is on whitespace only; quoting is not interpreted, so paths
/// containing spaces must go through [`CompressionCommand`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    /// Parse a command string.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::EmptyCommand`] if the string is blank.
    pub fn parse(command: &str) -> Result<Self, CompressError> {
        let args: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if args.is_empty() {
            return Err(CompressError::EmptyCommand);
        }
        Ok(Self { args })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The path following the first `-i`, if any.
    pub fn input(&self) -> Option<&str> {
        self.args
            .windows(2)
            .find(|pair| pair[0] == "-i")
            .map(|pair| pair[1].as_str())
    }

    /// The file the command writes: its last argument, unless that is an
    /// option or the `-i` value.
    pub fn output(&self) -> Option<&str> {
        match self.args.as_slice() {
            [.., previous, last] if !last.starts_with('-') && previous != "-i" => {
                Some(last.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_string() {
        let command =
            CompressionCommand::new("/sdcard/DCIM/in.mp4", "/sdcard/MyVideo/compress.mp4");
        assert_eq!(
            command.to_string(),
            "-y -i /sdcard/DCIM/in.mp4 -strict -2 -vcodec libx264 -preset ultrafast -crf 24 \
             -acodec aac -ar 44100 -ac 2 -b:a 96k -s 480x320 -aspect 16:9 \
             /sdcard/MyVideo/compress.mp4"
        );
    }

    #[test]
    fn custom_parameters_render() {
        let command = CompressionCommand::new("a.mp4", "b.mp4")
            .with_preset(Preset::Slow)
            .with_crf(18)
            .unwrap()
            .with_size(Dimensions::new(640, 480));
        let args = command.to_args();
        assert_eq!(args.len(), 24);
        assert!(command.to_string().contains("-preset slow -crf 18"));
        assert!(command.to_string().contains("-s 640x480"));
        assert_eq!(
            args.last().map(|arg| arg.as_os_str()),
            Some(std::ffi::OsStr::new("b.mp4"))
        );
    }

    #[test]
    fn crf_above_max_rejected() {
        let result = CompressionCommand::new("a", "b").with_crf(52);
        assert!(matches!(result, Err(CompressError::InvalidParameter(_))));
    }

    #[test]
    fn preset_parse_case_insensitive() {
        assert_eq!("VeryFast".parse::<Preset>().unwrap(), Preset::Veryfast);
        assert_eq!("placebo".parse::<Preset>().unwrap(), Preset::Placebo);
        assert!("turbo".parse::<Preset>().is_err());
    }

    #[test]
    fn dimensions_parse() {
        assert_eq!("640x480".parse::<Dimensions>().unwrap(), Dimensions::new(640, 480));
        assert_eq!("1280X720".parse::<Dimensions>().unwrap(), Dimensions::new(1280, 720));
        assert!("0x480".parse::<Dimensions>().is_err());
        assert!("640".parse::<Dimensions>().is_err());
        assert!("axb".parse::<Dimensions>().is_err());
    }

    #[test]
    fn command_line_rejects_blank() {
        assert!(matches!(CommandLine::parse("   "), Err(CompressError::EmptyCommand)));
        assert!(matches!(CommandLine::parse(""), Err(CompressError::EmptyCommand)));
    }

    #[test]
    fn command_line_finds_input() {
        let line = CommandLine::parse("-y  -i clip.mp4 -s 320x240 out.mp4").unwrap();
        assert_eq!(line.args().len(), 6);
        assert_eq!(line.input(), Some("clip.mp4"));

        let without_input = CommandLine::parse("-version").unwrap();
        assert_eq!(without_input.input(), None);
    }

    #[test]
    fn command_line_finds_output() {
        let line = CommandLine::parse("-y -i clip.mp4 -s 320x240 /tmp/small.mp4").unwrap();
        assert_eq!(line.output(), Some("/tmp/small.mp4"));

        assert_eq!(CommandLine::parse("-y -i clip.mp4").unwrap().output(), None);
        assert_eq!(CommandLine::parse("-version").unwrap().output(), None);
        assert_eq!(CommandLine::parse("out.mp4").unwrap().output(), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_pass_through() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new(OsStr::from_bytes(b"/sdcard/VID_\xff.mp4"));
        let command = CompressionCommand::new(input, "out.mp4");
        let args = command.to_args();
        assert_eq!(args[2].as_os_str(), input.as_os_str());
        assert!(command.to_string().contains("VID_\u{fffd}.mp4"));
    }
}
