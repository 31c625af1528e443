use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use videocompress::{
    CompressOptions, CompressionReport, CompressionSession, Compressor, Dimensions, MediaProbe,
    Preset, ProgressCallback, ProgressInfo, StorageRoot,
};

const CLI_AFTER_HELP: &str = "Examples:
  videocompress compress VID_0001.mp4 --progress
  videocompress compress VID_0001.mp4 --preset fast --crf 20 --size 640x480
  videocompress command VID_0001.mp4
  videocompress exec \"-y -i in.mp4 -s 320x240 out.mp4\" --input in.mp4
  videocompress completions zsh > _videocompress";

#[derive(Debug, Parser)]
#[command(
    name = "videocompress",
    version,
    about = "Compress recorded videos with an external ffmpeg binary",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while compressing.
    #[arg(long, global = true)]
    progress: bool,

    /// Path to the ffmpeg binary (overrides $VIDEOCOMPRESS_FFMPEG and PATH).
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Storage root; output goes to <dir>/MyVideo/compress.mp4.
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compress a video with the x264/AAC template.
    #[command(
        about = "Compress a video",
        after_help = "Examples:
  videocompress compress in.mp4
  videocompress compress in.mp4 --out small.mp4 --preset veryfast --crf 28"
    )]
    Compress {
        /// Input video path.
        input: PathBuf,
        /// Output path (default: <storage>/MyVideo/compress.mp4).
        #[arg(long)]
        out: Option<PathBuf>,
        /// x264 preset (ultrafast ... placebo).
        #[arg(long, default_value = "ultrafast")]
        preset: String,
        /// Constant rate factor, 0-51; lower is better quality.
        #[arg(long, default_value_t = 24)]
        crf: u8,
        /// Output frame size as WxH.
        #[arg(long, default_value = "480x320")]
        size: String,
        /// Skip probing the input (progress will have no percentage).
        #[arg(long)]
        no_probe: bool,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a free-text ffmpeg command.
    #[command(about = "Run a custom ffmpeg command")]
    Exec {
        /// The command string, without the leading `ffmpeg`.
        #[arg(allow_hyphen_values = true)]
        command: String,
        /// Input video the command reads (default: the command's `-i` value).
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print the command that `compress` would run.
    #[command(about = "Print the compression command")]
    Command {
        input: PathBuf,
        #[arg(long, default_value = "ultrafast")]
        preset: String,
        #[arg(long, default_value_t = 24)]
        crf: u8,
        #[arg(long, default_value = "480x320")]
        size: String,
    },

    /// Print the default output path.
    #[command(about = "Print the output path")]
    OutputPath,

    /// Print metadata for a video.
    #[command(about = "Print media metadata", visible_alias = "info")]
    Probe {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Check whether a video can be compressed to the target size.
    #[command(about = "Validate an input video")]
    Validate {
        input: PathBuf,
        #[arg(long, default_value = "480x320")]
        size: String,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct TerminalProgress {
    bar: ProgressBar,
    has_length: Mutex<bool>,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {percent:>3}% {msg}",
        )?
        .progress_chars("##-"));
        bar.enable_steady_tick(Duration::from_millis(120));
        Ok(Self {
            bar,
            has_length: Mutex::new(false),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(percentage) = info.percentage {
            if let Ok(mut has_length) = self.has_length.lock() {
                if !*has_length {
                    self.bar.set_length(1000);
                    *has_length = true;
                }
            }
            self.bar.set_position((percentage * 10.0) as u64);
        }

        let frame = info
            .current_frame
            .map(|frame| format!("frame {frame}"))
            .unwrap_or_default();
        let speed = info
            .speed
            .map(|speed| format!(" {speed:.2}x"))
            .unwrap_or_default();
        self.bar.set_message(format!("{frame}{speed}"));
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn load_compressor(global: &GlobalOptions) -> Result<Compressor, Box<dyn std::error::Error>> {
    let compressor = Compressor::load_from(global.ffmpeg.clone())?;
    if global.verbose {
        eprintln!(
            "{} {} ({})",
            "using".cyan().bold(),
            compressor.binary().display(),
            compressor.version()
        );
    }
    Ok(compressor)
}

fn default_output(global: &GlobalOptions) -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(StorageRoot::resolve(global.storage_dir.clone()).output_path()?)
}

fn configure_session(
    session: &mut CompressionSession,
    preset: &str,
    crf: u8,
    size: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    session.set_preset(preset.parse::<Preset>()?);
    session.set_crf(crf)?;
    session.set_size(size.parse::<Dimensions>()?);
    Ok(())
}

fn print_success(report: &CompressionReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "input": report.input.display().to_string(),
            "output": report.output.display().to_string(),
            "input_size": report.input_size,
            "output_size": report.output_size,
            "ratio": report.ratio(),
            "elapsed_seconds": report.elapsed.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "compressed {} ({}) -> {} ({}) in {:.1}s",
            report.input.display(),
            videocompress::storage::format_file_size(&report.input),
            report.output.display(),
            videocompress::storage::format_file_size(&report.output),
            report.elapsed.as_secs_f64(),
        )
        .green()
    );
    Ok(())
}

fn compress_options(
    global: &GlobalOptions,
    probe: bool,
) -> Result<(CompressOptions, Option<Arc<TerminalProgress>>), Box<dyn std::error::Error>> {
    let mut options = CompressOptions::new().with_probe(probe);
    let progress = if global.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };
    Ok((options, progress))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::Compress {
            input,
            out,
            preset,
            crf,
            size,
            no_probe,
            json,
        } => {
            let output = match out {
                Some(path) => path,
                None => default_output(&cli.global)?,
            };
            let mut session = CompressionSession::new(&output);
            configure_session(&mut session, &preset, crf, &size)?;
            session.set_input(&input);

            let compressor = load_compressor(&cli.global)?;
            if cli.global.verbose {
                eprintln!("{} {}", "command".cyan().bold(), session.command());
            }

            let (options, progress) = compress_options(&cli.global, !no_probe)?;
            let result = session.compress(&compressor, &options);
            if let Some(progress) = progress {
                progress.finish();
            }
            print_success(&result?, json)?;
        }
        Commands::Exec { command, input } => {
            let line = videocompress::CommandLine::parse(&command)?;
            let input = input
                .or_else(|| line.input().map(PathBuf::from))
                .ok_or("no input video: pass --input or include -i in the command")?;

            let mut session = CompressionSession::new(default_output(&cli.global)?);
            session.set_input(&input);

            let compressor = load_compressor(&cli.global)?;
            let (options, progress) = compress_options(&cli.global, true)?;
            let result = session.exec_custom(&compressor, &command, &options);
            if let Some(progress) = progress {
                progress.finish();
            }
            print_success(&result?, false)?;
        }
        Commands::Command {
            input,
            preset,
            crf,
            size,
        } => {
            let mut session = CompressionSession::new(default_output(&cli.global)?);
            configure_session(&mut session, &preset, crf, &size)?;
            session.set_input(&input);
            println!("{}", session.command());
        }
        Commands::OutputPath => {
            println!("{}", default_output(&cli.global)?.display());
        }
        Commands::Probe { input, json } => {
            let metadata = MediaProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "bit_rate": metadata.bit_rate,
                    "size_bytes": videocompress::storage::file_size(&input),
                    "video": metadata.video.as_ref().map(|video| json!({
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "frame_count": video.frame_count,
                        "codec": video.codec,
                    })),
                    "audio": metadata.audio.as_ref().map(|audio| json!({
                        "sample_rate": audio.sample_rate,
                        "channels": audio.channels,
                        "codec": audio.codec,
                        "bit_rate": audio.bit_rate,
                    })),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                println!("Size: {}", videocompress::storage::format_file_size(&input));
                if let Some(video) = &metadata.video {
                    println!(
                        "Video: {}x{} @ {:.2} fps [{}]",
                        video.width, video.height, video.frames_per_second, video.codec,
                    );
                }
                if let Some(audio) = &metadata.audio {
                    println!(
                        "Audio: {} Hz, {} ch [{}]",
                        audio.sample_rate, audio.channels, audio.codec,
                    );
                }
            }
        }
        Commands::Validate { input, size } => {
            let report = videocompress::validate_file(&input, size.parse::<Dimensions>()?)?;
            print!("{report}");
            if !report.is_valid() {
                return Err("validation failed".into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "videocompress", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {}", "error:".red().bold(), error.to_string().red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn compress_defaults() {
        let cli = Cli::parse_from(["videocompress", "compress", "in.mp4"]);
        match cli.command {
            Commands::Compress {
                preset, crf, size, no_probe, ..
            } => {
                assert_eq!(preset, "ultrafast");
                assert_eq!(crf, 24);
                assert_eq!(size, "480x320");
                assert!(!no_probe);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "videocompress",
            "compress",
            "in.mp4",
            "--progress",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
        ]);
        assert!(cli.global.progress);
        assert_eq!(
            cli.global.ffmpeg.as_deref(),
            Some(std::path::Path::new("/opt/ffmpeg/bin/ffmpeg"))
        );
    }

    #[test]
    fn exec_accepts_hyphenated_command() {
        let cli = Cli::try_parse_from([
            "videocompress",
            "exec",
            "-y -i in.mp4 -s 320x240 out.mp4",
            "--input",
            "in.mp4",
        ])
        .expect("exec command was rejected");
        match cli.command {
            Commands::Exec { command, input } => {
                assert_eq!(command, "-y -i in.mp4 -s 320x240 out.mp4");
                assert_eq!(input.as_deref(), Some(std::path::Path::new("in.mp4")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn exec_without_input_flag() {
        let cli = Cli::try_parse_from(["videocompress", "--verbose", "exec", "-y -i a.mp4 b.mp4"])
            .expect("exec command was rejected");
        assert!(cli.global.verbose);
        assert!(matches!(cli.command, Commands::Exec { input: None, .. }));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
