//! Compress a video into `<storage>/MyVideo/compress.mp4`.
//!
//! Usage:
//!   cargo run --example compress -- <input_file> [storage_dir]

use std::error::Error;
use std::path::PathBuf;

use videocompress::{CompressOptions, CompressionSession, Compressor, StorageRoot};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let storage = StorageRoot::resolve(args.next().map(PathBuf::from));

    let compressor = Compressor::load()?;
    println!("Using {} ({})", compressor.binary().display(), compressor.version());

    let mut session = CompressionSession::with_storage(&storage)?;
    session.set_input(&input_path);
    println!("Command: {}", session.command());

    let report = session.compress(&compressor, &CompressOptions::new())?;
    println!(
        "{} -> {} in {:.1}s",
        report.input.display(),
        report.output.display(),
        report.elapsed.as_secs_f64()
    );
    println!(
        "{} bytes -> {} bytes ({} saved)",
        report.input_size,
        report.output_size,
        report.saved_bytes()
    );
    if let Some(ratio) = report.ratio() {
        println!("Ratio: {:.1}%", ratio * 100.0);
    }

    Ok(())
}
