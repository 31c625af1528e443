//! Demonstrate progress reporting and cancellation during compression.
//!
//! Usage:
//!   cargo run --example progress -- <input_file>

use std::error::Error;
use std::sync::Arc;

use videocompress::{
    CancellationToken, CompressError, CompressOptions, CompressionSession, Compressor,
    ProgressCallback, ProgressInfo, StorageRoot,
};

/// Prints every status update to stdout.
struct PrintProgress;

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let pct = info
            .percentage
            .map_or("??".to_string(), |p| format!("{p:.1}"));
        let remaining = info
            .estimated_remaining
            .map_or("???".to_string(), |r| format!("{:.1}s", r.as_secs_f64()));
        println!(
            "[{:?}] update {} ({pct}%) frame={} speed={} remaining={remaining}",
            info.operation,
            info.current,
            info.current_frame.map_or("?".to_string(), |f| f.to_string()),
            info.speed.map_or("?".to_string(), |s| format!("{s:.2}x")),
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    let compressor = Compressor::load()?;
    let mut session = CompressionSession::with_storage(&StorageRoot::resolve(None))?;
    session.set_input(&input_path);

    // ── Progress callback ──────────────────────────────────────────
    println!("Compressing with progress reporting...");
    let options = CompressOptions::new()
        .with_progress(Arc::new(PrintProgress))
        .with_batch_size(5);
    let report = session.compress(&compressor, &options)?;
    println!("Wrote {} bytes\n", report.output_size);

    // ── Cancellation token ─────────────────────────────────────────
    println!("Demonstrating cancellation...");
    let token = CancellationToken::new();
    let cancel_options = CompressOptions::new().with_cancellation(token.clone());

    // Cancel immediately to demonstrate the mechanism.
    token.cancel();

    match session.compress(&compressor, &cancel_options) {
        Err(CompressError::Cancelled) => println!("Compression was cancelled as expected."),
        Err(e) => println!("Unexpected error: {e}"),
        Ok(report) => println!("Finished anyway: {} bytes", report.output_size),
    }

    println!("\nDone!");
    Ok(())
}
