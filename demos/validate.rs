//! Check whether a video is a sensible input before compressing it.
//!
//! Usage:
//!   cargo run --example validate -- <input_file> [WxH]

use std::error::Error;

use videocompress::{Dimensions, MediaProbe, validate_for_compression};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let target = match args.next() {
        Some(size) => size.parse::<Dimensions>()?,
        None => Dimensions::default(),
    };

    let metadata = MediaProbe::probe(&input_path)?;
    println!("Format: {}, duration {:?}", metadata.format, metadata.duration);
    if let Some(video) = &metadata.video {
        println!("Video: {}x{} [{}]", video.width, video.height, video.codec);
    }

    let report = validate_for_compression(&metadata, target);
    println!("\nTarget {target}:");
    print!("{report}");
    println!(
        "\n{}",
        if report.is_valid() {
            "Ready to compress."
        } else {
            "Cannot be compressed."
        }
    );

    Ok(())
}
