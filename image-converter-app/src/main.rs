use std::{path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use rust_image_converter::{
    convert::{convert, ConvertError},
    format::SaveOptions,
};
use tracing::level_filters::LevelFilter;

/// Converts an image between the PPM, BMP and JPEG formats, chosen by file extension.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Image to read (.ppm, .bmp, .jpg or .jpeg)
    in_file: PathBuf,
    /// Image to write (.ppm, .bmp, .jpg or .jpeg)
    out_file: PathBuf,
    /// JPEG output quality
    #[arg(long, default_value_t = rust_image_converter::jpeg::DEFAULT_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
    /// Write BMP headers byte-identical to older converter releases
    #[arg(long)]
    legacy_bmp_header: bool,
    /// Log more details to stderr, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return match err.print() {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::from(1),
            };
        }
        Err(err) => {
            let program = std::env::args().next().unwrap_or_else(|| "image-converter-app".into());
            eprintln!("Usage: {program} <in_file> <out_file>");
            eprint!("{}", err.render());
            return ExitCode::from(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(match cli.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        })
        .init();

    let options = SaveOptions {
        jpeg_quality: cli.quality,
        bmp_legacy_important_colors: cli.legacy_bmp_header,
    };

    match convert(&cli.in_file, &cli.out_file, &options) {
        Ok(_) => {
            println!("Successfully converted");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match &err {
                ConvertError::UnknownInputFormat(_) | ConvertError::UnknownOutputFormat(_) => {
                    println!("{err}")
                }
                ConvertError::Load(_) | ConvertError::Save(_) => eprintln!("{err}"),
            }
            ExitCode::from(err.exit_code())
        }
    }
}
