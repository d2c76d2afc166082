mod report;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use rust_jpeg_header::jpeg::{DecodeOptions, JPEGDecoder};

use crate::report::HeaderReport;

#[derive(Parser, Debug)]
#[command(name = "jpeg-header")]
#[command(author, version, long_about = None)]
#[command(about = "Validates JPEG files and prints their quantization tables and frame header")]
struct Args {
    /// JPEG files to decode, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Treat subsampled components as errors
    #[arg(long)]
    strict: bool,

    /// Stop at the first scan instead of walking the whole file
    #[arg(long)]
    header_only: bool,

    /// Stop the batch at the first file that fails
    #[arg(long)]
    fail_fast: bool,

    /// Only report whether each file decoded
    #[arg(short, long)]
    quiet: bool,

    /// Log more, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = DecodeOptions {
        strict_sampling: args.strict,
        stop_at_first_scan: args.header_only,
    };

    let mut failed = 0;
    for path in &args.files {
        if let Err(err) = process_file(path, options, args.quiet) {
            println!("Error! {}: {:#}", display_name(path), err);
            failed += 1;
            if args.fail_fast {
                break;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, args.files.len());
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn process_file(path: &Path, options: DecodeOptions, quiet: bool) -> Result<()> {
    let name = display_name(path);
    log::info!("decoding {}", path.display());

    let file = File::open(path).with_context(|| format!("failed to open '{name}'"))?;
    let mut decoder = JPEGDecoder::with_options(BufReader::new(file), options);
    decoder
        .check_signature()
        .with_context(|| format!("the file '{name}' is not a valid JPEG file"))?;
    println!("The file '{name}' is a valid JPEG file");

    match decoder.decode() {
        Ok(header) => {
            if !quiet {
                print!("{}", HeaderReport(&header));
            }
            Ok(())
        }
        Err(failure) => {
            if !quiet {
                print!("{}", HeaderReport(&failure.header));
            }
            Err(failure.into())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
