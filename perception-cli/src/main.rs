//! Perception Event Decoder CLI
//!
//! Command-line front-end for the perception-decoder library. It adds:
//! - File wiring (perception results file, optional output file)
//! - TOML configuration with command-line overrides
//! - Text and JSON-lines notification sinks
//! - A run summary on stderr

use anyhow::{Context, Result};
use clap::Parser;
use perception_decoder::{Decoder, DelimitedFrameSource, EventBus, Notification};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

mod callbacks;
mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// Perception Event Decoder - detect driver events in perception telemetry
#[derive(Parser, Debug)]
#[command(name = "perception-cli")]
#[command(about = "Detect eyes-closed and looking-away events in perception results", long_about = None)]
#[command(version)]
struct Args {
    /// Perception results file (one `;`-separated record per frame)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Video frame rate used to convert frames to seconds
    #[arg(long, value_name = "FPS")]
    fps: Option<u32>,

    /// Field separator
    #[arg(short, long, value_name = "SEP")]
    delimiter: Option<String>,

    /// Notification output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for notifications (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Minimum eyes-closed episode length to report, in seconds
    #[arg(long, value_name = "SECS")]
    eyes_closed_min: Option<f32>,

    /// Minimum looking-away episode length to report, in seconds
    #[arg(long, value_name = "SECS")]
    looking_away_min: Option<f32>,

    /// Disable the eyes-closed condition
    #[arg(long)]
    no_eyes_closed: bool,

    /// Disable the looking-away condition
    #[arg(long)]
    no_looking_away: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Perception Event Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", perception_decoder::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_args(&mut config, &args);
    config.validate()?;

    let Some(input) = config.input.file.clone() else {
        println!("Perception Event Decoder - No input specified");
        println!("\nQuick Start:");
        println!("  perception-cli perception_results.txt");
        println!("  perception-cli perception_results.txt --fps 30 --format json");
        println!("\nWith a configuration file:");
        println!("  perception-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    run(&config, input, args.quiet)
}

/// Command-line flags win over the config file
fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(input) = &args.input {
        config.input.file = Some(input.clone());
    }
    if let Some(fps) = args.fps {
        config.decoder.frames_per_second = fps;
    }
    if let Some(delimiter) = &args.delimiter {
        config.decoder.delimiter = delimiter.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(output) = &args.output {
        config.output.file = Some(output.clone());
    }
    if let Some(seconds) = args.eyes_closed_min {
        config.decoder.eyes_closed.min_duration = seconds;
    }
    if let Some(seconds) = args.looking_away_min {
        config.decoder.looking_away.min_duration = seconds;
    }
    if args.no_eyes_closed {
        config.decoder.eyes_closed.enabled = false;
    }
    if args.no_looking_away {
        config.decoder.looking_away.enabled = false;
    }
}

fn run(config: &AppConfig, input: PathBuf, quiet: bool) -> Result<()> {
    let schema = config.schema()?;
    let source = DelimitedFrameSource::open_with_config(&input, schema, &config.decoder)
        .with_context(|| format!("Failed to open perception file: {:?}", input))?;

    let mut decoder = Decoder::from_config(source, &config.decoder)?;

    let mut bus: EventBus<Notification> = EventBus::new();
    match &config.output.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            callbacks::subscribe(&mut bus, config.output.format, BufWriter::new(file));
        }
        None => {
            callbacks::subscribe(&mut bus, config.output.format, io::stdout());
        }
    }

    let summary = decoder
        .run(&mut bus)
        .with_context(|| format!("Decoding aborted: {:?}", input))?;

    if !quiet {
        eprintln!("{}", report::format_summary(&summary, decoder.time_base()));
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
