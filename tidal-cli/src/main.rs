//! Tidal Log Reader CLI Application
//!
//! Command-line interface for the tidal log decoder. It opens a log file,
//! decodes every stream with the tidal-decoder library, and prints the result
//! as text or JSON.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tidal_decoder::{Parser, WireFormat};

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// Tidal Log Reader - Decode and print tidal telemetry logs
#[derive(ClapParser, Debug)]
#[command(name = "tidal-cli")]
#[command(about = "Decode and print tidal binary telemetry logs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the log file to decode
    #[arg(value_name = "FILE")]
    log: PathBuf,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decode the older split-labels wire format
    #[arg(long)]
    split_labels: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only print this stream (can be repeated)
    #[arg(short, long = "stream", value_name = "NAME")]
    streams: Vec<String>,

    /// Maximum number of records to print per stream
    #[arg(long, value_name = "COUNT")]
    max_rows: Option<usize>,

    /// Print decode statistics
    #[arg(long)]
    stats: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
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

    log::info!("Tidal Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", tidal_decoder::VERSION);

    let config = resolve_config(&args)?;

    let parsed = Parser::open_with_config(&args.log, config.decoder.clone())
        .with_context(|| format!("Failed to decode log file: {:?}", args.log))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut out = BufWriter::new(file);
            write_report(&mut out, &parsed, &config)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, &parsed, &config)?;
        }
    }

    Ok(())
}

/// Load the optional config file, then let command-line flags override it
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if args.split_labels {
        config.decoder.wire_format = WireFormat::SplitLabels;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if !args.streams.is_empty() {
        config.output.streams = args.streams.clone();
    }
    if args.max_rows.is_some() {
        config.output.max_rows = args.max_rows;
    }
    config.output.stats |= args.stats;

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn write_report<W: Write>(out: &mut W, parsed: &Parser, config: &AppConfig) -> Result<()> {
    match config.output.format {
        OutputFormat::Text => report::write_text(out, parsed, &config.output),
        OutputFormat::Json => report::write_json(out, parsed, &config.output),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

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
