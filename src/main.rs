use clap::Parser;
use hicmap::logger::Logger;
use hicmap::pipeline::{run_hic_plot, Dataset};
use hicmap::plot::HeatmapStyle;
use hicmap::VERSION;
use std::error::Error;
use std::path::Path;

/// Plot Hi-C contact map (log2 O/E)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bin annotation file (*.bins.txt)
    #[arg(long = "bins")]
    bins: String,
    /// Hi-C contact file (*.n_contact.txt)
    #[arg(long = "contacts")]
    contacts: String,
    /// Start bin index (inclusive)
    #[arg(long = "start-bin", allow_negative_numbers = true)]
    start_bin: i64,
    /// End bin index (inclusive)
    #[arg(long = "end-bin", allow_negative_numbers = true)]
    end_bin: i64,
    /// Output figure path (e.g. figure/figure_1A.png)
    #[arg(long = "out")]
    out: String,
    /// Write a timestamped run log to this path (optional; no log file otherwise)
    #[arg(short = 'l', long = "log")]
    log: Option<String>,
}

/// Validate arguments before any data is loaded
fn validate_args(args: &Cli) -> Result<(), Box<dyn Error>> {
    if args.bins.trim().is_empty() {
        return Err("Error: Bin file path cannot be empty".into());
    }
    if !Path::new(&args.bins).exists() {
        return Err(format!("Error: Bin file does not exist: {}", args.bins).into());
    }
    if args.contacts.trim().is_empty() {
        return Err("Error: Contact file path cannot be empty".into());
    }
    if !Path::new(&args.contacts).exists() {
        return Err(format!("Error: Contact file does not exist: {}", args.contacts).into());
    }
    if args.start_bin > args.end_bin {
        return Err(format!(
            "Error: start bin ({}) must not be greater than end bin ({})",
            args.start_bin, args.end_bin
        )
        .into());
    }
    if args.out.trim().is_empty() {
        return Err("Error: Output figure path cannot be empty".into());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    validate_args(&args)?;

    let mut logger = open_logger(args.log.as_deref())?;

    logger.log("=== hicmap Log ===")?;
    logger.log(&format!("Software Version: v{}", VERSION))?;
    logger.log(&format!("Bin range: {}..={}", args.start_bin, args.end_bin))?;
    logger.log(&format!("Output File: {}", args.out))?;

    let dataset = Dataset {
        label: "data",
        bins: Path::new(&args.bins),
        contacts: Path::new(&args.contacts),
    };
    let result = run_hic_plot(
        &dataset,
        args.start_bin,
        args.end_bin,
        Path::new(&args.out),
        &HeatmapStyle::default(),
        &mut logger,
    );

    if let Err(e) = &result {
        logger.log_failure("Hi-C plot", e);
    }
    result
}

/// File logger when `--log` is given, console only otherwise
fn open_logger(log: Option<&str>) -> std::io::Result<Logger> {
    match log {
        Some(path) => Logger::create(path),
        None => Ok(Logger::console()),
    }
}
