//! Print descriptive statistics for a file of numbers.
//!
//! Usage:
//!   describe timings.txt
//!   describe samples.csv --csv summary.csv

use bench_utils::{describe_file, write_csv};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file: `.csv` or one number per line
    path: PathBuf,

    /// Also write the statistics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let description = describe_file(&args.path)?;

    println!("Statistics for {}", args.path.display());
    for (label, value) in description.rows() {
        println!("{:<30} {}", format!("{label}:"), value);
    }

    if let Some(out) = &args.csv {
        write_csv(&description, out)?;
        log::info!("statistics written to {}", out.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = harness::initialize_logger(harness::parse_level(&args.log_level), None) {
        eprintln!("failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
