//! Benchmark runner.
//!
//! Usage:
//!   orm-bench                      # every scenario, in-memory database
//!   orm-bench size --sizes 10,1000 --runs 20
//!   ORM_BENCH_DB_PATH=bench.db orm-bench index

use anyhow::Result;
use clap::Parser;
use orm_bench::cli::{Cli, Scenario};
use orm_bench::config::BenchConfig;
use orm_bench::{report, scenario};
use std::process::ExitCode;

fn run_scenario(which: Scenario, cfg: &BenchConfig) -> Result<()> {
    match which {
        Scenario::Basic => {
            let timings = scenario::run_basic(cfg)?;
            report::print_basic_comparison(&timings);
        }
        Scenario::Size => report::print_size_report(&scenario::run_size(cfg)?),
        Scenario::Index => report::print_index_report(&scenario::run_index(cfg)?),
        Scenario::Relations => report::print_relations_report(&scenario::run_relations(cfg)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = harness::initialize_logger(
        harness::parse_level(&cli.log_level),
        cli.log_file.as_deref(),
    ) {
        eprintln!("failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }
    match dotenv {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) => log::debug!("no .env loaded: {e}"),
    }

    let cfg = match cli.to_config().and_then(|cfg| cfg.validate().map(|_| cfg)) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "database {}, {} runs, sizes {:?}",
        cfg.db.describe(),
        cfg.runs,
        cfg.sizes
    );

    // one error boundary per scenario
    let mut failed = 0;
    for which in cli.scenarios() {
        if let Err(e) = run_scenario(which, &cfg) {
            log::error!("{} scenario failed: {e:#}", which.name());
            failed += 1;
        }
    }

    if failed > 0 {
        log::error!("{failed} scenario(s) failed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
