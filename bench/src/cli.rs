//! Command-line interface. Every flag falls back to an `ORM_BENCH_*`
//! environment variable, then to the built-in default.

use crate::config::{
    parse_sizes, BenchConfig, DbConfig, DEFAULT_BASIC_ROWS, DEFAULT_BATCH_SIZE, DEFAULT_ROUNDS,
    DEFAULT_RUNS, DEFAULT_TARGET_ID,
};
use crate::relations::{CatalogSize, DEFAULT_CATEGORIES, DEFAULT_PRODUCTS, DEFAULT_REVIEWS};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file; an in-memory database is used when omitted
    #[arg(long, global = true, env = "ORM_BENCH_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Repetitions per measured query
    #[arg(short, long, global = true, env = "ORM_BENCH_RUNS", default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Times the size scenario is repeated before summarising
    #[arg(long, global = true, env = "ORM_BENCH_ROUNDS", default_value_t = DEFAULT_ROUNDS)]
    pub rounds: usize,

    /// Comma separated table sizes, e.g. `10,100,1000`
    #[arg(long, global = true, env = "ORM_BENCH_SIZES")]
    pub sizes: Option<String>,

    /// Rows per insert transaction while populating
    #[arg(long, global = true, env = "ORM_BENCH_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Id looked up by the single-row queries
    #[arg(long, global = true, env = "ORM_BENCH_TARGET_ID", default_value_t = DEFAULT_TARGET_ID)]
    pub target_id: i64,

    /// Table size for the basic scenario
    #[arg(long, global = true, default_value_t = DEFAULT_BASIC_ROWS)]
    pub basic_rows: usize,

    /// Categories in the large relations dataset
    #[arg(long, global = true, env = "ORM_BENCH_CATEGORIES", default_value_t = DEFAULT_CATEGORIES)]
    pub categories: usize,

    /// Products in the large relations dataset
    #[arg(long, global = true, env = "ORM_BENCH_PRODUCTS", default_value_t = DEFAULT_PRODUCTS)]
    pub products: usize,

    /// Reviews in the large relations dataset
    #[arg(long, global = true, env = "ORM_BENCH_REVIEWS", default_value_t = DEFAULT_REVIEWS)]
    pub reviews: usize,

    #[arg(long, global = true, env = "ORM_BENCH_LOG", default_value = "info")]
    pub log_level: String,

    /// Also write log records to this file
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// One-shot queries on a single table size
    Basic,
    /// Lookup by id across table sizes
    Size,
    /// Account lookups with and without an index
    Index,
    /// Join-and-update operations on related tables
    Relations,
    /// Every scenario in turn
    All,
}

/// A single runnable scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Basic,
    Size,
    Index,
    Relations,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Basic,
        Scenario::Size,
        Scenario::Index,
        Scenario::Relations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Basic => "basic",
            Scenario::Size => "size",
            Scenario::Index => "index",
            Scenario::Relations => "relations",
        }
    }
}

impl Command {
    /// The scenarios this command runs, in order.
    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            Command::Basic => vec![Scenario::Basic],
            Command::Size => vec![Scenario::Size],
            Command::Index => vec![Scenario::Index],
            Command::Relations => vec![Scenario::Relations],
            Command::All => Scenario::ALL.to_vec(),
        }
    }
}

impl Cli {
    /// Scenarios selected on the command line; all of them by default.
    pub fn scenarios(&self) -> Vec<Scenario> {
        self.command.unwrap_or(Command::All).scenarios()
    }

    pub fn to_config(&self) -> Result<BenchConfig> {
        let mut cfg = BenchConfig {
            db: match &self.db_path {
                Some(path) => DbConfig::file(path),
                None => DbConfig::in_memory(),
            },
            runs: self.runs,
            rounds: self.rounds,
            batch_size: self.batch_size,
            target_id: self.target_id,
            basic_rows: self.basic_rows,
            catalog: CatalogSize {
                categories: self.categories,
                products: self.products,
                reviews: self.reviews,
            },
            ..BenchConfig::default()
        };
        if let Some(sizes) = &self.sizes {
            cfg.sizes = parse_sizes(sizes)?;
        }
        Ok(cfg)
    }
}
