//! Benchmark configuration and scoped database acquisition.
//!
//! Values come from the command line, which falls back to `ORM_BENCH_*`
//! environment variables (a `.env` file is loaded first when present).

use crate::relations::CatalogSize;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

pub const DEFAULT_RUNS: usize = 10;
pub const DEFAULT_ROUNDS: usize = 1;
pub const DEFAULT_BATCH_SIZE: usize = 1_000;
pub const DEFAULT_TARGET_ID: i64 = 42;
pub const DEFAULT_BASIC_ROWS: usize = 10_000;
pub const DEFAULT_SIZES: [usize; 5] = [1, 10, 100, 1_000, 10_000];

/// Where the benchmark database lives. `path: None` means a private
/// in-memory database per connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbConfig {
    pub path: Option<PathBuf>,
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }

    /// Open and configure a new connection.
    pub fn open(&self) -> Result<Connection> {
        let conn = match &self.path {
            Some(path) => Connection::open(path)
                .with_context(|| format!("opening database {}", path.display()))?,
            None => Connection::open_in_memory().context("opening in-memory database")?,
        };
        configure_connection(&conn)?;
        Ok(conn)
    }
}

/// Open a connection, hand it to `f`, and close it again whether `f`
/// succeeded or not.
pub fn with_connection<T>(config: &DbConfig, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    let conn = config.open()?;
    let result = f(&conn);
    if let Err((_, err)) = conn.close() {
        log::warn!("closing {} failed: {}", config.describe(), err);
    }
    result
}

/// Pragmas tuned for latency measurement rather than durability.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = OFF;
         PRAGMA cache_size = -131072;
         PRAGMA mmap_size = 268435456;
         PRAGMA temp_store = MEMORY;
         PRAGMA page_size = 4096;",
    )
    .context("configuring connection")?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub db: DbConfig,
    /// Repetitions per measured query.
    pub runs: usize,
    /// Times the size scenario is repeated; samples are pooled across rounds.
    pub rounds: usize,
    /// Table sizes, smallest first; the first entry is the baseline.
    pub sizes: Vec<usize>,
    pub batch_size: usize,
    /// Row looked up by the single-row queries.
    pub target_id: i64,
    /// Table size for the one-shot basic scenario.
    pub basic_rows: usize,
    /// Row counts of the large relations dataset.
    pub catalog: CatalogSize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::in_memory(),
            runs: DEFAULT_RUNS,
            rounds: DEFAULT_ROUNDS,
            sizes: DEFAULT_SIZES.to_vec(),
            batch_size: DEFAULT_BATCH_SIZE,
            target_id: DEFAULT_TARGET_ID,
            basic_rows: DEFAULT_BASIC_ROWS,
            catalog: CatalogSize::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            bail!("runs must be at least 1");
        }
        if self.rounds == 0 {
            bail!("rounds must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.sizes.is_empty() {
            bail!("at least one table size is required");
        }
        if self.sizes.contains(&0) {
            bail!("table sizes must be at least 1");
        }
        if self.target_id < 1 {
            bail!("target id must be positive");
        }
        if self.basic_rows == 0 {
            bail!("basic scenario needs at least one row");
        }
        let catalog = &self.catalog;
        if catalog.categories == 0 || catalog.products == 0 || catalog.reviews == 0 {
            bail!("catalog needs at least one category, product and review");
        }
        Ok(())
    }
}

/// Parse a comma separated list such as `10,100,1000`.
pub fn parse_sizes(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.replace('_', "")
                .parse::<usize>()
                .with_context(|| format!("invalid table size {s:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_sizes, with_connection, BenchConfig, DbConfig};

    #[test]
    fn parse_sizes_accepts_spacing_and_underscores() {
        assert_eq!(parse_sizes("10, 100,1_000").unwrap(), vec![10, 100, 1000]);
        assert_eq!(parse_sizes("").unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn parse_sizes_rejects_garbage() {
        assert!(parse_sizes("10,ten").is_err());
    }

    #[test]
    fn default_config_is_valid() {
        BenchConfig::default().validate().unwrap();
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = BenchConfig {
            runs: 0,
            ..BenchConfig::default()
        };
        assert!(cfg.validate().is_err());

        cfg.runs = 5;
        cfg.sizes = vec![10, 0];
        assert!(cfg.validate().is_err());

        cfg.sizes.clear();
        assert!(cfg.validate().is_err());

        cfg.sizes = vec![10];
        cfg.catalog.reviews = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn file_connection_gets_benchmark_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let conn = DbConfig::file(dir.path().join("pragmas.db")).open().unwrap();

        let journal: String = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
        let mmap: i64 = conn.query_row("PRAGMA mmap_size", [], |r| r.get(0)).unwrap();
        let page: i64 = conn.query_row("PRAGMA page_size", [], |r| r.get(0)).unwrap();
        let cache: i64 = conn.query_row("PRAGMA cache_size", [], |r| r.get(0)).unwrap();

        assert_eq!(journal, "wal");
        assert_eq!(mmap, 268_435_456);
        assert_eq!(page, 4096);
        assert_eq!(cache, -131_072);
    }

    #[test]
    fn with_connection_returns_closure_result() {
        let n: i64 = with_connection(&DbConfig::in_memory(), |conn| {
            Ok(conn.query_row("SELECT 40 + 2", [], |r| r.get(0))?)
        })
        .unwrap();
        assert_eq!(n, 42);
    }

    #[test]
    fn with_connection_propagates_closure_error() {
        let result: anyhow::Result<()> = with_connection(&DbConfig::in_memory(), |conn| {
            conn.execute("SELECT * FROM missing_table", [])?;
            Ok(())
        });
        assert!(result.is_err());
    }
}
