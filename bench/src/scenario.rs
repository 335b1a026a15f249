//! Benchmark scenarios. Each one owns its connections for the duration of
//! the run and returns plain result records for the report module.
//!
//! | Scenario  | Table(s)             | Measured                                   |
//! |-----------|----------------------|--------------------------------------------|
//! | basic     | users (one size)     | one shot each: by id, first 10, all rows   |
//! | size      | users (many sizes)   | `runs` × lookup by id, per strategy        |
//! | index     | accounts             | `runs` × pk lookup, name lookup ± index    |
//! | relations | catalog + people     | `runs` × join, update, verify              |

use crate::config::{with_connection, BenchConfig};
use crate::populate::{setup_accounts, setup_users, TARGET_NAME};
use crate::query::{AccountLookup, BoundQuery, UserQuery};
use crate::relations::{self, Dataset, PersonBioUpdate, ProductStockRoundTrip};
use crate::report;
use crate::store::{all_stores, UserStore};
use anyhow::{Context, Result};
use harness::{collect, measure, time_once, Summary, TimingSample};

/// Rows returned by the "first N users" query of the basic scenario.
pub const PAGE_SIZE: usize = 10;

/// Single measurement of one query through one strategy.
#[derive(Debug, Clone)]
pub struct SingleTiming {
    pub store: &'static str,
    pub label: String,
    pub ms: f64,
    pub rows: usize,
}

/// Time each basic query once per strategy against a freshly built table.
///
/// Lines are printed as they are measured so they survive a later failure.
pub fn run_basic(cfg: &BenchConfig) -> Result<Vec<SingleTiming>> {
    let queries = [
        UserQuery::ById(cfg.target_id),
        UserQuery::Page(PAGE_SIZE),
        UserQuery::All,
    ];

    let mut timings = Vec::new();
    for store in all_stores() {
        log::info!(
            "basic/{}: creating {} users",
            store.name(),
            cfg.basic_rows
        );
        report::print_section(&format!("Basic queries ({})", store.name()));
        with_connection(&cfg.db, |conn| {
            setup_users(
                conn,
                store.as_ref(),
                cfg.basic_rows,
                cfg.target_id,
                cfg.batch_size,
            )?;
            for query in queries {
                let mut op = BoundQuery::new(conn, store.as_ref(), query);
                let (ms, rows) = time_once(&mut op)?;
                let timing = SingleTiming {
                    store: store.name(),
                    label: query.label(),
                    ms,
                    rows,
                };
                report::print_single(&timing);
                timings.push(timing);
            }
            Ok(())
        })
        .with_context(|| format!("basic scenario with {} access", store.name()))?;
    }
    Ok(timings)
}

/// Lookup-by-id summaries for one strategy, one entry per table size.
#[derive(Debug, Clone)]
pub struct SizeSeries {
    pub store: &'static str,
    pub rows: Vec<(usize, Summary)>,
}

fn measure_lookup_samples(
    cfg: &BenchConfig,
    store: &dyn UserStore,
    size: usize,
) -> Result<TimingSample> {
    with_connection(&cfg.db, |conn| {
        setup_users(conn, store, size, cfg.target_id, cfg.batch_size)?;
        let mut op = BoundQuery::new(conn, store, UserQuery::ById(cfg.target_id));
        collect(&mut op, cfg.runs)
    })
}

/// Lookup by id at every configured table size, for both strategies.
///
/// With `rounds > 1` the whole sweep is repeated and each configuration's
/// samples are pooled before summarising.
pub fn run_size(cfg: &BenchConfig) -> Result<Vec<SizeSeries>> {
    let stores = all_stores();
    let mut pooled: Vec<Vec<TimingSample>> = stores
        .iter()
        .map(|_| vec![TimingSample::new(); cfg.sizes.len()])
        .collect();

    for round in 1..=cfg.rounds {
        log::info!("size: round {round}/{}", cfg.rounds);
        for (store, samples) in stores.iter().zip(pooled.iter_mut()) {
            for (&size, sample) in cfg.sizes.iter().zip(samples.iter_mut()) {
                log::debug!("size/{}: {} rows", store.name(), size);
                let round_sample = measure_lookup_samples(cfg, store.as_ref(), size)
                    .with_context(|| {
                        format!("size scenario, {} access, {size} rows", store.name())
                    })?;
                sample.merge(&round_sample);
            }
        }
    }

    let mut series = Vec::with_capacity(stores.len());
    for (store, samples) in stores.iter().zip(pooled) {
        let mut rows = Vec::with_capacity(samples.len());
        for (&size, sample) in cfg.sizes.iter().zip(samples) {
            let summary = sample
                .summarize()
                .context("size scenario produced an empty sample")?;
            rows.push((size, summary));
        }
        series.push(SizeSeries {
            store: store.name(),
            rows,
        });
    }
    Ok(series)
}

/// Account lookups per table size, with and without an index on `name`.
#[derive(Debug, Clone)]
pub struct IndexResults {
    pub sizes: Vec<usize>,
    pub pk_indexed: Vec<Summary>,
    pub name_indexed: Vec<Summary>,
    pub name_unindexed: Vec<Summary>,
}

pub fn run_index(cfg: &BenchConfig) -> Result<IndexResults> {
    let mut results = IndexResults {
        sizes: cfg.sizes.clone(),
        pk_indexed: Vec::with_capacity(cfg.sizes.len()),
        name_indexed: Vec::with_capacity(cfg.sizes.len()),
        name_unindexed: Vec::with_capacity(cfg.sizes.len()),
    };

    for &size in &cfg.sizes {
        log::info!("index: {size} accounts, name index on");
        with_connection(&cfg.db, |conn| {
            setup_accounts(conn, size, cfg.target_id, cfg.batch_size, true)?;
            results.pk_indexed.push(measure(
                &mut AccountLookup::by_id(conn, cfg.target_id),
                cfg.runs,
            )?);
            results.name_indexed.push(measure(
                &mut AccountLookup::by_name(conn, TARGET_NAME),
                cfg.runs,
            )?);
            Ok(())
        })
        .with_context(|| format!("index scenario, {size} rows, indexed"))?;
    }

    for &size in &cfg.sizes {
        log::info!("index: {size} accounts, name index off");
        with_connection(&cfg.db, |conn| {
            setup_accounts(conn, size, cfg.target_id, cfg.batch_size, false)?;
            results.name_unindexed.push(measure(
                &mut AccountLookup::by_name(conn, TARGET_NAME),
                cfg.runs,
            )?);
            Ok(())
        })
        .with_context(|| format!("index scenario, {size} rows, unindexed"))?;
    }

    Ok(results)
}

/// One relationship operation measured on the small and large datasets.
#[derive(Debug, Clone)]
pub struct RelationTiming {
    pub label: &'static str,
    pub small: Summary,
    pub large: Summary,
}

pub const PRODUCT_QUERY_LABEL: &str = "Product by category and review rating, update stock";
pub const PERSON_QUERY_LABEL: &str = "Person by city and hobby, update bio";

fn measure_relations(cfg: &BenchConfig, dataset: Dataset) -> Result<(Summary, Summary)> {
    with_connection(&cfg.db, |conn| {
        relations::setup(conn, dataset)?;
        let product = measure(&mut ProductStockRoundTrip::new(conn), cfg.runs)?;
        let person = measure(
            &mut PersonBioUpdate::new(conn, "Updated bio for testing"),
            cfg.runs,
        )?;
        Ok((product, person))
    })
    .with_context(|| format!("relations scenario, {} dataset", dataset.label()))
}

pub fn run_relations(cfg: &BenchConfig) -> Result<Vec<RelationTiming>> {
    log::info!("relations: small dataset");
    let (product_small, person_small) = measure_relations(cfg, Dataset::Small)?;
    log::info!("relations: large dataset");
    let (product_large, person_large) = measure_relations(cfg, Dataset::Large(cfg.catalog))?;

    Ok(vec![
        RelationTiming {
            label: PRODUCT_QUERY_LABEL,
            small: product_small,
            large: product_large,
        },
        RelationTiming {
            label: PERSON_QUERY_LABEL,
            small: person_small,
            large: person_large,
        },
    ])
}
