//! Integration tests: population, both access strategies, and each scenario
//! end to end on small tables.

use harness::{measure, Operation};
use orm_bench::config::{with_connection, BenchConfig, DbConfig};
use orm_bench::model::{QuerySet, User};
use orm_bench::populate::{setup_accounts, setup_users, TARGET_NAME};
use orm_bench::query::{AccountLookup, BoundQuery, UserQuery};
use orm_bench::relations::{
    self, CatalogSize, Dataset, PersonBioUpdate, ProductStockRoundTrip, LAPTOP_FIVE_STAR_REVIEWS,
};
use orm_bench::scenario::{run_basic, run_index, run_relations, run_size, PAGE_SIZE};
use orm_bench::store::{all_stores, UserStore};
use rusqlite::Connection;

fn open() -> Connection {
    DbConfig::in_memory().open().expect("open")
}

fn small_config() -> BenchConfig {
    BenchConfig {
        runs: 2,
        sizes: vec![1, 10, 50],
        batch_size: 7,
        basic_rows: 30,
        catalog: CatalogSize {
            categories: 10,
            products: 500,
            reviews: 500,
        },
        ..BenchConfig::default()
    }
}

fn user_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap()
}

// ── Access strategies ───────────────────────────────────────────────

#[test]
fn both_stores_populate_identical_tables() {
    let mut snapshots = Vec::new();
    for store in all_stores() {
        let conn = open();
        setup_users(&conn, store.as_ref(), 25, 42, 10).unwrap();
        assert_eq!(user_count(&conn), 25, "{}", store.name());

        let mut users = QuerySet::<User>::new(&conn).order_by("id").all().unwrap();
        users.sort_by_key(|u| u.id);
        snapshots.push(users);
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

#[test]
fn fetch_counts_match_across_stores() {
    for store in all_stores() {
        let conn = open();
        setup_users(&conn, store.as_ref(), 40, 42, 1000).unwrap();

        assert_eq!(store.fetch_by_id(&conn, 42).unwrap(), 1, "{}", store.name());
        assert_eq!(store.fetch_by_id(&conn, 999).unwrap(), 0);
        assert_eq!(store.fetch_page(&conn, PAGE_SIZE).unwrap(), PAGE_SIZE);
        assert_eq!(store.fetch_page(&conn, 100).unwrap(), 40);
        assert_eq!(store.fetch_all(&conn).unwrap(), 40);

        store.clear(&conn).unwrap();
        assert_eq!(store.fetch_all(&conn).unwrap(), 0);
    }
}

#[test]
fn target_row_present_at_every_size() {
    let conn = open();
    for store in all_stores() {
        for size in [1, 2, 41, 42, 43] {
            setup_users(&conn, store.as_ref(), size, 42, 5).unwrap();
            assert_eq!(user_count(&conn), size as i64);
            assert_eq!(store.fetch_by_id(&conn, 42).unwrap(), 1);
        }
    }
}

#[test]
fn bound_query_runs_through_harness() {
    let conn = open();
    let stores = all_stores();
    let store = stores[0].as_ref();
    setup_users(&conn, store, 20, 42, 1000).unwrap();

    let mut op = BoundQuery::new(&conn, store, UserQuery::All);
    assert_eq!(op.run().unwrap(), 20);

    let summary = measure(&mut op, 3).unwrap();
    assert_eq!(summary.count, 3);
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);
}

#[test]
fn query_on_missing_table_fails_on_first_run() {
    let conn = open();
    for store in all_stores() {
        let mut op = BoundQuery::new(&conn, store.as_ref(), UserQuery::ById(1));
        assert!(measure(&mut op, 5).is_err(), "{}", store.name());
    }
}

// ── Accounts and index ──────────────────────────────────────────────

#[test]
fn accounts_have_single_target_name_and_optional_index() {
    let conn = open();
    for with_index in [true, false] {
        setup_accounts(&conn, 100, 42, 30, with_index).unwrap();

        let named: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM accounts WHERE name = ?1",
                [TARGET_NAME],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(named, 1);

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name = 'idx_accounts_name'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(indexes, i64::from(with_index));

        assert_eq!(AccountLookup::by_id(&conn, 42).run().unwrap(), Some(42));
        assert_eq!(AccountLookup::by_name(&conn, TARGET_NAME).run().unwrap(), Some(42));
        assert_eq!(AccountLookup::by_name(&conn, "Nobody").run().unwrap(), None);
    }
}

// ── Relations ───────────────────────────────────────────────────────

#[test]
fn relation_operations_find_fixtures_on_both_datasets() {
    for dataset in [Dataset::Small, Dataset::Large(CatalogSize::default())] {
        let conn = open();
        relations::setup(&conn, dataset).unwrap();

        let mut product = ProductStockRoundTrip::new(&conn);
        let id = product.run().unwrap();
        let stock_before: i64 = conn
            .query_row("SELECT stock FROM products WHERE id = ?1", [id], |r| r.get(0))
            .unwrap();
        product.run().unwrap();
        let stock_after: i64 = conn
            .query_row("SELECT stock FROM products WHERE id = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(stock_before, stock_after, "{} dataset", dataset.label());

        let name = PersonBioUpdate::new(&conn, "new bio").run().unwrap();
        assert_eq!(name, "John Doe");
    }
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

fn laptop_five_star_reviews(conn: &Connection) -> i64 {
    count(
        conn,
        "SELECT COUNT(*) FROM reviews r
         JOIN products p ON p.id = r.product_id
         JOIN categories c ON c.id = p.category_id
         WHERE p.name = 'Laptop' AND c.name = 'Electronics' AND r.rating = 5",
    )
}

#[test]
fn large_catalog_follows_configured_counts() {
    let conn = open();
    let size = CatalogSize {
        categories: 5,
        products: 200,
        reviews: 300,
    };
    relations::setup(&conn, Dataset::Large(size)).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM categories"), 5);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM products"), 200);
    let reviews = count(&conn, "SELECT COUNT(*) FROM reviews");
    assert!(
        (300..=300 + LAPTOP_FIVE_STAR_REVIEWS as i64).contains(&reviews),
        "{reviews} reviews"
    );
    assert!(laptop_five_star_reviews(&conn) >= LAPTOP_FIVE_STAR_REVIEWS as i64);

    let laptop: i64 = conn
        .query_row("SELECT id FROM products WHERE name = 'Laptop'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(ProductStockRoundTrip::new(&conn).run().unwrap(), laptop);
}

#[test]
fn laptop_gets_five_star_reviews_even_with_one_review_requested() {
    let conn = open();
    let size = CatalogSize {
        categories: 1,
        products: 1,
        reviews: 1,
    };
    relations::setup(&conn, Dataset::Large(size)).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM products"), 1);
    assert_eq!(
        laptop_five_star_reviews(&conn),
        LAPTOP_FIVE_STAR_REVIEWS as i64
    );
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM reviews"),
        LAPTOP_FIVE_STAR_REVIEWS as i64
    );
}

#[test]
fn relation_operation_fails_without_schema() {
    let conn = open();
    assert!(ProductStockRoundTrip::new(&conn).run().is_err());
}

// ── Scenarios ───────────────────────────────────────────────────────

#[test]
fn basic_scenario_times_each_query_per_store() {
    let timings = run_basic(&small_config()).unwrap();
    assert_eq!(timings.len(), 6);

    let rows: Vec<usize> = timings.iter().map(|t| t.rows).collect();
    assert_eq!(rows, [1, PAGE_SIZE, 30, 1, PAGE_SIZE, 30]);
    assert!(timings.iter().all(|t| t.ms >= 0.0));
}

#[test]
fn size_scenario_summarises_every_size() {
    let cfg = BenchConfig {
        rounds: 2,
        ..small_config()
    };
    let series = run_size(&cfg).unwrap();

    let stores: Vec<&str> = series.iter().map(|s| s.store).collect();
    assert_eq!(stores, ["model", "raw"]);
    for s in &series {
        let sizes: Vec<usize> = s.rows.iter().map(|(size, _)| *size).collect();
        assert_eq!(sizes, cfg.sizes);
        // samples pooled over both rounds
        assert!(s.rows.iter().all(|(_, summary)| summary.count == 4));
    }
}

#[test]
fn index_scenario_fills_every_table() {
    let cfg = small_config();
    let results = run_index(&cfg).unwrap();

    assert_eq!(results.sizes, cfg.sizes);
    assert_eq!(results.pk_indexed.len(), 3);
    assert_eq!(results.name_indexed.len(), 3);
    assert_eq!(results.name_unindexed.len(), 3);
    assert!(results.pk_indexed.iter().all(|s| s.count == cfg.runs));
}

#[test]
fn relations_scenario_reports_both_operations() {
    let timings = run_relations(&small_config()).unwrap();
    assert_eq!(timings.len(), 2);
    for t in &timings {
        assert_eq!(t.small.count, 2);
        assert_eq!(t.large.count, 2);
    }
}

#[test]
fn scenarios_run_against_a_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = BenchConfig {
        db: DbConfig::file(dir.path().join("bench.db")),
        ..small_config()
    };

    let series = run_size(&cfg).unwrap();
    assert_eq!(series.len(), 2);

    let left: i64 = with_connection(&cfg.db, |conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
    })
    .unwrap();
    assert_eq!(left, 50);
}
