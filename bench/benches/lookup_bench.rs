//! Criterion benchmark: lookup by primary key through the model layer and
//! through raw SQL, at two table sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use orm_bench::config::DbConfig;
use orm_bench::populate::setup_users;
use orm_bench::store::all_stores;
use std::time::Duration;

const TARGET_ID: i64 = 42;

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_by_id");
    group.measurement_time(Duration::from_secs(10));

    for store in all_stores() {
        for size in [100_usize, 10_000] {
            let conn = DbConfig::in_memory().open().expect("open database");
            setup_users(&conn, store.as_ref(), size, TARGET_ID, 1_000).expect("populate users");

            group.bench_with_input(BenchmarkId::new(store.name(), size), &size, |b, _| {
                b.iter(|| {
                    let rows = store.fetch_by_id(&conn, TARGET_ID).expect("lookup failed");
                    assert_eq!(rows, 1);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
