//! Data population: generates synthetic rows for the benchmark tables.
//!
//! All generators take a seeded RNG so runs are reproducible; the row
//! contents follow fixed patterns keyed on the row id.

use crate::model::{insert_many, Account, User, ACCOUNTS_DDL};
use crate::store::UserStore;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

pub const USER_SEED: u64 = 0x5EED_0000_0000_0001;
pub const ACCOUNT_SEED: u64 = 0x5EED_0000_0000_0002;

/// Name given to the target account in the index scenario; every other
/// account name is unique and different.
pub const TARGET_NAME: &str = "John Doe";

/// Build the user row for `id`.
pub fn make_user(id: i64, rng: &mut impl Rng) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: format!("user{id}@example.com"),
        phone: format!("+7{}", rng.gen_range(9_000_000_000_u64..=9_999_999_999)),
        address: format!("Street {id}"),
        city: format!("City {}", id % 100),
        country: format!("Country {}", id % 10),
        zipcode: format!("{}", 10_000 + id),
    }
}

/// `size` distinct ids that always include `target_id`: the target first,
/// then 1, 2, 3, ... skipping the target.
pub fn ids_including_target(size: usize, target_id: i64) -> Vec<i64> {
    if size == 0 {
        return Vec::new();
    }
    let mut ids = Vec::with_capacity(size);
    ids.push(target_id);
    ids.extend((1..).filter(|&id| id != target_id).take(size - 1));
    ids
}

/// Insert users for `ids` through `store`, `batch_size` rows per transaction.
///
/// Returns the number of rows inserted.
pub fn populate_users(
    conn: &Connection,
    store: &dyn UserStore,
    ids: &[i64],
    batch_size: usize,
) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(USER_SEED);
    let batch_size = batch_size.max(1);

    let mut inserted = 0;
    for (n, chunk) in ids.chunks(batch_size).enumerate() {
        let batch: Vec<User> = chunk.iter().map(|&id| make_user(id, &mut rng)).collect();
        store.insert_batch(conn, &batch)?;
        inserted += batch.len();
        log::debug!(
            "{}: batch {} committed ({} of {} rows)",
            store.name(),
            n + 1,
            inserted,
            ids.len()
        );
    }
    Ok(inserted)
}

/// Recreate the `users` table with `size` rows including `target_id`.
pub fn setup_users(
    conn: &Connection,
    store: &dyn UserStore,
    size: usize,
    target_id: i64,
    batch_size: usize,
) -> Result<()> {
    store.create_tables(conn)?;
    let ids = ids_including_target(size, target_id);
    populate_users(conn, store, &ids, batch_size)?;
    Ok(())
}

pub fn make_account(id: i64, rng: &mut impl Rng) -> Account {
    Account {
        id,
        username: format!("user{id}"),
        name: format!("User Name {id}"),
        email: format!("user{id}@example.com"),
        // roughly three out of four accounts are active
        is_active: rng.gen_range(0..4) != 0,
    }
}

/// Recreate the `accounts` table with `size` rows, optionally indexing
/// `name`, and refresh planner statistics.
///
/// The target account carries [`TARGET_NAME`]; the other ids skip it.
pub fn setup_accounts(
    conn: &Connection,
    size: usize,
    target_id: i64,
    batch_size: usize,
    with_index: bool,
) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS accounts")?;
    conn.execute_batch(ACCOUNTS_DDL)?;
    if with_index {
        conn.execute_batch("CREATE INDEX idx_accounts_name ON accounts (name)")?;
    }

    let mut rng = StdRng::seed_from_u64(ACCOUNT_SEED);
    let ids = ids_including_target(size, target_id);
    for chunk in ids.chunks(batch_size.max(1)) {
        let batch: Vec<Account> = chunk
            .iter()
            .map(|&id| {
                let mut account = make_account(id, &mut rng);
                if id == target_id {
                    account.name = TARGET_NAME.to_string();
                    account.is_active = true;
                }
                account
            })
            .collect();
        insert_many(conn, &batch)?;
    }

    conn.execute_batch("ANALYZE accounts")?;
    log::debug!(
        "accounts: {} rows, name index {}",
        ids.len(),
        if with_index { "on" } else { "off" }
    );
    Ok(())
}
