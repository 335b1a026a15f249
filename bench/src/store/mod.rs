//! Data-access strategies and the common `UserStore` trait.
//!
//! Two implementations are provided:
//! - [`model::ModelStore`]: typed model layer, rows materialised as structs
//! - [`raw::RawStore`]: hand-written SQL, rows read as positional tuples

pub mod model;
pub mod raw;

use crate::model::User;
use anyhow::Result;
use rusqlite::Connection;

/// Trait implemented by each access strategy.
///
/// Every fetch returns the number of rows it materialised so callers can
/// check the work was actually done without caring about row shape.
pub trait UserStore {
    /// Human-readable name for reports.
    fn name(&self) -> &'static str;

    /// Drop and recreate the `users` table.
    fn create_tables(&self, conn: &Connection) -> Result<()>;

    /// Insert one batch of users in a single transaction.
    fn insert_batch(&self, conn: &Connection, users: &[User]) -> Result<()>;

    /// Delete every user row, keeping the table.
    fn clear(&self, conn: &Connection) -> Result<()>;

    /// Look up one user by primary key. Returns 0 or 1.
    fn fetch_by_id(&self, conn: &Connection, id: i64) -> Result<usize>;

    /// Read the first `limit` users.
    fn fetch_page(&self, conn: &Connection, limit: usize) -> Result<usize>;

    /// Read every user.
    fn fetch_all(&self, conn: &Connection) -> Result<usize>;
}

/// Both strategies, model layer first.
pub fn all_stores() -> Vec<Box<dyn UserStore>> {
    vec![Box::new(model::ModelStore), Box::new(raw::RawStore)]
}
