//! Raw SQL strategy: fixed statements, multi-row inserts, tuple rows.

use super::UserStore;
use crate::model::{User, USERS_DDL};
use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

/// Rows per `INSERT ... VALUES` statement; 8 columns each keeps the bound
/// parameter count well under SQLite's limit.
const ROWS_PER_STATEMENT: usize = 1_000;

type UserTuple = (i64, String, String, String, String, String, String, String);

fn read_tuple(row: &Row<'_>) -> rusqlite::Result<UserTuple> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

pub struct RawStore;

impl RawStore {
    fn insert_chunk(conn: &Connection, users: &[User]) -> Result<()> {
        let tuples: Vec<&str> = users
            .iter()
            .map(|_| "(?,?,?,?,?,?,?,?)")
            .collect();
        let sql = format!(
            "INSERT INTO users (id, name, email, phone, address, city, country, zipcode) VALUES {}",
            tuples.join(",")
        );

        let mut param_refs: Vec<&dyn ToSql> = Vec::with_capacity(users.len() * 8);
        for u in users {
            param_refs.push(&u.id);
            param_refs.push(&u.name);
            param_refs.push(&u.email);
            param_refs.push(&u.phone);
            param_refs.push(&u.address);
            param_refs.push(&u.city);
            param_refs.push(&u.country);
            param_refs.push(&u.zipcode);
        }

        conn.execute(&sql, param_refs.as_slice())?;
        Ok(())
    }
}

impl UserStore for RawStore {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn create_tables(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch("DROP TABLE IF EXISTS users")?;
        conn.execute_batch(USERS_DDL)?;
        Ok(())
    }

    fn insert_batch(&self, conn: &Connection, users: &[User]) -> Result<()> {
        if users.is_empty() {
            return Ok(());
        }
        let tx = conn.unchecked_transaction()?;
        for chunk in users.chunks(ROWS_PER_STATEMENT) {
            Self::insert_chunk(&tx, chunk)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self, conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM users", [])?;
        Ok(())
    }

    fn fetch_by_id(&self, conn: &Connection, id: i64) -> Result<usize> {
        let mut stmt = conn.prepare_cached("SELECT * FROM users WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => {
                read_tuple(row)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn fetch_page(&self, conn: &Connection, limit: usize) -> Result<usize> {
        let mut stmt = conn.prepare_cached("SELECT * FROM users LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], read_tuple)?;
        let mut result = Vec::with_capacity(limit);
        for r in rows {
            result.push(r?);
        }
        Ok(result.len())
    }

    fn fetch_all(&self, conn: &Connection) -> Result<usize> {
        let mut stmt = conn.prepare_cached("SELECT * FROM users")?;
        let rows = stmt.query_map([], read_tuple)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result.len())
    }
}
