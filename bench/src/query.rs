//! Timed query capabilities handed to the harness.
//!
//! Each value owns borrows of everything it needs to run, so the harness
//! only ever sees `Operation::run`.

use crate::store::UserStore;
use anyhow::Result;
use harness::Operation;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserQuery {
    ById(i64),
    Page(usize),
    All,
}

impl UserQuery {
    pub fn label(&self) -> String {
        match self {
            UserQuery::ById(id) => format!("Fetch user with id {id}"),
            UserQuery::Page(n) => format!("Fetch first {n} users"),
            UserQuery::All => "Fetch all users".to_string(),
        }
    }
}

/// A [`UserQuery`] bound to a connection and an access strategy.
pub struct BoundQuery<'a> {
    conn: &'a Connection,
    store: &'a dyn UserStore,
    query: UserQuery,
}

impl<'a> BoundQuery<'a> {
    pub fn new(conn: &'a Connection, store: &'a dyn UserStore, query: UserQuery) -> Self {
        Self { conn, store, query }
    }
}

impl Operation for BoundQuery<'_> {
    type Output = usize;

    fn run(&mut self) -> Result<usize> {
        match self.query {
            UserQuery::ById(id) => self.store.fetch_by_id(self.conn, id),
            UserQuery::Page(n) => self.store.fetch_page(self.conn, n),
            UserQuery::All => self.store.fetch_all(self.conn),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountColumn {
    Id,
    Name,
}

/// Single-row account lookup on one column.
pub struct AccountLookup<'a> {
    conn: &'a Connection,
    column: AccountColumn,
    value: Value,
}

impl<'a> AccountLookup<'a> {
    pub fn by_id(conn: &'a Connection, id: i64) -> Self {
        Self {
            conn,
            column: AccountColumn::Id,
            value: Value::Integer(id),
        }
    }

    pub fn by_name(conn: &'a Connection, name: &str) -> Self {
        Self {
            conn,
            column: AccountColumn::Name,
            value: Value::Text(name.to_string()),
        }
    }
}

impl Operation for AccountLookup<'_> {
    /// Id of the matched account, if any.
    type Output = Option<i64>;

    fn run(&mut self) -> Result<Option<i64>> {
        let sql = match self.column {
            AccountColumn::Id => "SELECT * FROM accounts WHERE id = ?1",
            AccountColumn::Name => "SELECT * FROM accounts WHERE name = ?1",
        };
        let mut stmt = self.conn.prepare_cached(sql)?;
        let id = stmt
            .query_row(params![self.value], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(id)
    }
}
