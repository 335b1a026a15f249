//! A small typed model layer: rows map to structs and queries are composed
//! with a builder that renders SQL at call time.
//!
//! This is the "ORM-mediated" side of the benchmarks: every call renders SQL,
//! validates column names and materialises structs.

use anyhow::{bail, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::marker::PhantomData;

/// A table-backed record. `COLUMNS[0]` must be the primary key.
pub trait Model: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column values in `COLUMNS` order.
    fn values(&self) -> Vec<Value>;
}

/// Lazily rendered `SELECT` over one model's table.
pub struct QuerySet<'c, M: Model> {
    conn: &'c Connection,
    filters: Vec<(&'static str, Value)>,
    order_by: Option<&'static str>,
    limit: Option<usize>,
    _model: PhantomData<M>,
}

impl<'c, M: Model> QuerySet<'c, M> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            filters: Vec::new(),
            order_by: None,
            limit: None,
            _model: PhantomData,
        }
    }

    /// Add an equality condition; conditions are combined with `AND`.
    pub fn filter(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    fn check_column(column: &str) -> Result<()> {
        if !M::COLUMNS.contains(&column) {
            bail!("{} has no column {column:?}", M::TABLE);
        }
        Ok(())
    }

    fn where_clause(&self) -> Result<String> {
        if self.filters.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(self.filters.len());
        for (i, (column, _)) in self.filters.iter().enumerate() {
            Self::check_column(column)?;
            parts.push(format!("{column} = ?{}", i + 1));
        }
        Ok(format!(" WHERE {}", parts.join(" AND ")))
    }

    fn filter_values(&self) -> impl Iterator<Item = &Value> {
        self.filters.iter().map(|(_, v)| v)
    }

    /// Render the `SELECT` this query set would run.
    pub fn to_sql(&self) -> Result<String> {
        let mut sql = format!(
            "SELECT {} FROM {}{}",
            M::COLUMNS.join(", "),
            M::TABLE,
            self.where_clause()?
        );
        if let Some(column) = self.order_by {
            Self::check_column(column)?;
            sql.push_str(&format!(" ORDER BY {column}"));
        }
        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }
        Ok(sql)
    }

    pub fn all(&self) -> Result<Vec<M>> {
        let sql = self.to_sql()?;
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(self.filter_values()), M::from_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    pub fn first(self) -> Result<Option<M>> {
        let query = self.limit(1);
        let sql = query.to_sql()?;
        let mut stmt = query.conn.prepare_cached(&sql)?;
        let row = stmt
            .query_row(params_from_iter(query.filter_values()), M::from_row)
            .optional()?;
        Ok(row)
    }

    pub fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", M::TABLE, self.where_clause()?);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let n: i64 = stmt.query_row(params_from_iter(self.filter_values()), |r| r.get(0))?;
        Ok(n as usize)
    }

    pub fn delete(&self) -> Result<usize> {
        let sql = format!("DELETE FROM {}{}", M::TABLE, self.where_clause()?);
        let n = self
            .conn
            .execute(&sql, params_from_iter(self.filter_values()))?;
        Ok(n)
    }

    /// Set one column on every matching row.
    pub fn update(&self, column: &'static str, value: impl Into<Value>) -> Result<usize> {
        Self::check_column(column)?;
        // The new value takes the placeholder after the filter values.
        let placeholder = self.filters.len() + 1;
        let sql = format!(
            "UPDATE {} SET {column} = ?{placeholder}{}",
            M::TABLE,
            self.where_clause()?
        );
        let value = value.into();
        let n = self.conn.execute(
            &sql,
            params_from_iter(self.filter_values().chain(std::iter::once(&value))),
        )?;
        Ok(n)
    }
}

/// Fetch one record by primary key.
pub fn get<M: Model>(conn: &Connection, id: i64) -> Result<Option<M>> {
    QuerySet::<M>::new(conn).filter(M::COLUMNS[0], id).first()
}

/// Insert `rows` in a single transaction.
pub fn insert_many<M: Model>(conn: &Connection, rows: &[M]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let placeholders: Vec<String> = (1..=M::COLUMNS.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        M::TABLE,
        M::COLUMNS.join(", "),
        placeholders.join(", ")
    );

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare_cached(&sql)?;
        for row in rows {
            stmt.execute(params_from_iter(row.values()))?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

impl Model for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "email", "phone", "address", "city", "country", "zipcode",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            address: row.get(4)?,
            city: row.get(5)?,
            country: row.get(6)?,
            zipcode: row.get(7)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.phone.clone()),
            Value::Text(self.address.clone()),
            Value::Text(self.city.clone()),
            Value::Text(self.country.clone()),
            Value::Text(self.zipcode.clone()),
        ]
    }
}

/// Row of the `accounts` table used by the index scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

impl Model for Account {
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static [&'static str] = &["id", "username", "name", "email", "is_active"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            is_active: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.username.clone()),
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Integer(self.is_active as i64),
        ]
    }
}

/// DDL for the `users` table.
pub const USERS_DDL: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255),
    email VARCHAR(255),
    phone VARCHAR(255),
    address VARCHAR(255),
    city VARCHAR(255),
    country VARCHAR(255),
    zipcode VARCHAR(255)
)";

/// DDL for the `accounts` table. The optional `name` index is created
/// separately.
pub const ACCOUNTS_DDL: &str = "CREATE TABLE accounts (
    id INTEGER PRIMARY KEY,
    username VARCHAR(150) UNIQUE NOT NULL,
    name VARCHAR(150) NOT NULL,
    email VARCHAR(254) UNIQUE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE
)";

#[cfg(test)]
mod tests {
    use super::{get, insert_many, QuerySet, User, USERS_DDL};
    use rusqlite::Connection;

    fn user(id: i64, city: &str) -> User {
        User {
            id,
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            phone: "+79000000000".to_string(),
            address: format!("Street {id}"),
            city: city.to_string(),
            country: "Country 1".to_string(),
            zipcode: format!("{}", 10_000 + id),
        }
    }

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(USERS_DDL).unwrap();
        insert_many(
            &conn,
            &[user(1, "Oslo"), user(2, "Lima"), user(3, "Oslo")],
        )
        .unwrap();
        conn
    }

    #[test]
    fn renders_filters_order_and_limit() {
        let conn = Connection::open_in_memory().unwrap();
        let sql = QuerySet::<User>::new(&conn)
            .filter("city", "Oslo".to_string())
            .filter("country", "Country 1".to_string())
            .order_by("id")
            .limit(5)
            .to_sql()
            .unwrap();

        assert_eq!(
            sql,
            "SELECT id, name, email, phone, address, city, country, zipcode FROM users \
             WHERE city = ?1 AND country = ?2 ORDER BY id LIMIT 5"
        );
    }

    #[test]
    fn unknown_column_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(QuerySet::<User>::new(&conn)
            .filter("shoe_size", 42)
            .to_sql()
            .is_err());
    }

    #[test]
    fn get_maps_row_to_struct() {
        let conn = seeded();
        let found: User = get(&conn, 2).unwrap().unwrap();
        assert_eq!(found, user(2, "Lima"));
        assert!(get::<User>(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn filter_count_update_delete() {
        let conn = seeded();
        let oslo = || QuerySet::<User>::new(&conn).filter("city", "Oslo".to_string());

        assert_eq!(oslo().count().unwrap(), 2);
        assert_eq!(oslo().order_by("id").all().unwrap()[1].id, 3);

        assert_eq!(oslo().update("zipcode", "0150".to_string()).unwrap(), 2);
        assert_eq!(
            QuerySet::<User>::new(&conn)
                .filter("zipcode", "0150".to_string())
                .count()
                .unwrap(),
            2
        );

        assert_eq!(oslo().delete().unwrap(), 2);
        assert_eq!(QuerySet::<User>::new(&conn).count().unwrap(), 1);
    }
}
