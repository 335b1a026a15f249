//! Model-layer strategy: every call goes through `QuerySet` and returns
//! fully built `User` values.

use super::UserStore;
use crate::model::{get, insert_many, QuerySet, User, USERS_DDL};
use anyhow::Result;
use rusqlite::Connection;

pub struct ModelStore;

impl UserStore for ModelStore {
    fn name(&self) -> &'static str {
        "model"
    }

    fn create_tables(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch("DROP TABLE IF EXISTS users")?;
        conn.execute_batch(USERS_DDL)?;
        Ok(())
    }

    fn insert_batch(&self, conn: &Connection, users: &[User]) -> Result<()> {
        insert_many(conn, users)?;
        Ok(())
    }

    fn clear(&self, conn: &Connection) -> Result<()> {
        QuerySet::<User>::new(conn).delete()?;
        Ok(())
    }

    fn fetch_by_id(&self, conn: &Connection, id: i64) -> Result<usize> {
        let user: Option<User> = get(conn, id)?;
        Ok(usize::from(user.is_some()))
    }

    fn fetch_page(&self, conn: &Connection, limit: usize) -> Result<usize> {
        let users = QuerySet::<User>::new(conn).limit(limit).all()?;
        Ok(users.len())
    }

    fn fetch_all(&self, conn: &Connection) -> Result<usize> {
        let users = QuerySet::<User>::new(conn).all()?;
        Ok(users.len())
    }
}
