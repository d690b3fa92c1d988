//! # Persistence
//!
//! One SQLite connection behind a mutex. Data access lives in [`queries`]
//! as free functions taking the connection explicitly; [`Database`] only
//! hands it out for the duration of a closure.

pub mod queries;

use crate::error::{DbError, DbResult};
use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file and migrate it to the latest schema
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|e| DbError::Open {
            path: path.clone(),
            source: e,
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn, Some(path))?;
        tracing::info!(path = ?db.path, "database ready");
        Ok(db)
    }

    /// Private database that disappears with the handle
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;
        Self::init(conn, None)
    }

    fn init(mut conn: Connection, path: Option<PathBuf>) -> DbResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::migrations()
            .to_latest(&mut conn)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn migrations() -> Migrations<'static> {
        Migrations::new(vec![M::up(include_str!("migrations/001_init.sql"))])
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with exclusive access to the connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut conn)
    }

    /// [`Database::with_conn`] on the blocking pool
    pub async fn call<F, T>(self: &Arc<Self>, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(self);
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| DbError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_valid() {
        assert!(Database::migrations().validate().is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.sqlite");

        let db = Database::open(&path).unwrap();
        db.with_conn(|conn| {
            queries::insert_document(
                conn,
                &quire_common::NewDocument {
                    title: "Kept".to_string(),
                },
            )
        })
        .unwrap();
        drop(db);

        let db = Database::open(&path).unwrap();
        let docs = db.with_conn(|conn| queries::list_documents(conn)).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Kept");
    }
}
