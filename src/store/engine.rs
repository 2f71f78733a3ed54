//! The SQLite-backed store.
//!
//! `Store` holds nothing but the database path. Every operation opens its
//! own connection (created on first use, WAL journal, 5 second busy
//! timeout) and closes it before returning. Statements arrive as opaque
//! text from the wire and are executed verbatim; the store's only job is to
//! run them, serialize results, and turn engine failures into error values
//! instead of panics.

use crate::store::report::{FileEntry, LoginEntry, ServerReport};
use crate::store::schema::SQLITE_INIT;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteRow};
use sqlx::{Connection, Row, ValueRef};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How long a statement waits on SQLite's file lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors produced by store operations.
///
/// Engine errors carry the message text SQLite reported for the statement;
/// the dispatcher forwards that text to the client. Driver errors are
/// connection-level faults in the SQLite driver itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The SQLite engine rejected or failed a statement.
    #[error("{0}")]
    Engine(String),

    /// Connection-level or driver-level failure.
    #[error(transparent)]
    Driver(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => StoreError::Engine(db.message().to_owned()),
            other => StoreError::Driver(other),
        }
    }
}

/// SQLite-backed store for the Users, Logins and Files tables.
#[derive(Debug, Clone)]
pub struct Store {
    /// Path of the database file
    db_path: PathBuf,
}

impl Store {
    /// Creates a store for the given database file.
    ///
    /// Nothing is opened or created until the first operation runs; call
    /// [`Store::init_schema`] before serving traffic.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// The database file this store operates on.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Opens a fresh connection for a single operation.
    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        Ok(SqliteConnection::connect_with(&options).await?)
    }

    /// Idempotently creates the three tables.
    ///
    /// Safe to run against an already-initialized database file: the DDL is
    /// all `CREATE TABLE IF NOT EXISTS`, so existing data is untouched.
    /// Must succeed before the server starts accepting connections.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;

        let outcome = async {
            // sqlx prepares one statement at a time, so run the DDL
            // statement by statement.
            for statement in SQLITE_INIT.split(';') {
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }
                sqlx::query(statement).execute(&mut conn).await?;
            }
            Ok::<(), StoreError>(())
        }
        .await;

        let _ = conn.close().await;
        outcome
    }

    /// Runs a single non-query statement (INSERT/UPDATE/DELETE/DDL) and
    /// commits it.
    pub async fn execute(&self, statement: &str) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let outcome = sqlx::query(statement).execute(&mut conn).await;
        let _ = conn.close().await;

        outcome?;
        Ok(())
    }

    /// Runs a single row-returning statement and serializes all rows.
    ///
    /// Zero matching rows serialize to the empty string, which is a
    /// successful result, not an error.
    pub async fn query(&self, statement: &str) -> Result<String, StoreError> {
        let mut conn = self.connect().await?;
        let outcome = sqlx::query(statement).fetch_all(&mut conn).await;
        let _ = conn.close().await;

        serialize_rows(&outcome?)
    }

    /// Fetches the current contents of all three tables for the operator
    /// report.
    pub async fn report(&self) -> Result<ServerReport, StoreError> {
        let mut conn = self.connect().await?;

        let outcome = async {
            let users: Vec<(String,)> = sqlx::query_as("SELECT username FROM Users")
                .fetch_all(&mut conn)
                .await?;

            let logins: Vec<(String, String, Option<String>)> =
                sqlx::query_as("SELECT username, login_time, logout_time FROM Logins")
                    .fetch_all(&mut conn)
                    .await?;

            let files: Vec<(String, String)> =
                sqlx::query_as("SELECT username, filename FROM Files")
                    .fetch_all(&mut conn)
                    .await?;

            Ok::<ServerReport, StoreError>(ServerReport {
                users: users.into_iter().map(|(username,)| username).collect(),
                logins: logins
                    .into_iter()
                    .map(|(username, login_time, logout_time)| LoginEntry {
                        username,
                        login_time,
                        logout_time,
                    })
                    .collect(),
                files: files
                    .into_iter()
                    .map(|(username, filename)| FileEntry { username, filename })
                    .collect(),
            })
        }
        .await;

        let _ = conn.close().await;
        outcome
    }
}

/// Serializes query results: column values joined by a single space within
/// a row, rows joined by `|`.
///
/// `[("a", 1), ("b", 2)]` serializes as `"a 1|b 2"`.
fn serialize_rows(rows: &[SqliteRow]) -> Result<String, StoreError> {
    let mut lines = Vec::with_capacity(rows.len());

    for row in rows {
        let mut cells = Vec::with_capacity(row.columns().len());
        for idx in 0..row.columns().len() {
            cells.push(render_value(row, idx)?);
        }
        lines.push(cells.join(" "));
    }

    Ok(lines.join("|"))
}

/// Renders one column value as text.
///
/// TEXT passes through verbatim; INTEGER and REAL use their decimal
/// representation; NULL renders as `NULL`; BLOB is decoded as lossy UTF-8
/// to keep the response printable.
fn render_value(row: &SqliteRow, idx: usize) -> Result<String, StoreError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok("NULL".to_owned());
    }

    if let Ok(text) = row.try_get::<String, _>(idx) {
        return Ok(text);
    }
    if let Ok(int) = row.try_get::<i64, _>(idx) {
        return Ok(int.to_string());
    }
    if let Ok(real) = row.try_get::<f64, _>(idx) {
        return Ok(real.to_string());
    }

    let blob = row.try_get::<Vec<u8>, _>(idx)?;
    Ok(String::from_utf8_lossy(&blob).into_owned())
}
