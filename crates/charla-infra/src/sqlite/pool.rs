//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a
//! `DatabasePool` with a multi-connection reader pool for concurrent reads
//! and a single-connection writer pool for serialized writes. Both use WAL
//! journal mode and enforce foreign keys. The single writer is also what
//! serializes per-chat sequence assignment: no two appends can interleave
//! their read-max/insert step.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use charla_types::error::StoreError;

/// The three tables of the store and the columns each must carry.
/// Used to reject a pre-existing incompatible layout at startup.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("users", &["id", "email", "username", "password_hash", "name", "created_at"]),
    ("chats", &["id", "user_id", "title", "created_at"]),
    ("messages", &["id", "chat_id", "seq", "role", "content", "created_at"]),
];

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS chats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
        seq INTEGER NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('system', 'user', 'model')),
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (chat_id, seq)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_chats_user ON chats(user_id, created_at DESC)",
];

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone, Debug)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool with split reader/writer connections.
    ///
    /// Runs `ensure_schema` on the writer pool before opening the reader.
    /// Both pools use WAL journal mode, foreign key enforcement, and a
    /// 5-second busy timeout.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let base_opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        ensure_schema(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Self { reader, writer })
    }
}

/// Idempotently create the three tables (and indexes) if absent.
///
/// Safe to call on every open: `CREATE TABLE IF NOT EXISTS` is a no-op when
/// the table exists. A pre-existing table missing required columns means the
/// file holds some other schema; that is fatal (`StoreError::Schema`) rather
/// than something to repair silently.
pub async fn ensure_schema(writer: &SqlitePool) -> Result<(), StoreError> {
    for (table, columns) in REQUIRED_COLUMNS {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(writer)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;

        if exists.is_some() {
            let info: Vec<(i64, String)> =
                sqlx::query_as(&format!("SELECT cid, name FROM pragma_table_info('{table}')"))
                    .fetch_all(writer)
                    .await
                    .map_err(|e| StoreError::Query(e.to_string()))?;
            let present: Vec<&str> = info.iter().map(|(_, name)| name.as_str()).collect();
            for column in *columns {
                if !present.contains(column) {
                    return Err(StoreError::Schema(format!(
                        "table '{table}' exists but lacks column '{column}'"
                    )));
                }
            }
        }
    }

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
    }

    Ok(())
}

/// Returns the default database URL under the resolved data directory.
pub fn default_database_url(data_dir: &std::path::Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("charla.db").display())
}
