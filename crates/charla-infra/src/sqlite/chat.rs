//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `charla-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool, mutations on the single-connection writer pool.
//!
//! Sequence assignment happens inside the INSERT itself
//! (`COALESCE(MAX(seq), 0) + 1` in a sub-select), so the read-max/insert
//! pair is a single statement on the single-writer pool and concurrent
//! appends to the same chat cannot race.

use charla_core::chat::repository::ChatRepository;
use charla_types::chat::{Chat, DEFAULT_CHAT_TITLE, Message, Role};
use charla_types::error::StoreError;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: i64,
    user_id: i64,
    title: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, StoreError> {
        Ok(Chat {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: i64,
    chat_id: i64,
    seq: i64,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            seq: row.try_get("seq")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, StoreError> {
        let role: Role = self.role.parse().map_err(StoreError::Query)?;
        Ok(Message {
            id: self.id,
            chat_id: self.chat_id,
            seq: self.seq,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, user_id: i64, title: Option<&str>) -> Result<Chat, StoreError> {
        // Foreign-key discipline: a chat must reference an existing user.
        let user_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if user_exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let title = title.unwrap_or(DEFAULT_CHAT_TITLE);
        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO chats (user_id, title, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(title)
            .bind(format_datetime(&created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Chat {
            id: result.last_insert_rowid(),
            user_id,
            title: title.to_string(),
            created_at,
        })
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>, StoreError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| StoreError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(&self, user_id: i64) -> Result<Vec<Chat>, StoreError> {
        // id DESC breaks ties between chats created within the same instant.
        let rows =
            sqlx::query("SELECT * FROM chats WHERE user_id = ? ORDER BY created_at DESC, id DESC")
                .bind(user_id)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            chats.push(chat_row.into_chat()?);
        }
        Ok(chats)
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<(), StoreError> {
        // Messages and the chat row go as one atomic unit. Deleting a chat
        // that does not exist is a no-op, not an error.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn append_message(
        &self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Message, StoreError> {
        let chat_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if chat_exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let created_at = Utc::now();
        let row = sqlx::query(
            r#"INSERT INTO messages (chat_id, seq, role, content, created_at)
               SELECT ?1, COALESCE(MAX(seq), 0) + 1, ?2, ?3, ?4 FROM messages WHERE chat_id = ?1
               RETURNING id, seq"#,
        )
        .bind(chat_id)
        .bind(role.to_string())
        .bind(content)
        .bind(format_datetime(&created_at))
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let id: i64 = row.try_get("id").map_err(|e| StoreError::Query(e.to_string()))?;
        let seq: i64 = row.try_get("seq").map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Message {
            id,
            chat_id,
            seq,
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query("SELECT * FROM messages WHERE chat_id = ? ORDER BY seq ASC")
            .bind(chat_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }

    async fn message_count(&self, chat_id: i64) -> Result<u32, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(count as u32)
    }
}
