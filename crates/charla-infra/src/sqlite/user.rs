//! SQLite user repository implementation.
//!
//! Registration and login mirror the storage-boundary policy: uniqueness
//! violations and wrong credentials are normal outcomes (`false`/`None`),
//! while unexpected faults propagate as `StoreError`.

use charla_core::user::repository::UserRepository;
use charla_types::error::StoreError;
use charla_types::user::User;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use crate::crypto::hash::{hash_password, verify_password};

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: i64,
    email: String,
    username: String,
    name: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, StoreError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))?;
        Ok(User {
            id: self.id,
            email: self.email,
            username: self.username,
            name: self.name,
            password_hash: self.password_hash,
            created_at,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(true),
            // Duplicate email or username is an expected business outcome.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(StoreError::Query(e.to_string())),
        }
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user = UserRow::from_row(&row)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .into_user()?;

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user = UserRow::from_row(&row)
                    .map_err(|e| StoreError::Query(e.to_string()))?
                    .into_user()?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let created = repo.create_user("a@x.com", "pw", "A", "a").await.unwrap();
        assert!(created);

        let user = repo
            .find_user_by_credentials("a", "pw")
            .await
            .unwrap()
            .expect("user should log in");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "A");
        assert_ne!(user.password_hash, "pw", "password must not be stored as plaintext");

        assert!(repo.find_user_by_credentials("a", "wrong").await.unwrap().is_none());
        assert!(repo.find_user_by_credentials("nobody", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_returns_false() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        assert!(repo.create_user("a@x.com", "pw", "A", "a").await.unwrap());
        assert!(!repo.create_user("b@x.com", "pw", "B", "a").await.unwrap());
        assert!(!repo.create_user("a@x.com", "pw", "C", "c").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_user() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        repo.create_user("a@x.com", "pw", "A", "a").await.unwrap();
        let user = repo.find_user_by_credentials("a", "pw").await.unwrap().unwrap();

        let fetched = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "a");
        assert!(repo.get_user(999).await.unwrap().is_none());
    }
}
