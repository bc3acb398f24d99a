//! User identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account in the local store.
///
/// Created once at registration and never mutated or deleted by the core.
/// `email` and `username` are unique. The password is stored as an argon2id
/// hash, never as plaintext, and is skipped when serializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
