//! Chat and message types for Charla.
//!
//! A `Chat` is a conversation thread owned by one user; a `Message` is one
//! turn within it. Messages carry a per-chat sequence number that defines
//! replay order -- timestamps are informational only, since two writes can
//! share a timestamp at second resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Title given to chats created without an explicit one.
pub const DEFAULT_CHAT_TITLE: &str = "New conversation";

/// Role of a message within a chat.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('system', 'user', 'model'))`.
/// The `model` spelling (rather than `assistant`) matches the Gemini wire
/// format, so stored rows replay without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A conversation thread.
///
/// Chats are created lazily the first time a user submits a prompt without
/// an existing chat id, and deleted only as a unit with their messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A single turn within a chat.
///
/// `seq` is unique and contiguous-from-1 per chat, assigned in write order.
/// Messages are write-once: never updated, deleted only with the whole chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub seq: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
