//! Text-generation types for Charla.
//!
//! The conversation core treats the remote model as an opaque function from
//! an ordered context to text. These types model that boundary: the context
//! entries replayed to the model and the errors the call can produce.

use serde::{Deserialize, Serialize};

use crate::chat::{Message, Role};

/// One role/content pair in the context replayed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for ContextEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Errors from the external text-generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("model returned no text")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_entry_from_message() {
        let message = Message {
            id: 3,
            chat_id: 1,
            seq: 2,
            role: Role::Model,
            content: "hola".to_string(),
            created_at: chrono::Utc::now(),
        };
        let entry = ContextEntry::from(&message);
        assert_eq!(entry.role, Role::Model);
        assert_eq!(entry.content, "hola");
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Timeout { secs: 120 };
        assert_eq!(err.to_string(), "generation timed out after 120s");
    }
}
