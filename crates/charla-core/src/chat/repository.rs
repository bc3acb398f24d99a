//! ChatRepository trait definition.
//!
//! Durable CRUD for chats and their messages. Implementations live in
//! charla-infra (e.g. `SqliteChatRepository`). Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).

use charla_types::chat::{Chat, Message, Role};
use charla_types::error::StoreError;

/// Repository trait for chat and message persistence.
///
/// Invariants implementations must uphold:
/// - `seq` values within a chat are unique, contiguous-from-1, and assigned
///   in write order; concurrent appends to the same chat must not produce
///   duplicates.
/// - A chat is deleted together with all of its messages as one atomic unit.
pub trait ChatRepository: Send + Sync {
    /// Insert a new chat for a user. Fails with `StoreError::NotFound` if
    /// the user does not exist. `None` title gets the default placeholder.
    fn create_chat(
        &self,
        user_id: i64,
        title: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Chat, StoreError>> + Send;

    /// Fetch a chat by id.
    fn get_chat(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, StoreError>> + Send;

    /// List a user's chats, most recent first.
    fn list_chats(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Delete a chat and all of its messages atomically.
    /// No-op when the chat does not exist.
    fn delete_chat(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Append one message to a chat, assigning the next sequence number.
    /// Fails with `StoreError::NotFound` if the chat does not exist.
    fn append_message(
        &self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Message, StoreError>> + Send;

    /// Messages of a chat ordered by `seq` ascending.
    /// Empty (not an error) for an unknown chat.
    fn list_messages(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Number of messages stored for a chat.
    fn message_count(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<u32, StoreError>> + Send;
}
