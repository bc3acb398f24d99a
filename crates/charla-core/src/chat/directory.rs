//! Chat directory: resumable chats for the presentation layer.

use charla_types::chat::Chat;
use charla_types::error::StoreError;

use crate::chat::repository::ChatRepository;

/// Lists a user's chats for resumption, most recent first.
pub struct ChatDirectory<C: ChatRepository> {
    repo: C,
}

impl<C: ChatRepository> ChatDirectory<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// All chats belonging to a user, ordered by creation time descending.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Chat>, StoreError> {
        self.repo.list_chats(user_id).await
    }

    /// The user's most recent chat, used to auto-resume at startup.
    /// `None` means the session should start fresh with no active chat.
    pub async fn most_recent(&self, user_id: i64) -> Result<Option<Chat>, StoreError> {
        let mut chats = self.repo.list_chats(user_id).await?;
        Ok(if chats.is_empty() {
            None
        } else {
            Some(chats.remove(0))
        })
    }

    /// Look up a chat by id for resumption, refusing chats that belong to
    /// another user. Missing and foreign chats both come back as `NotFound`
    /// so the caller cannot probe for other users' chat ids.
    pub async fn resume_for_user(&self, user_id: i64, chat_id: i64) -> Result<Chat, StoreError> {
        match self.repo.get_chat(chat_id).await? {
            Some(chat) if chat.user_id == user_id => Ok(chat),
            _ => Err(StoreError::NotFound),
        }
    }
}
