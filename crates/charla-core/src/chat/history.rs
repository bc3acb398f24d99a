//! History assembler: stored messages -> ordered model context.
//!
//! Reconstructs a chat's messages into the exact role/content sequence a
//! generation call consumes. The full history is always replayed -- there is
//! no filtering, summarization, or truncation, which is a known scaling
//! limit preserved deliberately.

use charla_types::error::StoreError;
use charla_types::llm::ContextEntry;

use crate::chat::repository::ChatRepository;

/// Assembles replay contexts from stored chat history.
///
/// Generic over `ChatRepository` so the core never depends on charla-infra.
pub struct HistoryAssembler<C: ChatRepository> {
    repo: C,
}

impl<C: ChatRepository> HistoryAssembler<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// Full ordered context for a chat, mapped 1:1 from its messages.
    pub async fn build_context(&self, chat_id: i64) -> Result<Vec<ContextEntry>, StoreError> {
        let messages = self.repo.list_messages(chat_id).await?;
        Ok(messages.iter().map(ContextEntry::from).collect())
    }

    /// Context with the final entry split off.
    ///
    /// Used when the last stored message rides out-of-band next to a binary
    /// attachment rather than as a plain context entry. Returns the leading
    /// entries and the final one (`None` when the chat is empty).
    pub async fn build_context_excluding_last(
        &self,
        chat_id: i64,
    ) -> Result<(Vec<ContextEntry>, Option<ContextEntry>), StoreError> {
        let mut context = self.build_context(chat_id).await?;
        let last = context.pop();
        Ok((context, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::InMemoryChatRepository;
    use charla_types::chat::Role;

    #[tokio::test]
    async fn test_build_context_preserves_order() {
        let repo = InMemoryChatRepository::with_user(1);
        let chat = repo.create_chat(1, None).await.unwrap();
        repo.append_message(chat.id, Role::User, "first").await.unwrap();
        repo.append_message(chat.id, Role::Model, "second").await.unwrap();
        repo.append_message(chat.id, Role::User, "third").await.unwrap();

        let assembler = HistoryAssembler::new(repo);
        let context = assembler.build_context(chat.id).await.unwrap();

        assert_eq!(context.len(), 3);
        assert_eq!(context[0].content, "first");
        assert_eq!(context[1].role, Role::Model);
        assert_eq!(context[2].content, "third");
    }

    #[tokio::test]
    async fn test_build_context_empty_chat() {
        let repo = InMemoryChatRepository::with_user(1);
        let chat = repo.create_chat(1, None).await.unwrap();
        let assembler = HistoryAssembler::new(repo);

        let context = assembler.build_context(chat.id).await.unwrap();
        assert!(context.is_empty());

        let (leading, last) = assembler
            .build_context_excluding_last(chat.id)
            .await
            .unwrap();
        assert!(leading.is_empty());
        assert!(last.is_none());
    }

    #[tokio::test]
    async fn test_build_context_excluding_last_splits_final_entry() {
        let repo = InMemoryChatRepository::with_user(1);
        let chat = repo.create_chat(1, None).await.unwrap();
        repo.append_message(chat.id, Role::User, "hola").await.unwrap();
        repo.append_message(chat.id, Role::Model, "hola!").await.unwrap();
        repo.append_message(chat.id, Role::User, "evalua este pdf").await.unwrap();

        let assembler = HistoryAssembler::new(repo);
        let (leading, last) = assembler
            .build_context_excluding_last(chat.id)
            .await
            .unwrap();

        assert_eq!(leading.len(), 2);
        let last = last.unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "evalua este pdf");
    }
}
