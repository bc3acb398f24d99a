//! Conversation session: the per-turn orchestration state machine.
//!
//! A session starts with no active chat and becomes bound to one on the
//! first submitted prompt (creating the chat lazily when no id is given).
//! Side effects within a turn are strictly ordered: the user's prompt is
//! durably persisted before the model is invoked, and the model's reply is
//! persisted only after a successful response. A crash or generation
//! failure in between leaves a dangling unanswered user turn, which is an
//! accepted, recoverable state: the next turn simply replays it and asks
//! again. Retried prompts are not deduplicated.

use std::time::Duration;

use tracing::{info, warn};

use charla_types::chat::Role;
use charla_types::error::{SessionError, StoreError};
use charla_types::llm::GenerationError;

use crate::chat::history::HistoryAssembler;
use crate::chat::repository::ChatRepository;
use crate::llm::provider::TextGenerator;

/// Result of one completed conversation turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Chat the turn was recorded in (possibly newly created).
    pub chat_id: i64,
    /// The model's reply text.
    pub reply: String,
}

/// Orchestrates one prompt-to-reply cycle against storage and the model.
///
/// Generic over `ChatRepository` and `TextGenerator` so the core never
/// depends on charla-infra. The repository is held twice (directly and
/// inside the assembler); implementations are cheap clones over a shared
/// pool. Explicitly constructed and torn down by the caller -- no ambient
/// globals.
pub struct ConversationSession<C: ChatRepository + Clone, G: TextGenerator> {
    chat_repo: C,
    history: HistoryAssembler<C>,
    generator: G,
    /// House-style instructions seeded as the first message of every new chat.
    persona: Option<String>,
    /// Deadline for a single generation call.
    timeout: Duration,
    active_chat: Option<i64>,
}

impl<C: ChatRepository + Clone, G: TextGenerator> ConversationSession<C, G> {
    pub fn new(chat_repo: C, generator: G, persona: Option<String>, timeout: Duration) -> Self {
        let history = HistoryAssembler::new(chat_repo.clone());
        Self {
            chat_repo,
            history,
            generator,
            persona,
            timeout,
            active_chat: None,
        }
    }

    /// The chat this session is currently bound to, if any.
    pub fn active_chat(&self) -> Option<i64> {
        self.active_chat
    }

    /// Bind the session to an existing chat (resumption).
    pub fn resume(&mut self, chat_id: i64) {
        self.active_chat = Some(chat_id);
    }

    /// Unbind the session so the next prompt starts a fresh chat.
    pub fn reset(&mut self) {
        self.active_chat = None;
    }

    /// Submit one user prompt and return the model's reply.
    ///
    /// With no `chat_id` (and none active), a `user_id` is required and a
    /// chat is created first, seeded with the persona message when one is
    /// configured. The user turn stays persisted even when generation
    /// fails, so the caller may retry with the returned chat still intact.
    pub async fn submit_prompt(
        &mut self,
        prompt: &str,
        chat_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Turn, SessionError> {
        let chat_id = self.resolve_chat(chat_id, user_id).await?;

        self.append(chat_id, Role::User, prompt).await?;
        let context = self.history.build_context(chat_id).await?;

        let reply = self
            .with_deadline(self.generator.generate(&context))
            .await?;

        self.append(chat_id, Role::Model, &reply).await?;
        self.active_chat = Some(chat_id);
        info!(chat_id, turns = context.len() + 1, "turn completed");

        Ok(Turn { chat_id, reply })
    }

    /// Submit a prompt accompanied by a binary attachment.
    ///
    /// The prompt is persisted as a normal user turn, but for generation it
    /// travels out-of-band next to the attachment; the replayed context is
    /// everything before it.
    pub async fn submit_prompt_with_attachment(
        &mut self,
        prompt: &str,
        data: &[u8],
        mime_type: &str,
        chat_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Turn, SessionError> {
        let chat_id = self.resolve_chat(chat_id, user_id).await?;

        self.append(chat_id, Role::User, prompt).await?;
        let (context, last) = self.history.build_context_excluding_last(chat_id).await?;
        // The entry just appended is always present.
        let prompt_entry = last.ok_or(SessionError::ChatNotFound)?;

        let reply = self
            .with_deadline(self.generator.generate_with_attachment(
                &context,
                &prompt_entry.content,
                data,
                mime_type,
            ))
            .await?;

        self.append(chat_id, Role::Model, &reply).await?;
        self.active_chat = Some(chat_id);
        info!(chat_id, mime_type, "attachment turn completed");

        Ok(Turn { chat_id, reply })
    }

    /// Resolve the target chat: explicit id, then the active one, else
    /// create a new chat for `user_id` (seeding the persona first).
    async fn resolve_chat(
        &mut self,
        chat_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<i64, SessionError> {
        if let Some(chat_id) = chat_id.or(self.active_chat) {
            return Ok(chat_id);
        }

        let user_id = user_id.ok_or(SessionError::MissingUser)?;
        let chat = self.chat_repo.create_chat(user_id, None).await?;
        info!(chat_id = chat.id, user_id, "chat created");

        if let Some(persona) = self.persona.clone() {
            self.append(chat.id, Role::System, &persona).await?;
        }

        Ok(chat.id)
    }

    async fn append(&self, chat_id: i64, role: Role, content: &str) -> Result<(), SessionError> {
        match self.chat_repo.append_message(chat_id, role, content).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => Err(SessionError::ChatNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn with_deadline(
        &self,
        call: impl std::future::Future<Output = Result<String, GenerationError>>,
    ) -> Result<String, SessionError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                warn!(error = %e, "generation failed; user turn remains recorded");
                Err(e.into())
            }
            Err(_) => {
                let secs = self.timeout.as_secs();
                warn!(secs, "generation deadline exceeded");
                Err(GenerationError::Timeout { secs }.into())
            }
        }
    }
}
