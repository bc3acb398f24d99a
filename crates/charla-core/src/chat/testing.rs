//! In-memory test doubles for the chat repository and the text generator.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use charla_types::chat::{Chat, DEFAULT_CHAT_TITLE, Message, Role};
use charla_types::error::StoreError;
use charla_types::llm::{ContextEntry, GenerationError};

use crate::chat::repository::ChatRepository;
use crate::llm::provider::TextGenerator;

#[derive(Default)]
struct State {
    users: HashSet<i64>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
    next_chat_id: i64,
    next_message_id: i64,
}

/// In-memory `ChatRepository` backed by a mutex, for core-level tests.
#[derive(Clone)]
pub struct InMemoryChatRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryChatRepository {
    pub fn with_user(user_id: i64) -> Self {
        Self::with_users(&[user_id])
    }

    pub fn with_users(user_ids: &[i64]) -> Self {
        let repo = Self {
            state: Arc::new(Mutex::new(State {
                next_chat_id: 1,
                next_message_id: 1,
                ..State::default()
            })),
        };
        repo.state.lock().unwrap().users.extend(user_ids);
        repo
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(&self, user_id: i64, title: Option<&str>) -> Result<Chat, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains(&user_id) {
            return Err(StoreError::NotFound);
        }
        let chat = Chat {
            id: state.next_chat_id,
            user_id,
            title: title.unwrap_or(DEFAULT_CHAT_TITLE).to_string(),
            created_at: Utc::now(),
        };
        state.next_chat_id += 1;
        state.chats.push(chat.clone());
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(&self, user_id: i64) -> Result<Vec<Chat>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut chats: Vec<Chat> = state
            .chats
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(chats)
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.messages.retain(|m| m.chat_id != chat_id);
        state.chats.retain(|c| c.id != chat_id);
        Ok(())
    }

    async fn append_message(
        &self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Message, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.chats.iter().any(|c| c.id == chat_id) {
            return Err(StoreError::NotFound);
        }
        let seq = state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.seq)
            .max()
            .unwrap_or(0)
            + 1;
        let message = Message {
            id: state.next_message_id,
            chat_id,
            seq,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.next_message_id += 1;
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.seq);
        Ok(messages)
    }

    async fn message_count(&self, chat_id: i64) -> Result<u32, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.messages.iter().filter(|m| m.chat_id == chat_id).count() as u32)
    }
}

#[derive(Clone)]
enum Script {
    Reply(String),
    Fail,
    Hang,
}

/// Scripted `TextGenerator` that replies with a fixed string, fails, or
/// never resolves, recording the context it was handed.
#[derive(Clone)]
pub struct ScriptedGenerator {
    script: Script,
    pub seen_contexts: Arc<Mutex<Vec<Vec<ContextEntry>>>>,
}

impl ScriptedGenerator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            seen_contexts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_script(Script::Reply(reply.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    /// A generator whose call never completes, for exercising deadlines.
    pub fn hanging() -> Self {
        Self::with_script(Script::Hang)
    }

    async fn answer(&self, context: &[ContextEntry]) -> Result<String, GenerationError> {
        self.seen_contexts.lock().unwrap().push(context.to_vec());
        match &self.script {
            Script::Reply(reply) => Ok(reply.clone()),
            Script::Fail => Err(GenerationError::Provider {
                message: "scripted failure".to_string(),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, context: &[ContextEntry]) -> Result<String, GenerationError> {
        self.answer(context).await
    }

    async fn generate_with_attachment(
        &self,
        context: &[ContextEntry],
        prompt: &str,
        _data: &[u8],
        _mime_type: &str,
    ) -> Result<String, GenerationError> {
        let mut full = context.to_vec();
        full.push(ContextEntry::new(Role::User, prompt));
        self.answer(&full).await
    }
}
