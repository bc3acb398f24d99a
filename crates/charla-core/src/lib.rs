//! Conversation-persistence and context-replay core for Charla.
//!
//! This crate defines the repository traits the infrastructure layer
//! implements, plus the logic built on top of them: the history assembler
//! that reconstructs a chat into an ordered model context, the conversation
//! session that orchestrates one prompt-to-reply cycle, and the chat
//! directory that exposes resumable chats. It never depends on charla-infra.

pub mod chat;
pub mod llm;
pub mod user;
