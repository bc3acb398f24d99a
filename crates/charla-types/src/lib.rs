//! Shared domain types for Charla.
//!
//! This crate holds the data shapes passed between the storage layer, the
//! conversation core, and the application shell: users, chats, messages,
//! generation requests, configuration, and the error taxonomy. It has no
//! I/O of its own.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
