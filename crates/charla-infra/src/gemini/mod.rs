//! Gemini text-generation backend.

pub mod client;
pub mod types;

pub use client::GeminiClient;
