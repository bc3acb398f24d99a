//! Infrastructure implementations for Charla.
//!
//! Concrete backends for the traits defined in charla-core: SQLite storage
//! over sqlx, the Gemini HTTP client, argon2 password hashing, and the
//! config loader.

pub mod config;
pub mod crypto;
pub mod gemini;
pub mod sqlite;
