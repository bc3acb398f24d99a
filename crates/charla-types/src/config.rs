//! Application configuration.
//!
//! Deserialized from `{data_dir}/config.toml`. Every field has a default so
//! a missing or partial file still yields a working configuration.

use serde::{Deserialize, Serialize};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default deadline for one generation call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model identifier sent to the generation API.
    pub model: String,

    /// Optional house-style instructions. When set, every new chat is seeded
    /// with this text as a `system` message before any user content, so the
    /// persona persists through every subsequent replay of that chat.
    pub persona: Option<String>,

    /// Deadline for a single generation call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            persona: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
