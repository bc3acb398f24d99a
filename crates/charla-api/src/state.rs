//! Application state wiring the storage and generation backends together.
//!
//! `AppState` pins the core's generics to the concrete infra
//! implementations and owns the startup sequence: resolve the data
//! directory, open the database (schema bootstrap included), load the
//! config, and read the API key. A missing API key is fatal here, at
//! process start, not on the first turn.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;

use charla_core::chat::directory::ChatDirectory;
use charla_core::chat::session::ConversationSession;
use charla_infra::config::{load_config, resolve_data_dir};
use charla_infra::gemini::GeminiClient;
use charla_infra::sqlite::chat::SqliteChatRepository;
use charla_infra::sqlite::pool::{DatabasePool, default_database_url};
use charla_infra::sqlite::user::SqliteUserRepository;
use charla_types::config::AppConfig;

/// The session type pinned to the concrete infra implementations.
pub type ConcreteSession = ConversationSession<SqliteChatRepository, GeminiClient>;

/// Shared application state for all CLI commands.
pub struct AppState {
    pub chat_repo: SqliteChatRepository,
    pub user_repo: SqliteUserRepository,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    api_key: SecretString,
}

impl AppState {
    /// Initialize the application state: data dir, database, config, API key.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;

        let pool = DatabasePool::new(&default_database_url(&data_dir))
            .await
            .context("opening database")?;

        let config = load_config(&data_dir).await;

        let api_key = std::env::var("GEMINI_API_KEY")
            .map(SecretString::from)
            .context("GEMINI_API_KEY environment variable is not set")?;

        Ok(Self {
            chat_repo: SqliteChatRepository::new(pool.clone()),
            user_repo: SqliteUserRepository::new(pool),
            config,
            data_dir,
            api_key,
        })
    }

    /// Build a fresh conversation session bound to this state's backends.
    pub fn session(&self) -> ConcreteSession {
        let generator = GeminiClient::new(self.api_key.clone(), self.config.model.clone());
        ConversationSession::new(
            self.chat_repo.clone(),
            generator,
            self.config.persona.clone(),
            Duration::from_secs(self.config.request_timeout_secs),
        )
    }

    /// Chat directory over this state's repository.
    pub fn directory(&self) -> ChatDirectory<SqliteChatRepository> {
        ChatDirectory::new(self.chat_repo.clone())
    }
}
