//! Charla CLI entry point.
//!
//! Binary name: `charla`
//!
//! Parses CLI arguments, initializes the database and configuration, then
//! dispatches to the appropriate command handler. A failed turn prints a
//! display-safe message and the process keeps running; only startup faults
//! (missing API key, incompatible schema) abort.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,charla_core=debug,charla_infra=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::Register => cli::account::register(&state).await?,
        Commands::Chat { chat } => {
            let user = cli::account::login(&state).await?;
            cli::chat_loop::run(&state, &user, chat).await?;
        }
        Commands::Chats => {
            let user = cli::account::login(&state).await?;
            cli::chats::list(&state, &user).await?;
        }
        Commands::Delete { chat } => {
            let user = cli::account::login(&state).await?;
            cli::chats::delete(&state, &user, chat).await?;
        }
    }

    Ok(())
}
