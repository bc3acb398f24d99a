//! Interactive chat loop.
//!
//! Binds a conversation session for the logged-in user, auto-resuming the
//! most recent chat (or the one named with `--chat`), then reads prompts
//! until `/quit`. A failed generation prints a display-safe message and the
//! loop continues -- the prompt is already persisted, so asking again
//! retries against the same history.

use std::path::Path;

use console::style;
use dialoguer::Input;
use tracing::debug;

use charla_core::chat::repository::ChatRepository;
use charla_types::chat::Role;
use charla_types::error::{SessionError, StoreError};
use charla_types::user::User;

use crate::state::{AppState, ConcreteSession};

pub async fn run(state: &AppState, user: &User, chat: Option<i64>) -> anyhow::Result<()> {
    let mut session = state.session();

    let resume = match chat {
        Some(id) => match state.directory().resume_for_user(user.id, id).await {
            Ok(chat) => Some(chat),
            Err(StoreError::NotFound) => {
                anyhow::bail!("chat {id} does not exist or belongs to another user")
            }
            Err(e) => return Err(e.into()),
        },
        None => state.directory().most_recent(user.id).await?,
    };
    match resume {
        Some(chat) => {
            println!("Resuming {} (chat {}).", style(&chat.title).cyan(), chat.id);
            replay(state, chat.id).await?;
            session.resume(chat.id);
        }
        None => println!("Starting a fresh conversation."),
    }
    println!("Type a message, or /new, /chats, /attach <file> <prompt>, /quit.");

    loop {
        let line: String = Input::new().with_prompt(">").interact_text()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_whitespace().next() {
            Some("/quit") | Some("/exit") => break,
            Some("/new") => {
                session.reset();
                println!("Next message starts a new chat.");
            }
            Some("/chats") => super::chats::list(state, user).await?,
            Some("/attach") => {
                let rest = line.trim_start_matches("/attach").trim();
                let Some((path, prompt)) = rest.split_once(' ') else {
                    println!("Usage: /attach <file> <prompt>");
                    continue;
                };
                attach_turn(&mut session, user, path, prompt.trim()).await?;
            }
            _ => submit(&mut session, user, line).await?,
        }
    }

    Ok(())
}

/// Print a chat's stored history so a resumed conversation has its context
/// on screen.
async fn replay(state: &AppState, chat_id: i64) -> anyhow::Result<()> {
    for message in state.chat_repo.list_messages(chat_id).await? {
        match message.role {
            Role::System => debug!(seq = message.seq, "persona message elided from replay"),
            Role::User => println!("{} {}", style("you:").bold(), message.content),
            Role::Model => println!("{} {}", style("model:").blue().bold(), message.content),
        }
    }
    Ok(())
}

async fn submit(session: &mut ConcreteSession, user: &User, prompt: &str) -> anyhow::Result<()> {
    match session.submit_prompt(prompt, None, Some(user.id)).await {
        Ok(turn) => println!("{} {}", style("model:").blue().bold(), turn.reply),
        Err(e) => report(e),
    }
    Ok(())
}

async fn attach_turn(
    session: &mut ConcreteSession,
    user: &User,
    path: &str,
    prompt: &str,
) -> anyhow::Result<()> {
    let path = Path::new(path);
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) => {
            println!("{} Could not read {}: {e}", style("✗").red(), path.display());
            return Ok(());
        }
    };
    let mime = guess_mime(path);

    match session
        .submit_prompt_with_attachment(prompt, &data, mime, None, Some(user.id))
        .await
    {
        Ok(turn) => println!("{} {}", style("model:").blue().bold(), turn.reply),
        Err(e) => report(e),
    }
    Ok(())
}

/// Map a turn failure to a display-safe line; the process keeps running.
fn report(error: SessionError) {
    match &error {
        SessionError::Generation(_) => println!(
            "{} The model could not answer ({error}). Your message was saved; just ask again.",
            style("✗").red()
        ),
        _ => println!("{} {error}", style("✗").red()),
    }
}

/// MIME type from the file extension, defaulting to a generic binary type.
fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}
