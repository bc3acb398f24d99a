//! Chat listing and deletion commands.

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use console::style;

use charla_core::chat::repository::ChatRepository;
use charla_types::user::User;

use crate::state::AppState;

/// Print the user's chats, most recent first.
pub async fn list(state: &AppState, user: &User) -> anyhow::Result<()> {
    let chats = state.directory().list_for_user(user.id).await?;

    if chats.is_empty() {
        println!("No chats yet. Run {} to start one.", style("charla chat").cyan());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["ID", "Title", "Created"]);
    for chat in &chats {
        table.add_row([
            chat.id.to_string(),
            chat.title.clone(),
            chat.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Delete one of the user's chats together with its messages.
pub async fn delete(state: &AppState, user: &User, chat_id: i64) -> anyhow::Result<()> {
    match state.chat_repo.get_chat(chat_id).await? {
        Some(chat) if chat.user_id == user.id => {
            state.chat_repo.delete_chat(chat_id).await?;
            println!("{} Chat {chat_id} deleted.", style("✓").green());
        }
        Some(_) => {
            println!("{} Chat {chat_id} belongs to another user.", style("✗").red());
        }
        None => {
            // Deleting a missing chat is a no-op by contract.
            println!("Chat {chat_id} does not exist.");
        }
    }
    Ok(())
}
