//! Registration and login prompts.

use anyhow::bail;
use console::style;
use dialoguer::{Input, Password};

use charla_core::user::repository::UserRepository;
use charla_types::user::User;

use crate::state::AppState;

/// Interactively register a new account.
///
/// A duplicate email or username is reported as a normal outcome, not an
/// error exit.
pub async fn register(state: &AppState) -> anyhow::Result<()> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let name: String = Input::new().with_prompt("Display name").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let created = state
        .user_repo
        .create_user(&email, &password, &name, &username)
        .await?;

    if created {
        println!("{} Account '{username}' created.", style("✓").green());
    } else {
        println!(
            "{} That email or username is already taken.",
            style("✗").red()
        );
    }
    Ok(())
}

/// Prompt for credentials and return the matching user.
pub async fn login(state: &AppState) -> anyhow::Result<User> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    match state
        .user_repo
        .find_user_by_credentials(&username, &password)
        .await?
    {
        Some(user) => {
            println!("{} Welcome back, {}.", style("✓").green(), user.name);
            Ok(user)
        }
        None => bail!("invalid username or password"),
    }
}
