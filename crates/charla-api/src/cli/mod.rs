//! CLI command definitions and dispatch for the `charla` binary.
//!
//! Uses clap derive macros for argument parsing. Interactive credential
//! prompts go through dialoguer so passwords never appear in shell history.

pub mod account;
pub mod chat_loop;
pub mod chats;

use clap::{Parser, Subcommand};

/// Chat with a hosted model, with resumable local history.
#[derive(Parser)]
#[command(name = "charla", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account.
    Register,

    /// Log in and start the interactive chat loop.
    Chat {
        /// Resume a specific chat instead of the most recent one.
        #[arg(long)]
        chat: Option<i64>,
    },

    /// List your chats, most recent first.
    #[command(alias = "ls")]
    Chats,

    /// Delete a chat and all of its messages.
    #[command(alias = "rm")]
    Delete {
        /// Chat id to delete.
        chat: i64,
    },
}
