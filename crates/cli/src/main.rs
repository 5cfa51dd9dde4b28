// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! busctl - message bus control utility for AI App Studio
//!
//! Agents run this from inside their panes to post envelopes onto the
//! file bus: `spawn` asks the daemon to start units, `send` targets a
//! specific agent's mailbox, `post` reports to the parent/root mailbox.
//! All writes go through the atomic tmp -> rename mailbox writer, so the
//! daemon never observes a partial envelope.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{post, send, spawn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "busctl",
    version,
    about = "Message bus control utility for AI App Studio"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn this unit (or, with --from-breakdown, its planned children)
    Spawn(spawn::SpawnArgs),
    /// Send a message to a specific agent
    Send(send::SendArgs),
    /// Post a message to the parent/root mailbox
    Post(post::PostArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = busctl_root()?;
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Spawn(args) => spawn::handle(args, &root, &cwd),
        Commands::Send(args) => send::handle(args, &root),
        Commands::Post(args) => post::handle(args, &root),
    }
}

/// Daemon root the poster writes into: `$BUSCTL_ROOT`, else
/// `<cwd>/.ai-app-studio`.
fn busctl_root() -> Result<PathBuf> {
    if let Some(root) = std::env::var_os("BUSCTL_ROOT") {
        return Ok(PathBuf::from(root));
    }
    Ok(std::env::current_dir()?.join(".ai-app-studio"))
}
