// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! busd - the AI App Studio bus daemon
//!
//! Watches the per-recipient mailboxes under the daemon root and actuates
//! envelopes: spawn (worktree + pane + agent launch), send/instruct
//! (keystrokes into a pane) and post (journal + status propagation).
//!
//! Usage: `busd [target-repo]` — the target repository defaults to the
//! current directory. See `Config` for the recognized environment
//! variables.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use studio_adapters::TmuxMux;
use studio_daemon::{Config, Daemon};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("busd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("busd {}", env!("CARGO_PKG_VERSION"));
                println!("AI App Studio bus daemon - watches mailboxes and drives tmux/git");
                println!();
                println!("USAGE:");
                println!("    busd [target-repo]");
                println!();
                println!("ARGS:");
                println!("    target-repo    Repository the root agent works on (default: cwd)");
                println!();
                println!("ENVIRONMENT:");
                println!("    ROOT            Daemon root (default: <target-repo>/.ai-app-studio)");
                println!("    TMUX_SESSION    Session name (default: cc)");
                println!("    CLAUDE_CMD      Agent launch command");
                return Ok(());
            }
            _ => {}
        }
    }

    setup_logging();

    let target_repo = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir()?,
    };
    let target_repo = target_repo.canonicalize().unwrap_or(target_repo);
    let config = Config::from_env(target_repo);

    info!(target_repo = %config.target_repo.display(), "busd starting");
    info!(root = %config.root.display(), session = %config.session, "daemon root");

    let mut daemon = Daemon::new(config.clone(), TmuxMux::new())?;
    daemon.init().await?;

    info!("monitoring mailboxes");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {
                daemon.poll_once().await;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    // Drain once more so envelopes delivered during shutdown are not
    // stranded until the next start.
    let handled = daemon.poll_once().await;
    if handled > 0 {
        info!(handled, "drained mailboxes on shutdown");
    }

    info!("daemon stopped");
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
