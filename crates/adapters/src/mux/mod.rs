// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer adapters
//!
//! The daemon talks to the multiplexer through [`MuxAdapter`] so layout
//! and spawn logic can run against a recording fake in tests. Targets are
//! tmux-style specifiers: a session name, `session:window`, or
//! `session:window.pane`.

mod tmux;

pub use tmux::TmuxMux;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, MuxCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from multiplexer operations
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("target not found: {0}")]
    NotFound(String),
    #[error("no space for new pane")]
    NoSpace,
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Orientation of a pane split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Side by side (`split-window -h`).
    Horizontal,
    /// Stacked (`split-window -v`).
    Vertical,
}

/// Adapter for the terminal multiplexer (tmux)
#[async_trait]
pub trait MuxAdapter: Clone + Send + Sync + 'static {
    /// Check whether a session exists
    async fn has_session(&self, session: &str) -> Result<bool, MuxError>;

    /// Create a detached session whose first window is named `window`
    async fn new_session(&self, session: &str, window: &str) -> Result<(), MuxError>;

    /// Kill a session (succeeds even if it is already gone)
    async fn kill_session(&self, session: &str) -> Result<(), MuxError>;

    /// Names of the session's windows
    async fn list_windows(&self, session: &str) -> Result<Vec<String>, MuxError>;

    /// Rename the window addressed by `target`
    async fn rename_window(&self, target: &str, name: &str) -> Result<(), MuxError>;

    /// Make the window addressed by `target` current
    async fn select_window(&self, target: &str) -> Result<(), MuxError>;

    /// Split the pane addressed by `target`; [`MuxError::NoSpace`] when the
    /// multiplexer refuses because the window is full
    async fn split_window(&self, target: &str, direction: SplitDirection)
        -> Result<(), MuxError>;

    /// Make the pane addressed by `target` current
    async fn select_pane(&self, target: &str) -> Result<(), MuxError>;

    /// Pane indices of the window addressed by `target`, ascending
    async fn list_panes(&self, target: &str) -> Result<Vec<u32>, MuxError>;

    /// Send literal text (no key-name interpretation) to a pane
    async fn send_literal(&self, target: &str, text: &str) -> Result<(), MuxError>;

    /// Send a named key (control mode, e.g. `Enter`) to a pane
    async fn send_key(&self, target: &str, key: &str) -> Result<(), MuxError>;

    /// Tee the pane's output through a shell command
    async fn pipe_pane(&self, target: &str, command: &str) -> Result<(), MuxError>;

    /// Resolve a target to the stable pane id (`%N`)
    async fn pane_id(&self, target: &str) -> Result<String, MuxError>;
}
