// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux multiplexer adapter

use super::{MuxAdapter, MuxError, SplitDirection};
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

/// Tmux-based multiplexer adapter
#[derive(Clone, Default)]
pub struct TmuxMux;

impl TmuxMux {
    pub fn new() -> Self {
        Self
    }

    async fn tmux(&self, args: &[&str]) -> Result<Output, MuxError> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_with_timeout(cmd, TMUX_TIMEOUT, "tmux")
            .await
            .map_err(MuxError::CommandFailed)
    }

    /// Run tmux, mapping a non-zero exit to `NotFound` for the target.
    async fn tmux_on(&self, target: &str, args: &[&str]) -> Result<Output, MuxError> {
        let output = self.tmux(args).await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(target.to_string()));
        }
        Ok(output)
    }
}

#[async_trait]
impl MuxAdapter for TmuxMux {
    async fn has_session(&self, session: &str) -> Result<bool, MuxError> {
        let output = self.tmux(&["has-session", "-t", session]).await?;
        Ok(output.status.success())
    }

    async fn new_session(&self, session: &str, window: &str) -> Result<(), MuxError> {
        let output = self
            .tmux(&["new-session", "-d", "-s", session, "-n", window, "bash"])
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(session, stderr = %stderr, "tmux new-session failed");
            return Err(MuxError::CommandFailed(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        // Session might already be dead, which is fine
        let _ = self.tmux(&["kill-session", "-t", session]).await?;
        Ok(())
    }

    async fn list_windows(&self, session: &str) -> Result<Vec<String>, MuxError> {
        let output = self
            .tmux_on(
                session,
                &["list-windows", "-t", session, "-F", "#{window_name}"],
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    async fn rename_window(&self, target: &str, name: &str) -> Result<(), MuxError> {
        self.tmux_on(target, &["rename-window", "-t", target, name])
            .await?;
        Ok(())
    }

    async fn select_window(&self, target: &str) -> Result<(), MuxError> {
        self.tmux_on(target, &["select-window", "-t", target]).await?;
        Ok(())
    }

    async fn split_window(
        &self,
        target: &str,
        direction: SplitDirection,
    ) -> Result<(), MuxError> {
        let flag = match direction {
            SplitDirection::Horizontal => "-h",
            SplitDirection::Vertical => "-v",
        };
        let output = self.tmux(&["split-window", flag, "-t", target]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no space for new pane") {
                return Err(MuxError::NoSpace);
            }
            return Err(MuxError::CommandFailed(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn select_pane(&self, target: &str) -> Result<(), MuxError> {
        self.tmux_on(target, &["select-pane", "-t", target]).await?;
        Ok(())
    }

    async fn list_panes(&self, target: &str) -> Result<Vec<u32>, MuxError> {
        let output = self
            .tmux_on(target, &["list-panes", "-t", target, "-F", "#{pane_index}"])
            .await?;
        let mut panes: Vec<u32> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect();
        panes.sort_unstable();
        Ok(panes)
    }

    async fn send_literal(&self, target: &str, text: &str) -> Result<(), MuxError> {
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        self.tmux_on(target, &["send-keys", "-t", target, "-l", "--", text])
            .await?;
        Ok(())
    }

    async fn send_key(&self, target: &str, key: &str) -> Result<(), MuxError> {
        self.tmux_on(target, &["send-keys", "-t", target, key])
            .await?;
        Ok(())
    }

    async fn pipe_pane(&self, target: &str, command: &str) -> Result<(), MuxError> {
        self.tmux_on(target, &["pipe-pane", "-o", "-t", target, command])
            .await?;
        Ok(())
    }

    async fn pane_id(&self, target: &str) -> Result<String, MuxError> {
        let output = self
            .tmux_on(
                target,
                &["display-message", "-p", "-t", target, "-F", "#{pane_id}"],
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
