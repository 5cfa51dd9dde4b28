// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed visual layout of the MAIN window.
//!
//! Pane 0 (top-left) hosts the root/parent agent, pane 1 (bottom-left) a
//! dashboard tailing the bus journal, pane 2 and onward (right column) the
//! children, stacked by splitting the most recently allocated pane.

use std::path::Path;
use std::time::Duration;
use studio_adapters::{MuxAdapter, MuxError, SplitDirection};
use studio_core::is_root_unit;

/// Reserved pane for the root/parent agent.
pub const PANE_ROOT: u32 = 0;
/// Reserved pane for the dashboard.
pub const PANE_DASHBOARD: u32 = 1;
/// Base pane of the right column, used by the first child.
pub const PANE_RIGHT_BASE: u32 = 2;

const MAIN_WINDOW: &str = "MAIN";
const TEMP_WINDOW: &str = "TEMP";

/// Session/window bootstrap and pane allocation.
pub struct Layout<M: MuxAdapter> {
    mux: M,
    session: String,
    mux_delay: Duration,
    /// Children placed so far in this daemon lifetime; drives right-column
    /// stacking.
    child_count: usize,
}

impl<M: MuxAdapter> Layout<M> {
    pub fn new(mux: M, session: String, mux_delay: Duration) -> Self {
        Self {
            mux,
            session,
            mux_delay,
            child_count: 0,
        }
    }

    fn window(&self) -> String {
        format!("{}:{}", self.session, MAIN_WINDOW)
    }

    /// Target specifier for a pane index in the MAIN window.
    pub fn pane_target(&self, index: u32) -> String {
        format!("{}.{}", self.window(), index)
    }

    async fn settle(&self) {
        if !self.mux_delay.is_zero() {
            tokio::time::sleep(self.mux_delay).await;
        }
    }

    /// Make sure the session exists and the MAIN window carries the fixed
    /// frame, then bring MAIN to the front.
    pub async fn ensure_session(&self, journal_path: &Path) -> Result<(), MuxError> {
        if !self.mux.has_session(&self.session).await? {
            self.mux.new_session(&self.session, TEMP_WINDOW).await?;
            tracing::info!(session = %self.session, "created tmux session");
            self.settle().await;
        }

        self.ensure_main_window(journal_path).await?;

        // Cosmetic; a failure here never blocks spawning.
        if let Err(e) = self.mux.select_window(&self.window()).await {
            tracing::warn!(error = %e, "could not select MAIN window");
        }
        Ok(())
    }

    /// Build the MAIN window frame if it is not there yet. Idempotent.
    pub async fn ensure_main_window(&self, journal_path: &Path) -> Result<(), MuxError> {
        let windows = self.mux.list_windows(&self.session).await?;
        if windows.iter().any(|name| name == MAIN_WINDOW) {
            return Ok(());
        }

        tracing::info!("creating MAIN window with initial layout");
        let Some(first) = windows.first() else {
            return Err(MuxError::NotFound(self.session.clone()));
        };
        self.mux
            .rename_window(&format!("{}:{}", self.session, first), MAIN_WINDOW)
            .await?;
        self.settle().await;

        // Left/right columns, then split the left column for the dashboard.
        self.mux
            .split_window(&self.window(), SplitDirection::Horizontal)
            .await?;
        self.mux
            .select_pane(&self.pane_target(PANE_ROOT))
            .await?;
        self.mux
            .split_window(&self.pane_target(PANE_ROOT), SplitDirection::Vertical)
            .await?;
        self.settle().await;

        let dashboard_cmd = format!(
            "tail -F {} 2>/dev/null || echo \"Waiting for logs...\"",
            journal_path.display()
        );
        let dashboard = self.pane_target(PANE_DASHBOARD);
        self.mux.send_literal(&dashboard, &dashboard_cmd).await?;
        self.mux.send_key(&dashboard, "Enter").await?;

        Ok(())
    }

    /// Pick the pane for a unit.
    ///
    /// Root-synonym units take pane 0; the first child takes the right
    /// base pane; later children split the numerically highest pane.
    /// Returns `None` when the window has no space for another pane.
    pub async fn allocate(&mut self, unit_id: &str) -> Result<Option<String>, MuxError> {
        if is_root_unit(unit_id) {
            return Ok(Some(self.pane_target(PANE_ROOT)));
        }

        if self.child_count == 0 {
            self.child_count += 1;
            return Ok(Some(self.pane_target(PANE_RIGHT_BASE)));
        }

        let panes = self.mux.list_panes(&self.window()).await?;
        let Some(&last) = panes.iter().max() else {
            return Ok(None);
        };

        match self
            .mux
            .split_window(&self.pane_target(last), SplitDirection::Vertical)
            .await
        {
            Ok(()) => {}
            Err(MuxError::NoSpace) => {
                tracing::warn!(unit_id, "no space for new pane, maximum panes reached");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        self.settle().await;

        let panes = self.mux.list_panes(&self.window()).await?;
        let Some(&newest) = panes.iter().max() else {
            return Ok(None);
        };
        self.child_count += 1;
        Ok(Some(self.pane_target(newest)))
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
