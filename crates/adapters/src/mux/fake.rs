// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake multiplexer for tests.
//!
//! Models a single session with one window's pane indices, hands out
//! synthetic `%N` pane ids, and can be armed to run out of space after a
//! fixed number of splits.

use super::{MuxAdapter, MuxError, SplitDirection};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum MuxCall {
    NewSession { session: String, window: String },
    KillSession { session: String },
    RenameWindow { target: String, name: String },
    SelectWindow { target: String },
    Split { target: String, direction: SplitDirection },
    SelectPane { target: String },
    Literal { target: String, text: String },
    Key { target: String, key: String },
    PipePane { target: String, command: String },
}

#[derive(Default)]
struct Inner {
    sessions: BTreeSet<String>,
    windows: Vec<String>,
    panes: Vec<u32>,
    splits_left: Option<usize>,
    calls: Vec<MuxCall>,
}

/// Recording in-memory multiplexer.
#[derive(Clone, Default)]
pub struct FakeMux {
    inner: Arc<Mutex<Inner>>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow only `n` further splits; the next one returns `NoSpace`.
    pub fn with_split_limit(self, n: usize) -> Self {
        self.lock().splits_left = Some(n);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The lock is test-only plumbing; a poisoned lock means a test
        // already panicked.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> Vec<MuxCall> {
        self.lock().calls.clone()
    }

    /// Literal text sent to `target`, in order.
    pub fn literal_sends(&self, target: &str) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MuxCall::Literal { target: t, text } if t == target => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current pane indices (test inspection).
    pub fn pane_indices(&self) -> Vec<u32> {
        self.lock().panes.clone()
    }
}

#[async_trait]
impl MuxAdapter for FakeMux {
    async fn has_session(&self, session: &str) -> Result<bool, MuxError> {
        Ok(self.lock().sessions.contains(session))
    }

    async fn new_session(&self, session: &str, window: &str) -> Result<(), MuxError> {
        let mut inner = self.lock();
        inner.sessions.insert(session.to_string());
        inner.windows = vec![window.to_string()];
        inner.panes = vec![0];
        inner.calls.push(MuxCall::NewSession {
            session: session.to_string(),
            window: window.to_string(),
        });
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        let mut inner = self.lock();
        inner.sessions.remove(session);
        inner.calls.push(MuxCall::KillSession {
            session: session.to_string(),
        });
        Ok(())
    }

    async fn list_windows(&self, _session: &str) -> Result<Vec<String>, MuxError> {
        Ok(self.lock().windows.clone())
    }

    async fn rename_window(&self, target: &str, name: &str) -> Result<(), MuxError> {
        let mut inner = self.lock();
        if let Some(first) = inner.windows.first_mut() {
            *first = name.to_string();
        } else {
            inner.windows.push(name.to_string());
            inner.panes = vec![0];
        }
        inner.calls.push(MuxCall::RenameWindow {
            target: target.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn select_window(&self, target: &str) -> Result<(), MuxError> {
        self.lock().calls.push(MuxCall::SelectWindow {
            target: target.to_string(),
        });
        Ok(())
    }

    async fn split_window(
        &self,
        target: &str,
        direction: SplitDirection,
    ) -> Result<(), MuxError> {
        let mut inner = self.lock();
        match inner.splits_left {
            Some(0) => return Err(MuxError::NoSpace),
            Some(n) => inner.splits_left = Some(n - 1),
            None => {}
        }
        let next = inner.panes.iter().max().map(|max| max + 1).unwrap_or(0);
        inner.panes.push(next);
        inner.calls.push(MuxCall::Split {
            target: target.to_string(),
            direction,
        });
        Ok(())
    }

    async fn select_pane(&self, target: &str) -> Result<(), MuxError> {
        self.lock().calls.push(MuxCall::SelectPane {
            target: target.to_string(),
        });
        Ok(())
    }

    async fn list_panes(&self, _target: &str) -> Result<Vec<u32>, MuxError> {
        Ok(self.lock().panes.clone())
    }

    async fn send_literal(&self, target: &str, text: &str) -> Result<(), MuxError> {
        self.lock().calls.push(MuxCall::Literal {
            target: target.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_key(&self, target: &str, key: &str) -> Result<(), MuxError> {
        self.lock().calls.push(MuxCall::Key {
            target: target.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn pipe_pane(&self, target: &str, command: &str) -> Result<(), MuxError> {
        self.lock().calls.push(MuxCall::PipePane {
            target: target.to_string(),
            command: command.to_string(),
        });
        Ok(())
    }

    async fn pane_id(&self, target: &str) -> Result<String, MuxError> {
        // Synthetic stable id derived from the pane index in the target.
        let index = target.rsplit('.').next().unwrap_or("0");
        Ok(format!("%{}", index))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
