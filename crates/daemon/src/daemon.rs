// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon: mailbox poller and envelope dispatcher.
//!
//! A single cooperative loop drains every inbox in a deterministic order
//! each tick. Processing an envelope is read, act, delete: the file is
//! removed only after its handler succeeds, so a crash mid-handler leaves
//! the envelope for redelivery (at-least-once).

use crate::config::Config;
use crate::error::HandlerError;
use crate::layout::Layout;
use std::fs;
use std::path::Path;
use studio_adapters::{GitAdapter, MuxAdapter};
use studio_core::{Envelope, MessageKind};
use studio_storage::{inbox_dirs, pending, Journal, Registry};

pub struct Daemon<M: MuxAdapter> {
    pub(crate) config: Config,
    pub(crate) mux: M,
    pub(crate) git: GitAdapter,
    pub(crate) layout: Layout<M>,
    pub(crate) registry: Registry,
    pub(crate) journal: Journal,
}

impl<M: MuxAdapter> Daemon<M> {
    /// Create the directory layout, reload persisted state and open the
    /// journal. Does not touch the multiplexer yet; see [`Self::init`].
    pub fn new(config: Config, mux: M) -> Result<Self, HandlerError> {
        config.ensure_dirs()?;
        let registry = Registry::load(config.state_dir())?;
        let journal = Journal::open(config.journal_path())?;
        let layout = Layout::new(mux.clone(), config.session.clone(), config.mux_delay);
        Ok(Self {
            config,
            mux,
            git: GitAdapter::new(),
            layout,
            registry,
            journal,
        })
    }

    /// Bring up the multiplexer session and the MAIN window frame.
    pub async fn init(&mut self) -> Result<(), HandlerError> {
        let journal_path = self.config.journal_path();
        self.layout.ensure_session(&journal_path).await?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// One full pass over all inboxes. Returns how many envelopes were
    /// processed and deleted.
    pub async fn poll_once(&mut self) -> usize {
        let dirs = match inbox_dirs(&self.config.mbox_dir()) {
            Ok(dirs) => dirs,
            Err(e) => {
                tracing::error!(error = %e, "failed to list mailboxes");
                return 0;
            }
        };

        let mut handled = 0;
        for dir in dirs {
            let files = match pending(&dir) {
                Ok(files) => files,
                Err(e) => {
                    tracing::error!(inbox = %dir.display(), error = %e, "failed to list inbox");
                    continue;
                }
            };
            for file in files {
                match self.process_file(&file).await {
                    Ok(()) => {
                        if let Err(e) = fs::remove_file(&file) {
                            tracing::error!(file = %file.display(), error = %e, "failed to delete processed envelope");
                        } else {
                            handled += 1;
                        }
                    }
                    Err(e) => {
                        // Leave the file in place; it will be retried on
                        // the next pass.
                        tracing::error!(file = %file.display(), error = %e, "failed to process envelope");
                    }
                }
            }
        }
        handled
    }

    /// Read, validate and dispatch one envelope file.
    async fn process_file(&mut self, path: &Path) -> Result<(), HandlerError> {
        let text = fs::read_to_string(path)?;
        let envelope = Envelope::from_json_str(&text)?;

        tracing::info!(
            id = %envelope.id,
            kind = %envelope.kind,
            from = %envelope.from,
            to = %envelope.to,
            "processing envelope"
        );

        match envelope.kind {
            MessageKind::Spawn => self.handle_spawn(&envelope).await,
            MessageKind::Send | MessageKind::Instruct => self.handle_send(&envelope).await,
            _ => self.handle_post(&envelope).await,
        }
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
