// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Send and post handlers, including result propagation to the parent.

use crate::daemon::Daemon;
use crate::error::HandlerError;
use std::time::Duration;
use studio_adapters::{MuxAdapter, MuxError};
use studio_core::{iso8601, task_id_of, ChildRecord, ChildrenStatus, Envelope, MessageKind};

/// Truncation length for logged text previews.
const TEXT_PREVIEW_LEN: usize = 50;

/// Settle delay after a parent notification so back-to-back notifications
/// do not merge in the agent's input buffer.
const NOTIFICATION_DELAY: Duration = Duration::from_millis(100);

impl<M: MuxAdapter> Daemon<M> {
    /// Deliver a send/instruct envelope into the recipient's pane.
    ///
    /// A missing pane binding (or a pane that no longer exists) is warned
    /// and the envelope dropped: retrying cannot succeed within this
    /// daemon lifetime.
    pub(crate) async fn handle_send(&mut self, envelope: &Envelope) -> Result<(), HandlerError> {
        let task_id = task_id_of(&envelope.to).to_string();

        let Some(pane) = self.registry.pane_of(&task_id).map(str::to_string) else {
            tracing::warn!(task_id, "no pane found for task, dropping message");
            return Ok(());
        };

        let text = envelope.send_text();
        match self.type_line(&pane, &text).await {
            Ok(()) => {}
            Err(MuxError::NotFound(_)) => {
                tracing::warn!(task_id, pane = %pane, "pane is gone, dropping message");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let preview: String = text.chars().take(TEXT_PREVIEW_LEN).collect();
        tracing::info!(task_id, preview = %preview, "sent text to pane");
        Ok(())
    }

    /// Journal a post-category envelope and, for results, transition the
    /// unit and propagate to its parent.
    pub(crate) async fn handle_post(&mut self, envelope: &Envelope) -> Result<(), HandlerError> {
        self.journal.append(envelope)?;

        let Some(task_id) = envelope.task_id.clone() else {
            tracing::info!(kind = %envelope.kind, from = %envelope.from, "journaled post");
            return Ok(());
        };

        if envelope.kind == MessageKind::Result {
            let parent_id = match self.registry.unit_mut(&task_id) {
                Some(unit) => {
                    unit.complete(envelope.result_is_error(), envelope.ts, envelope.data.clone());
                    let parent = unit.parent_unit_id().map(str::to_string);
                    self.registry.save_units()?;
                    parent
                }
                None => {
                    tracing::warn!(task_id, "result for unknown unit, journaled only");
                    None
                }
            };

            if let Some(parent_id) = parent_id {
                self.propagate_result(&parent_id, &task_id, envelope).await?;
            }
        }

        tracing::info!(kind = %envelope.kind, from = %envelope.from, task_id, "journaled post");
        Ok(())
    }

    /// Upsert the child's record in the parent's `children-status.yml` and
    /// type a notification line into the parent's pane.
    async fn propagate_result(
        &mut self,
        parent_id: &str,
        child_id: &str,
        envelope: &Envelope,
    ) -> Result<(), HandlerError> {
        let is_error = envelope.result_is_error();
        let status = if is_error { "error" } else { "completed" };

        let Some(parent) = self.registry.unit(parent_id) else {
            tracing::warn!(parent_id, child_id, "parent unit not found, skipping propagation");
            return Ok(());
        };
        let status_path = parent.cwd.join("children-status.yml");

        let mut doc = match ChildrenStatus::load_or_default(&status_path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %status_path.display(), error = %e, "unreadable children-status.yml, rebuilding");
                ChildrenStatus::default()
            }
        };
        doc.upsert(ChildRecord {
            unit_id: child_id.to_string(),
            status: status.to_string(),
            completed_at: iso8601(envelope.ts),
            error_message: if is_error {
                envelope.result_message()
            } else {
                None
            },
        });
        doc.save(&status_path)?;
        tracing::info!(parent_id, child_id, status, "updated children-status.yml");

        let Some(pane) = self.registry.pane_of(parent_id).map(str::to_string) else {
            tracing::warn!(parent_id, "no pane found for parent unit, skipping notification");
            return Ok(());
        };
        let notification = format!(
            "[CHILD:{}] Status: {}, Message: {}",
            child_id,
            status,
            envelope.result_summary()
        );
        match self.type_line(&pane, &notification).await {
            Ok(()) => {}
            Err(MuxError::NotFound(_)) => {
                tracing::warn!(parent_id, pane = %pane, "parent pane is gone, skipping notification");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        tokio::time::sleep(NOTIFICATION_DELAY).await;

        tracing::info!(parent_id, child_id, status, "notified parent");
        Ok(())
    }
}
