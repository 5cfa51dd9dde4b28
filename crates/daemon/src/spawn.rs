// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The spawn actuator.
//!
//! Turns a spawn envelope into a running agent: workspace, pane, shell
//! environment, agent launch, output tee, warm-up, initial instruction and
//! the task record. Step order matters; a failure before the first
//! keystroke fails the whole spawn (the envelope is retried), afterwards
//! the handler commits and later errors are only logged.

use crate::daemon::Daemon;
use crate::error::HandlerError;
use crate::workspace;
use studio_adapters::MuxAdapter;
use studio_core::unit::{ENV_TARGET_REPO, ENV_UNIT_ID};
use studio_core::{is_root_unit, Envelope, UnitRecord};

impl<M: MuxAdapter> Daemon<M> {
    pub(crate) async fn handle_spawn(&mut self, envelope: &Envelope) -> Result<(), HandlerError> {
        // Validation guarantees task_id for spawn envelopes.
        let task_id = envelope.task_id.clone().unwrap_or_default();
        let data = envelope.spawn_data()?;
        let branch = if data.branch.is_empty() {
            format!("feat/{}", task_id)
        } else {
            data.branch.clone()
        };
        // The frame choice keys off the unit identity, which spawn
        // envelopes carry in env; the task id is the fallback.
        let unit_id = data
            .env
            .get(ENV_UNIT_ID)
            .cloned()
            .unwrap_or_else(|| task_id.clone());

        // Steps 1-3: workspace (worktree or fallback directory, marker and
        // seed files, project file copies).
        let workspace_path =
            workspace::materialize(&self.config, &self.git, &unit_id, &branch, &data.env).await?;

        // Step 4: pane allocation; the MAIN frame is re-ensured first so a
        // spawn arriving before any layout exists still lands somewhere.
        self.layout
            .ensure_main_window(&self.config.journal_path())
            .await?;
        let Some(target) = self.layout.allocate(&task_id).await? else {
            return Err(HandlerError::NoPane(task_id));
        };

        // Step 5: position the shell, export the environment, launch the
        // agent. The first keystroke commits the spawn.
        let cd = format!("cd \"{}\"", escape_double_quoted(&workspace_path.to_string_lossy()));
        self.type_line(&target, &cd).await?;

        let mut prelude = vec![
            format!(
                "export PATH=\"{}:$PATH\"",
                self.config.bin_dir().display()
            ),
            format!("export ROOT=\"{}\"", self.config.root.display()),
            format!("export BUSCTL_ROOT=\"{}\"", self.config.root.display()),
            format!("export TASK_ID=\"{}\"", task_id),
        ];
        if !data.goal.is_empty() {
            prelude.push(format!(
                "export TASK_GOAL=\"{}\"",
                escape_double_quoted(&data.goal)
            ));
        }
        if is_root_unit(&task_id) {
            prelude.push(format!(
                "export {}=\"{}\"",
                ENV_TARGET_REPO,
                self.config.target_repo.display()
            ));
        }
        for (key, value) in &data.env {
            prelude.push(format!(
                "export {}=\"{}\"",
                key,
                escape_double_quoted(value)
            ));
        }
        for line in &prelude {
            self.commit_type_line(&target, line).await;
        }
        let agent_cmd = self.config.agent_cmd.clone();
        self.commit_type_line(&target, &agent_cmd).await;

        // Step 6: resolve the stable pane id and tee its output.
        let pane = match self.mux.pane_id(&target).await {
            Ok(pane) => pane,
            Err(e) => {
                tracing::error!(task_id, error = %e, "could not resolve pane id, using target");
                target.clone()
            }
        };
        let raw_log = self.config.raw_log_path(&task_id);
        let tee = format!("stdbuf -oL -eL tee -a '{}'", raw_log.display());
        if let Err(e) = self.mux.pipe_pane(&pane, &tee).await {
            tracing::error!(task_id, error = %e, "failed to install output tee");
        }

        // Step 7: pane binding.
        self.registry.record_pane(task_id.as_str(), pane.as_str())?;
        tracing::info!(task_id, pane = %pane, "spawned unit");

        // Step 8: warm-up, then the initial instruction.
        if !self.config.warmup.is_zero() {
            tokio::time::sleep(self.config.warmup).await;
        }
        let instruction = initial_instruction(&task_id, &data.goal);
        self.commit_type_line(&pane, &instruction).await;

        // Step 9: task record.
        let mut unit = UnitRecord::new(task_id.clone(), workspace_path, envelope.ts);
        unit.branch = branch;
        unit.goal = data.goal;
        unit.frame = data.frame;
        unit.env = data.env;
        self.registry.insert_unit(unit)?;

        Ok(())
    }

    /// Literal text followed by Enter, with the cosmetic settle delay.
    pub(crate) async fn type_line(
        &self,
        target: &str,
        line: &str,
    ) -> Result<(), studio_adapters::MuxError> {
        self.mux.send_literal(target, line).await?;
        self.mux.send_key(target, "Enter").await?;
        if !self.config.mux_delay.is_zero() {
            tokio::time::sleep(self.config.mux_delay).await;
        }
        Ok(())
    }

    /// [`Self::type_line`] in the committed phase of a spawn: errors are
    /// logged, never propagated.
    async fn commit_type_line(&self, target: &str, line: &str) {
        if let Err(e) = self.type_line(target, line).await {
            tracing::error!(target, error = %e, "keystroke failed after spawn committed");
        }
    }
}

/// Escape a value for interpolation inside a double-quoted shell string.
fn escape_double_quoted(value: &str) -> String {
    value.replace('"', "\\\"").replace('$', "\\$")
}

/// The directive typed into a fresh agent once it is warm.
fn initial_instruction(unit_id: &str, goal: &str) -> String {
    if is_root_unit(unit_id) {
        return "Read CLAUDE.md and follow its instructions. Your first task is to read \
                requirements.yml and break it down into subtasks."
            .to_string();
    }
    let mut message = format!(
        "You are unit {}. Read CLAUDE.md and follow its instructions.",
        unit_id
    );
    if !goal.is_empty() {
        message.push_str(&format!(" Task goal: {}", goal));
    }
    message
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
