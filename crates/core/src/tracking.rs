// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two workspace-local tracking documents.
//!
//! `task-breakdown.yml` is authored by a parent agent and lists the
//! subtasks it intends to spawn; `children-status.yml` is maintained by the
//! daemon and records the latest terminal status of each child. Both are
//! parsed leniently: unknown fields are ignored so agents may annotate
//! them freely.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One subtask in a breakdown document. Only `id` is required; a `goal`
/// is forwarded to the child's spawn when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// `task-breakdown.yml`: the ordered list of subtasks a unit plans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unit: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

impl TaskBreakdown {
    pub fn load(path: &Path) -> Result<Self, DocError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// The empty scaffold seeded into a fresh parent workspace.
    pub fn scaffold(parent_unit: &str) -> String {
        format!(
            "# Task breakdown for {parent_unit}\nparent_unit: {parent_unit}\ntotal_tasks: 0\ntasks: []\n"
        )
    }

    /// First task whose id appears inside `name` (used when deriving a unit
    /// identity from a worktree directory name).
    pub fn task_matching<'a>(&'a self, name: &str) -> Option<&'a TaskEntry> {
        self.tasks
            .iter()
            .find(|task| !task.id.is_empty() && name.contains(&task.id))
    }
}

/// One child's latest status inside `children-status.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub unit_id: String,
    /// `completed` or `error` for terminal results.
    pub status: String,
    /// ISO-8601 UTC.
    pub completed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// `children-status.yml`: the daemon-maintained child ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildrenStatus {
    #[serde(default)]
    pub children: Vec<ChildRecord>,
}

impl ChildrenStatus {
    /// Load the document, starting empty when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, DocError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DocError> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// The empty scaffold seeded into a fresh parent workspace.
    pub fn scaffold() -> String {
        "# Children unit status tracking\nchildren: []\n".to_string()
    }

    pub fn contains(&self, unit_id: &str) -> bool {
        self.children.iter().any(|child| child.unit_id == unit_id)
    }

    /// Insert or replace the record with the same `unit_id`, keeping at
    /// most one entry per child.
    pub fn upsert(&mut self, record: ChildRecord) {
        match self
            .children
            .iter_mut()
            .find(|child| child.unit_id == record.unit_id)
        {
            Some(existing) => *existing = record,
            None => self.children.push(record),
        }
    }
}

#[cfg(test)]
#[path = "tracking_tests.rs"]
mod tests;
