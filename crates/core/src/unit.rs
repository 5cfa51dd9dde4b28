// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit records: one running agent and its workspace.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Well-known environment keys in a unit's environment mapping.
pub const ENV_UNIT_ID: &str = "UNIT_ID";
pub const ENV_PARENT_UNIT_ID: &str = "PARENT_UNIT_ID";
pub const ENV_TARGET_REPO: &str = "TARGET_REPO";

/// Lifecycle of a unit. Units are never deleted by the daemon; operator
/// cleanup is external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Running,
    Done,
    Error,
}

/// Persistent record of one unit, as stored in `state/tasks.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: String,
    pub status: UnitStatus,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Workspace path: the target repository for the root unit, a parallel
    /// worktree directory for everything else.
    pub cwd: PathBuf,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub frame: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl UnitRecord {
    pub fn new(id: impl Into<String>, cwd: PathBuf, created_at: i64) -> Self {
        Self {
            id: id.into(),
            status: UnitStatus::Running,
            created_at,
            completed_at: None,
            cwd,
            branch: String::new(),
            goal: String::new(),
            frame: String::new(),
            env: BTreeMap::new(),
            result: None,
        }
    }

    /// The parent identity, when this unit was spawned as a child.
    pub fn parent_unit_id(&self) -> Option<&str> {
        self.env
            .get(ENV_PARENT_UNIT_ID)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Apply a terminal result to this record.
    pub fn complete(&mut self, is_error: bool, ts: i64, result: Value) {
        self.status = if is_error {
            UnitStatus::Error
        } else {
            UnitStatus::Done
        };
        self.completed_at = Some(ts);
        self.result = Some(result);
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
