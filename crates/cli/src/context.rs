// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit identity resolution from the working directory.
//!
//! The poster derives who it is from directory context alone: the
//! `requirements.yml` gate marks a project workspace, `.parent_unit`
//! names the parent, and the task suffix comes from the parent's
//! task-breakdown document or from the directory name. Deterministic and
//! side-effect-free.

use std::fs;
use std::path::{Path, PathBuf};
use studio_core::{TaskBreakdown, ROOT_UNIT};
use thiserror::Error;

/// Workspace-local marker naming the parent unit.
const PARENT_MARKER: &str = ".parent_unit";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("not a project directory (no requirements.yml in {0})")]
    NotAProject(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identity of the unit running in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    pub unit_id: String,
    pub parent: Option<String>,
}

impl UnitContext {
    /// Resolve the unit identity for `dir`.
    ///
    /// Without a parent marker the directory is the root unit. With one,
    /// the identity is `<parent>-<suffix>` where the suffix is chosen by,
    /// in order: the parent's task-breakdown entry whose id appears in
    /// the directory name; the part after a literal `<parent>-` prefix;
    /// the final `-`-delimited name component; the literal `child`.
    pub fn resolve(dir: &Path) -> Result<Self, ContextError> {
        if !dir.join("requirements.yml").exists() {
            return Err(ContextError::NotAProject(dir.to_path_buf()));
        }

        let marker = dir.join(PARENT_MARKER);
        if !marker.exists() {
            return Ok(Self {
                unit_id: ROOT_UNIT.to_string(),
                parent: None,
            });
        }

        let parent = fs::read_to_string(&marker)?.trim().to_string();
        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = derive_suffix(dir, &dir_name, &parent);

        Ok(Self {
            unit_id: format!("{}-{}", parent, suffix),
            parent: Some(parent),
        })
    }
}

fn derive_suffix(dir: &Path, dir_name: &str, parent: &str) -> String {
    if let Some(id) = suffix_from_breakdown(dir, dir_name, parent) {
        return id;
    }

    let prefix = format!("{}-", parent);
    if let Some(pos) = dir_name.find(&prefix) {
        let rest = &dir_name[pos + prefix.len()..];
        if !rest.is_empty() {
            return rest.to_string();
        }
    }

    if let Some(last) = dir_name.rsplit('-').find(|part| !part.is_empty()) {
        return last.to_string();
    }

    "child".to_string()
}

/// Rule (a): a sibling workspace named `<anything>-<parent>` holding a
/// task-breakdown whose task id appears in this directory's name.
fn suffix_from_breakdown(dir: &Path, dir_name: &str, parent: &str) -> Option<String> {
    let siblings = dir.parent()?;
    let marker = format!("-{}", parent);

    let entries = fs::read_dir(siblings).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&marker) || !entry.path().is_dir() {
            continue;
        }
        let breakdown_path = entry.path().join("task-breakdown.yml");
        if !breakdown_path.exists() {
            continue;
        }
        let Ok(breakdown) = TaskBreakdown::load(&breakdown_path) else {
            continue;
        };
        if let Some(task) = breakdown.task_matching(dir_name) {
            return Some(task.id.clone());
        }
    }
    None
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
