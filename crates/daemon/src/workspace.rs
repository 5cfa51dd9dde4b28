// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace materialization for spawned units.
//!
//! Root-synonym units run in the target repository itself; every other
//! unit gets a worktree placed next to the repository (or a plain
//! directory when git cannot provide one). The workspace is then seeded
//! with the unit's marker/tracking files and a copy of the project files
//! the agent needs. Materializing the same unit twice is a no-op.

use crate::config::Config;
use crate::error::HandlerError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use studio_adapters::{git::worktree_path, GitAdapter};
use studio_core::unit::ENV_PARENT_UNIT_ID;
use studio_core::{is_root_unit, ChildrenStatus, TaskBreakdown};

/// Workspace-local marker naming the parent unit.
pub const PARENT_MARKER: &str = ".parent_unit";

/// Ensure the unit's workspace exists and is seeded. Returns its path.
pub async fn materialize(
    config: &Config,
    git: &GitAdapter,
    unit_id: &str,
    branch: &str,
    env: &BTreeMap<String, String>,
) -> Result<PathBuf, HandlerError> {
    let workspace = if is_root_unit(unit_id) {
        config.target_repo.clone()
    } else {
        ensure_worktree(config, git, unit_id, branch).await?
    };

    seed_unit_files(&workspace, unit_id, env)?;
    copy_project_files(config, &workspace, unit_id)?;
    Ok(workspace)
}

/// Worktree in the parallel directory, falling back to a plain directory
/// when the repository cannot host one.
async fn ensure_worktree(
    config: &Config,
    git: &GitAdapter,
    unit_id: &str,
    branch: &str,
) -> Result<PathBuf, HandlerError> {
    let repo = &config.target_repo;
    let path = worktree_path(repo, unit_id);

    if path.exists() {
        return Ok(path);
    }

    if !git.is_repository(repo).await {
        tracing::info!(repo = %repo.display(), "target is not a git repository, using plain directory");
        fs::create_dir_all(&path)?;
        return Ok(path);
    }

    let Some(base) = git.current_branch(repo).await? else {
        tracing::warn!(
            repo = %repo.display(),
            "repository has no branches, using plain directory"
        );
        fs::create_dir_all(&path)?;
        return Ok(path);
    };

    git.ensure_branch(repo, branch, &base).await?;

    if let Err(e) = git.add_worktree(repo, &path, branch).await {
        tracing::warn!(error = %e, path = %path.display(), "worktree add failed, using plain directory");
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

/// Parent marker for children; tracking-document scaffolds for parents.
///
/// Scaffolds are only written when missing so an agent's own breakdown is
/// never clobbered by a respawn.
fn seed_unit_files(
    workspace: &Path,
    unit_id: &str,
    env: &BTreeMap<String, String>,
) -> Result<(), HandlerError> {
    let parent = env
        .get(ENV_PARENT_UNIT_ID)
        .map(String::as_str)
        .filter(|id| !id.is_empty());

    if let Some(parent_id) = parent {
        let marker = workspace.join(PARENT_MARKER);
        let current = fs::read_to_string(&marker).ok();
        if current.as_deref().map(str::trim) != Some(parent_id) {
            fs::write(&marker, parent_id)?;
            tracing::info!(unit_id, parent_id, "wrote parent marker");
        }
        return Ok(());
    }

    let breakdown = workspace.join("task-breakdown.yml");
    if !breakdown.exists() {
        fs::write(&breakdown, TaskBreakdown::scaffold(unit_id))?;
        tracing::info!(unit_id, "seeded task-breakdown.yml");
    }
    let children = workspace.join("children-status.yml");
    if !children.exists() {
        fs::write(&children, ChildrenStatus::scaffold())?;
        tracing::info!(unit_id, "seeded children-status.yml");
    }
    Ok(())
}

/// Copy the frame prompt, requirements snapshot and optional credentials /
/// tool directory into the workspace. Copies are skipped when source and
/// destination coincide (root unit running in the target repository).
fn copy_project_files(
    config: &Config,
    workspace: &Path,
    unit_id: &str,
) -> Result<(), HandlerError> {
    let frame = config.frame_path(unit_id);
    if frame.exists() {
        copy_if_different(&frame, &workspace.join("CLAUDE.md"))?;
    } else {
        tracing::warn!(frame = %frame.display(), "frame prompt not found");
    }

    let requirements = config.target_repo.join("requirements.yml");
    if requirements.exists() {
        copy_if_different(&requirements, &workspace.join("requirements.yml"))?;
    } else {
        tracing::warn!(
            repo = %config.target_repo.display(),
            "requirements.yml not found in target repository"
        );
    }

    let env_local = config.target_repo.join(".env.local");
    if env_local.exists() {
        copy_if_different(&env_local, &workspace.join(".env.local"))?;
    }

    let claude_dir = config.target_repo.join(".claude");
    if claude_dir.is_dir() {
        let dest = workspace.join(".claude");
        if claude_dir != dest {
            copy_dir_recursive(&claude_dir, &dest)?;
        }
    }

    Ok(())
}

fn copy_if_different(src: &Path, dest: &Path) -> std::io::Result<()> {
    if src == dest {
        return Ok(());
    }
    fs::copy(src, dest)?;
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
