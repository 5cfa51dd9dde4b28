// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git adapter: the narrow slice of git the orchestrator needs.
//!
//! Repository detection, branch discovery and creation, bootstrap of an
//! empty repository, and worktree creation. Commands are argv arrays run
//! through `git -C <repo>`; nothing goes through a shell.

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT};
use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("worktree add failed: {0}")]
    WorktreeFailed(String),
    #[error("repository has no branches: {0}")]
    NoBranches(PathBuf),
}

/// Identity used for the bootstrap commit when the repository has none.
const DEFAULT_USER_NAME: &str = "AI App Studio";
const DEFAULT_USER_EMAIL: &str = "ai-app-studio@localhost";

/// `.gitignore` seeded into a repository that has no commits yet, so the
/// orchestrator's own state directory never ends up tracked.
const BOOTSTRAP_GITIGNORE: &str =
    "# AI App Studio\n.ai-app-studio/\n*.pyc\n__pycache__/\n.DS_Store\n";

/// Worktree placement rule: worktrees are siblings of the main repository
/// (`<repo-parent>/<repo-name>-<unit-id>`), never subdirectories, so
/// repository-wide ignore rules cannot mask them.
pub fn worktree_path(repo: &Path, unit_id: &str) -> PathBuf {
    let name = repo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    let parent = repo.parent().unwrap_or(repo);
    parent.join(format!("{}-{}", name, unit_id))
}

/// Subprocess-backed git operations.
#[derive(Clone, Default)]
pub struct GitAdapter;

impl GitAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn git(&self, repo: &Path, args: &[&str]) -> Result<Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(args);
        run_with_timeout(cmd, GIT_TIMEOUT, "git")
            .await
            .map_err(GitError::CommandFailed)
    }

    /// Like [`git`], but non-zero exit is an error carrying stderr.
    async fn git_ok(&self, repo: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.git(repo, args).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// True iff `path` is inside a git repository.
    pub async fn is_repository(&self, path: &Path) -> bool {
        self.git(path, &["rev-parse", "--git-dir"])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// The current branch name.
    ///
    /// Falls back from `branch --show-current` (empty when detached) to the
    /// symbolic HEAD, then to the first listed branch. `None` when the
    /// repository has no branches at all.
    pub async fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError> {
        let shown = self.git(repo, &["branch", "--show-current"]).await?;
        let name = String::from_utf8_lossy(&shown.stdout).trim().to_string();
        if shown.status.success() && !name.is_empty() {
            return Ok(Some(name));
        }

        if let Ok(head) = self.git_ok(repo, &["symbolic-ref", "--short", "HEAD"]).await {
            if !head.is_empty() {
                return Ok(Some(head));
            }
        }

        let listed = self
            .git(repo, &["branch", "--format=%(refname:short)"])
            .await?;
        let first = String::from_utf8_lossy(&listed.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        Ok(first)
    }

    pub async fn branch_exists(&self, repo: &Path, name: &str) -> bool {
        let branch_ref = format!("refs/heads/{}", name);
        self.git(repo, &["show-ref", "--verify", "--quiet", &branch_ref])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Create `name` from `base` if it does not exist yet.
    ///
    /// When `base` has no commits (empty repository), bootstrap first:
    /// seed a `.gitignore`, configure a default identity if missing, and
    /// create an empty initial commit. The bootstrap creates exactly one
    /// commit in a previously empty repository.
    pub async fn ensure_branch(&self, repo: &Path, name: &str, base: &str) -> Result<(), GitError> {
        if self.branch_exists(repo, name).await {
            return Ok(());
        }

        let base_resolves = self
            .git(repo, &["rev-parse", "--verify", base])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !base_resolves {
            tracing::info!(repo = %repo.display(), "repository has no commits, bootstrapping");
            self.create_initial_commit(repo).await?;
        }

        self.git_ok(repo, &["branch", name, base]).await?;
        tracing::info!(branch = name, base, "created git branch");
        Ok(())
    }

    /// Seed `.gitignore` + default identity and create an empty initial
    /// commit.
    async fn create_initial_commit(&self, repo: &Path) -> Result<(), GitError> {
        let identity_set = self
            .git(repo, &["config", "user.name"])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !identity_set {
            self.git_ok(repo, &["config", "user.name", DEFAULT_USER_NAME])
                .await?;
            self.git_ok(repo, &["config", "user.email", DEFAULT_USER_EMAIL])
                .await?;
            tracing::info!("set default git identity for initial commit");
        }

        let gitignore = repo.join(".gitignore");
        if !gitignore.exists() {
            std::fs::write(&gitignore, BOOTSTRAP_GITIGNORE)
                .map_err(|e| GitError::CommandFailed(format!("write .gitignore: {}", e)))?;
            self.git_ok(repo, &["add", ".gitignore"]).await?;
        }

        self.git_ok(repo, &["commit", "-m", "Initial commit", "--allow-empty"])
            .await?;
        tracing::info!("created initial commit");
        Ok(())
    }

    /// `git worktree add <path> <branch>`.
    ///
    /// The caller decides the fallback (plain directory) on failure.
    pub async fn add_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        let output = self
            .git(repo, &["worktree", "add", path_str.as_ref(), branch])
            .await?;
        if !output.status.success() {
            return Err(GitError::WorktreeFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        tracing::info!(path = %path.display(), branch, "created worktree");
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
