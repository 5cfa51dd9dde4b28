// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `busctl spawn`: ask the daemon to start this unit, or its planned
//! children.

use crate::context::UnitContext;
use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use studio_core::unit::{ENV_PARENT_UNIT_ID, ENV_TARGET_REPO, ENV_UNIT_ID};
use studio_core::{ChildrenStatus, Envelope, MessageKind, SystemClock, TaskBreakdown, BUS};
use studio_storage::{deliver, inbox_dir};

#[derive(Args)]
pub struct SpawnArgs {
    /// Extra K=V pairs merged into the spawned unit's environment
    #[arg(long = "env", value_name = "K=V")]
    pub env: Vec<String>,

    /// Read ./task-breakdown.yml and spawn one child per task not already
    /// present in ./children-status.yml
    #[arg(long = "from-breakdown")]
    pub from_breakdown: bool,
}

pub fn handle(args: SpawnArgs, root: &Path, cwd: &Path) -> Result<()> {
    let context = UnitContext::resolve(cwd)?;
    let extra = parse_env_pairs(&args.env)?;

    if args.from_breakdown {
        spawn_from_breakdown(&context, &extra, root, cwd)
    } else {
        spawn_unit(&context, &extra, root, cwd)
    }
}

/// Default mode: one spawn envelope for this unit, env and branch derived
/// from the resolved identity, everything else left to daemon defaults.
fn spawn_unit(
    context: &UnitContext,
    extra: &BTreeMap<String, String>,
    root: &Path,
    cwd: &Path,
) -> Result<()> {
    let env = unit_env(&context.unit_id, context.parent.as_deref(), cwd, extra);
    post_spawn(&context.unit_id, &context.unit_id, "", env, root)?;
    println!("spawned {}", context.unit_id);
    Ok(())
}

/// Fan-out mode: one envelope per breakdown task that has no record in
/// children-status.yml yet.
fn spawn_from_breakdown(
    context: &UnitContext,
    extra: &BTreeMap<String, String>,
    root: &Path,
    cwd: &Path,
) -> Result<()> {
    let breakdown = TaskBreakdown::load(&cwd.join("task-breakdown.yml"))
        .context("reading task-breakdown.yml")?;
    let children = ChildrenStatus::load_or_default(&cwd.join("children-status.yml"))
        .context("reading children-status.yml")?;

    let mut spawned = 0;
    for task in &breakdown.tasks {
        let child_id = format!("{}-{}", context.unit_id, task.id);
        if children.contains(&child_id) {
            println!("skipping {} (already spawned)", child_id);
            continue;
        }

        let env = unit_env(&child_id, Some(&context.unit_id), cwd, extra);
        post_spawn(
            &context.unit_id,
            &child_id,
            task.goal.as_deref().unwrap_or(""),
            env,
            root,
        )?;
        println!("spawned {}", child_id);
        spawned += 1;
    }

    if spawned == 0 {
        println!("no tasks to spawn");
    }
    Ok(())
}

fn unit_env(
    unit_id: &str,
    parent: Option<&str>,
    cwd: &Path,
    extra: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert(ENV_UNIT_ID.to_string(), unit_id.to_string());
    if let Some(parent_id) = parent {
        env.insert(ENV_PARENT_UNIT_ID.to_string(), parent_id.to_string());
    }
    env.insert(
        ENV_TARGET_REPO.to_string(),
        target_repo(cwd).display().to_string(),
    );
    env.extend(extra.clone());
    env
}

/// The repository the daemon should build worktrees from: the inherited
/// `$TARGET_REPO` when the poster runs inside a spawned pane, else the
/// working directory itself.
fn target_repo(cwd: &Path) -> PathBuf {
    std::env::var_os(ENV_TARGET_REPO)
        .map(PathBuf::from)
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn post_spawn(
    from: &str,
    task_id: &str,
    goal: &str,
    env: BTreeMap<String, String>,
    root: &Path,
) -> Result<()> {
    let data = json!({
        "cwd": "",
        "frame": "",
        "goal": goal,
        "branch": format!("feat/{}", task_id),
        "env": env,
    });
    let envelope = Envelope::new(
        MessageKind::Spawn,
        from,
        BUS,
        Some(task_id.to_string()),
        data,
        &SystemClock,
    );
    envelope.validate()?;
    deliver(&inbox_dir(root, BUS), &envelope)?;
    Ok(())
}

fn parse_env_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --env value '{}', expected K=V", pair);
        };
        if key.is_empty() {
            bail!("invalid --env value '{}', empty key", pair);
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
