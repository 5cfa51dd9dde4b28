// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use studio_storage::pending;
use tempfile::TempDir;

fn project_dir(base: &Path, name: &str) -> PathBuf {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("requirements.yml"), "app: demo\n").unwrap();
    dir
}

fn bus_envelopes(root: &Path) -> Vec<Envelope> {
    pending(&inbox_dir(root, BUS))
        .unwrap()
        .iter()
        .map(|path| {
            Envelope::from_json_str(&std::fs::read_to_string(path).unwrap()).unwrap()
        })
        .collect()
}

fn args(env: Vec<&str>, from_breakdown: bool) -> SpawnArgs {
    SpawnArgs {
        env: env.into_iter().map(str::to_string).collect(),
        from_breakdown,
    }
}

#[test]
fn default_mode_posts_a_root_spawn() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    handle(args(vec![], false), &root, &cwd).unwrap();

    let envelopes = bus_envelopes(&root);
    assert_eq!(envelopes.len(), 1);
    let envelope = &envelopes[0];

    assert_eq!(envelope.kind, MessageKind::Spawn);
    assert_eq!(envelope.to, "bus");
    assert_eq!(envelope.task_id.as_deref(), Some("root"));

    let data = envelope.spawn_data().unwrap();
    assert_eq!(data.branch, "feat/root");
    assert_eq!(data.cwd, "");
    assert_eq!(data.frame, "");
    assert_eq!(data.goal, "");
    assert_eq!(data.env.get("UNIT_ID").unwrap(), "root");
    assert_eq!(
        data.env.get("TARGET_REPO").unwrap(),
        &cwd.display().to_string()
    );
    assert!(!data.env.contains_key("PARENT_UNIT_ID"));
}

#[test]
fn child_context_carries_parent_env() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project-api");
    std::fs::write(cwd.join(".parent_unit"), "root").unwrap();
    let root = base.path().join("studio-root");

    handle(args(vec![], false), &root, &cwd).unwrap();

    let envelopes = bus_envelopes(&root);
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].task_id.as_deref(), Some("root-api"));

    let data = envelopes[0].spawn_data().unwrap();
    assert_eq!(data.env.get("UNIT_ID").unwrap(), "root-api");
    assert_eq!(data.env.get("PARENT_UNIT_ID").unwrap(), "root");
    assert_eq!(data.branch, "feat/root-api");
}

#[test]
fn operator_env_pairs_are_merged() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    handle(args(vec!["API_KEY=secret", "MODE=fast"], false), &root, &cwd).unwrap();

    let data = bus_envelopes(&root)[0].spawn_data().unwrap();
    assert_eq!(data.env.get("API_KEY").unwrap(), "secret");
    assert_eq!(data.env.get("MODE").unwrap(), "fast");
}

#[test]
fn malformed_env_pair_is_rejected() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    let err = handle(args(vec!["NO_EQUALS"], false), &root, &cwd).unwrap_err();
    assert!(err.to_string().contains("expected K=V"));
    assert!(bus_envelopes(&root).is_empty());
}

#[test]
fn outside_a_project_nothing_is_written() {
    let base = TempDir::new().unwrap();
    let cwd = base.path().join("plain");
    std::fs::create_dir_all(&cwd).unwrap();
    let root = base.path().join("studio-root");

    let err = handle(args(vec![], false), &root, &cwd).unwrap_err();
    assert!(err.to_string().contains("not a project directory"));
    assert!(bus_envelopes(&root).is_empty());
}

#[test]
fn from_breakdown_spawns_remaining_tasks_only() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    std::fs::write(
        cwd.join("task-breakdown.yml"),
        "parent_unit: root\ntasks:\n  - id: api\n    goal: Build the API\n  - id: web\n",
    )
    .unwrap();
    std::fs::write(
        cwd.join("children-status.yml"),
        "children:\n  - unit_id: root-api\n    status: completed\n    completed_at: \"2026-02-03T04:05:06Z\"\n",
    )
    .unwrap();

    handle(args(vec![], true), &root, &cwd).unwrap();

    let envelopes = bus_envelopes(&root);
    assert_eq!(envelopes.len(), 1, "root-api is skipped");
    let envelope = &envelopes[0];
    assert_eq!(envelope.task_id.as_deref(), Some("root-web"));

    let data = envelope.spawn_data().unwrap();
    assert_eq!(data.env.get("UNIT_ID").unwrap(), "root-web");
    assert_eq!(data.env.get("PARENT_UNIT_ID").unwrap(), "root");
    assert_eq!(data.branch, "feat/root-web");
}

#[test]
fn from_breakdown_forwards_task_goals() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    std::fs::write(
        cwd.join("task-breakdown.yml"),
        "parent_unit: root\ntasks:\n  - id: api\n    goal: Build the API\n",
    )
    .unwrap();

    handle(args(vec![], true), &root, &cwd).unwrap();

    let data = bus_envelopes(&root)[0].spawn_data().unwrap();
    assert_eq!(data.goal, "Build the API");
}

#[test]
fn from_breakdown_without_document_fails() {
    let base = TempDir::new().unwrap();
    let cwd = project_dir(base.path(), "my-project");
    let root = cwd.join(".ai-app-studio");

    let err = handle(args(vec![], true), &root, &cwd).unwrap_err();
    assert!(err.to_string().contains("task-breakdown.yml"));
}
