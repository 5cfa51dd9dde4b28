// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Config;
use serde_json::json;
use std::fs;
use studio_adapters::{FakeMux, MuxCall};
use studio_core::{FakeClock, MessageKind, UnitStatus};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    daemon: Daemon<FakeMux>,
    mux: FakeMux,
    clock: FakeClock,
}

async fn fixture() -> Fixture {
    fixture_with_mux(FakeMux::new()).await
}

async fn fixture_with_mux(mux: FakeMux) -> Fixture {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join("project");
    fs::create_dir_all(&repo).unwrap();
    fs::write(repo.join("requirements.yml"), "app: demo\n").unwrap();

    let studio = dir.path().join("studio");
    fs::create_dir_all(studio.join("frames/root")).unwrap();
    fs::create_dir_all(studio.join("frames/unit")).unwrap();
    fs::write(studio.join("frames/root/CLAUDE.md"), "root frame\n").unwrap();
    fs::write(studio.join("frames/unit/CLAUDE.md"), "unit frame\n").unwrap();

    let config = Config::for_tests(&repo, &repo.join(".ai-app-studio"), &studio);
    let mut daemon = Daemon::new(config, mux.clone()).unwrap();
    daemon.init().await.unwrap();
    Fixture {
        _dir: dir,
        daemon,
        mux,
        clock: FakeClock::new(1_770_091_506_789),
    }
}

fn spawn_envelope(fx: &Fixture, task_id: &str, env: serde_json::Value) -> Envelope {
    Envelope::new(
        MessageKind::Spawn,
        task_id,
        "bus",
        Some(task_id.to_string()),
        json!({"cwd": "", "frame": "", "goal": "", "branch": "", "env": env}),
        &fx.clock,
    )
}

#[tokio::test]
async fn root_spawn_lands_in_pane_zero_with_target_repo_export() {
    let mut fx = fixture().await;
    let envelope = spawn_envelope(&fx, "root", json!({"UNIT_ID": "root"}));

    fx.daemon.handle_spawn(&envelope).await.unwrap();

    let sends = fx.mux.literal_sends("cc:MAIN.0");
    assert!(sends[0].starts_with("cd \""), "first keystroke is cd: {:?}", sends[0]);
    assert!(sends.iter().any(|s| s.starts_with("export PATH=\"")));
    assert!(sends.iter().any(|s| s.starts_with("export BUSCTL_ROOT=\"")));
    assert!(sends.iter().any(|s| s == "export TASK_ID=\"root\""));
    assert!(sends.iter().any(|s| s.starts_with("export TARGET_REPO=\"")));
    assert!(sends.iter().any(|s| s.starts_with("claude ")));

    // Root runs in the target repository itself, with the root frame.
    let unit = fx.daemon.registry().unit("root").unwrap();
    assert_eq!(unit.cwd, fx.daemon.config().target_repo);
    assert_eq!(unit.status, UnitStatus::Running);
    assert_eq!(unit.created_at, envelope.ts);
    assert_eq!(
        fs::read_to_string(unit.cwd.join("CLAUDE.md")).unwrap(),
        "root frame\n"
    );

    // The warmed-up instruction mentions the frame and the requirements.
    let instruction = fx.mux.literal_sends("%0");
    assert_eq!(instruction.len(), 1);
    assert!(instruction[0].contains("CLAUDE.md"));
    assert!(instruction[0].contains("requirements.yml"));

    // Pane binding recorded against the resolved pane id.
    assert_eq!(fx.daemon.registry().pane_of("root"), Some("%0"));
}

#[tokio::test]
async fn child_spawn_gets_right_pane_worktree_and_tee() {
    let mut fx = fixture().await;
    let envelope = spawn_envelope(
        &fx,
        "root-api",
        json!({"UNIT_ID": "root-api", "PARENT_UNIT_ID": "root"}),
    );

    fx.daemon.handle_spawn(&envelope).await.unwrap();

    // First child takes the base right pane.
    let sends = fx.mux.literal_sends("cc:MAIN.2");
    assert!(sends[0].starts_with("cd \""));
    assert!(sends[0].contains("project-root-api"), "parallel worktree dir: {}", sends[0]);

    // Output tee into the raw log, line-buffered.
    let calls = fx.mux.calls();
    let pipe = calls.iter().find_map(|c| match c {
        MuxCall::PipePane { target, command } => Some((target.clone(), command.clone())),
        _ => None,
    });
    let (pipe_target, pipe_cmd) = pipe.expect("pipe-pane installed");
    assert_eq!(pipe_target, "%2");
    assert!(pipe_cmd.starts_with("stdbuf -oL -eL tee -a "));
    assert!(pipe_cmd.contains("root-api.raw"));

    // Default branch and the record.
    let unit = fx.daemon.registry().unit("root-api").unwrap();
    assert_eq!(unit.branch, "feat/root-api");
    assert_eq!(unit.env.get("PARENT_UNIT_ID").unwrap(), "root");
    assert_eq!(fx.daemon.registry().pane_of("root-api"), Some("%2"));

    // The workspace carries the parent marker.
    assert_eq!(
        fs::read_to_string(unit.cwd.join(".parent_unit")).unwrap(),
        "root"
    );
}

#[tokio::test]
async fn goal_flows_into_export_and_instruction() {
    let mut fx = fixture().await;
    let mut envelope = spawn_envelope(
        &fx,
        "root-api",
        json!({"UNIT_ID": "root-api", "PARENT_UNIT_ID": "root"}),
    );
    envelope.data["goal"] = json!("Build the \"api\" for $5");

    fx.daemon.handle_spawn(&envelope).await.unwrap();

    let sends = fx.mux.literal_sends("cc:MAIN.2");
    // Embedded quotes and dollars are escaped inside the export.
    assert!(
        sends
            .iter()
            .any(|s| s == "export TASK_GOAL=\"Build the \\\"api\\\" for \\$5\""),
        "exports: {:#?}",
        sends
    );

    // The instruction carries the goal verbatim.
    let instruction = fx.mux.literal_sends("%2");
    assert_eq!(
        instruction[0],
        "You are unit root-api. Read CLAUDE.md and follow its instructions. Task goal: Build the \"api\" for $5"
    );
}

#[tokio::test]
async fn custom_env_values_are_escaped() {
    let mut fx = fixture().await;
    let envelope = spawn_envelope(
        &fx,
        "root-api",
        json!({
            "UNIT_ID": "root-api",
            "PARENT_UNIT_ID": "root",
            "API_KEY": "se\"cr$t"
        }),
    );

    fx.daemon.handle_spawn(&envelope).await.unwrap();

    let sends = fx.mux.literal_sends("cc:MAIN.2");
    assert!(
        sends.iter().any(|s| s == "export API_KEY=\"se\\\"cr\\$t\""),
        "exports: {:#?}",
        sends
    );
}

#[tokio::test]
async fn every_literal_is_followed_by_enter() {
    let mut fx = fixture().await;
    let envelope = spawn_envelope(&fx, "root", json!({"UNIT_ID": "root"}));
    fx.daemon.handle_spawn(&envelope).await.unwrap();

    let calls = fx.mux.calls();
    for (i, call) in calls.iter().enumerate() {
        if let MuxCall::Literal { target, .. } = call {
            match calls.get(i + 1) {
                Some(MuxCall::Key { target: key_target, key }) => {
                    assert_eq!(key_target, target);
                    assert_eq!(key, "Enter");
                }
                other => panic!("literal not followed by Enter: {:?}", other),
            }
        }
    }
}

#[tokio::test]
async fn no_space_fails_the_spawn_without_a_record() {
    // The MAIN frame costs two splits; afterwards the window is full.
    let mux = FakeMux::new().with_split_limit(2);
    let mut fx = fixture_with_mux(mux).await;

    // First child occupies the base right pane.
    let first = spawn_envelope(
        &fx,
        "root-api",
        json!({"UNIT_ID": "root-api", "PARENT_UNIT_ID": "root"}),
    );
    fx.daemon.handle_spawn(&first).await.unwrap();

    // Second child needs a split; there is no space.
    let second = spawn_envelope(
        &fx,
        "root-web",
        json!({"UNIT_ID": "root-web", "PARENT_UNIT_ID": "root"}),
    );
    let err = fx.daemon.handle_spawn(&second).await.unwrap_err();
    assert!(matches!(err, HandlerError::NoPane(ref id) if id == "root-web"));

    // No task record, no pane binding for the failed unit.
    assert!(fx.daemon.registry().unit("root-web").is_none());
    assert_eq!(fx.daemon.registry().pane_of("root-web"), None);
}

#[tokio::test]
async fn respawning_a_unit_reuses_its_workspace() {
    let mut fx = fixture().await;
    let envelope = spawn_envelope(
        &fx,
        "root-api",
        json!({"UNIT_ID": "root-api", "PARENT_UNIT_ID": "root"}),
    );

    fx.daemon.handle_spawn(&envelope).await.unwrap();
    let first_cwd = fx.daemon.registry().unit("root-api").unwrap().cwd.clone();

    fx.daemon.handle_spawn(&envelope).await.unwrap();
    let second_cwd = fx.daemon.registry().unit("root-api").unwrap().cwd.clone();
    assert_eq!(first_cwd, second_cwd);
}
