// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

// Environment-variable driven behavior is covered indirectly: process-wide
// env mutation races with parallel tests, so these tests stick to the
// derived-path logic.

#[test]
fn derived_paths_hang_off_the_root() {
    let config = Config::for_tests(
        Path::new("/work/repo"),
        Path::new("/work/repo/.ai-app-studio"),
        Path::new("/opt/studio"),
    );

    assert_eq!(config.mbox_dir(), Path::new("/work/repo/.ai-app-studio/mbox"));
    assert_eq!(
        config.journal_path(),
        Path::new("/work/repo/.ai-app-studio/logs/bus.jsonl")
    );
    assert_eq!(
        config.raw_log_path("root-api"),
        Path::new("/work/repo/.ai-app-studio/logs/raw/root-api.raw")
    );
    assert_eq!(config.state_dir(), Path::new("/work/repo/.ai-app-studio/state"));
    assert_eq!(config.bin_dir(), Path::new("/opt/studio/bin"));
}

#[test]
fn frame_path_depends_on_unit_kind() {
    let config = Config::for_tests(
        Path::new("/work/repo"),
        Path::new("/tmp/root"),
        Path::new("/opt/studio"),
    );

    assert_eq!(
        config.frame_path("root"),
        Path::new("/opt/studio/frames/root/CLAUDE.md")
    );
    assert_eq!(
        config.frame_path("pmai"),
        Path::new("/opt/studio/frames/root/CLAUDE.md")
    );
    assert_eq!(
        config.frame_path("root-api"),
        Path::new("/opt/studio/frames/unit/CLAUDE.md")
    );
}

#[test]
fn ensure_dirs_creates_the_layout() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join(".ai-app-studio");
    let config = Config::for_tests(dir.path(), &root, dir.path());

    config.ensure_dirs().unwrap();

    assert!(root.join("mbox").is_dir());
    assert!(root.join("logs/raw").is_dir());
    assert!(root.join("state").is_dir());
}
