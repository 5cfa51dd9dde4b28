// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn new_records_start_running() {
    let unit = UnitRecord::new("root-api", PathBuf::from("/work/repo-root-api"), 1_000);
    assert_eq!(unit.status, UnitStatus::Running);
    assert_eq!(unit.created_at, 1_000);
    assert!(unit.completed_at.is_none());
    assert!(unit.result.is_none());
}

#[test]
fn parent_unit_id_reads_env() {
    let mut unit = UnitRecord::new("root-api", PathBuf::from("/tmp"), 0);
    assert_eq!(unit.parent_unit_id(), None);

    unit.env
        .insert(ENV_PARENT_UNIT_ID.to_string(), "root".to_string());
    assert_eq!(unit.parent_unit_id(), Some("root"));

    // Empty string means no parent.
    unit.env
        .insert(ENV_PARENT_UNIT_ID.to_string(), String::new());
    assert_eq!(unit.parent_unit_id(), None);
}

#[test]
fn complete_sets_terminal_state() {
    let mut unit = UnitRecord::new("T001", PathBuf::from("/tmp"), 0);
    unit.complete(false, 2_000, json!({"is_error": false, "summary": "Done"}));
    assert_eq!(unit.status, UnitStatus::Done);
    assert_eq!(unit.completed_at, Some(2_000));

    let mut unit = UnitRecord::new("T002", PathBuf::from("/tmp"), 0);
    unit.complete(true, 3_000, json!({"is_error": true, "message": "boom"}));
    assert_eq!(unit.status, UnitStatus::Error);
    assert_eq!(unit.result.as_ref().unwrap()["message"], "boom");
}

#[test]
fn status_serializes_lowercase() {
    let unit = UnitRecord::new("T001", PathBuf::from("/tmp"), 0);
    let wire = serde_json::to_value(&unit).unwrap();
    assert_eq!(wire["status"], "running");

    // Optional fields stay off the wire until set.
    assert!(wire.get("completed_at").is_none());
    assert!(wire.get("result").is_none());
}
