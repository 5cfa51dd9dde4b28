// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use studio_storage::pending;
use tempfile::TempDir;
use yare::parameterized;

fn args(kind: &str, data: &str) -> PostArgs {
    PostArgs {
        from: "impl:T001".to_string(),
        kind: kind.to_string(),
        task: "T001".to_string(),
        data: data.to_string(),
    }
}

#[test]
fn posts_land_in_the_root_mailbox() {
    let root = TempDir::new().unwrap();

    handle(args("log", r#"{"msg": "Task started"}"#), root.path()).unwrap();

    let files = pending(&inbox_dir(root.path(), "pmai")).unwrap();
    assert_eq!(files.len(), 1);
    let envelope =
        Envelope::from_json_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(envelope.kind, MessageKind::Log);
    assert_eq!(envelope.from, "impl:T001");
    assert_eq!(envelope.to, "pmai");
    assert_eq!(envelope.task_id.as_deref(), Some("T001"));
}

#[parameterized(
    ok_false = { r#"{"is_error": false, "summary": "Done"}"# },
    ok_true = { r#"{"is_error": true, "message": "boom"}"# },
)]
fn results_with_is_error_are_accepted(data: &str) {
    let root = TempDir::new().unwrap();
    handle(args("result", data), root.path()).unwrap();
    assert_eq!(pending(&inbox_dir(root.path(), "pmai")).unwrap().len(), 1);
}

#[test]
fn result_without_is_error_is_rejected_before_writing() {
    let root = TempDir::new().unwrap();

    let err = handle(args("result", r#"{"summary": "x"}"#), root.path()).unwrap_err();
    assert!(err.to_string().contains("is_error"), "diagnostic names the field: {err}");

    // Nothing reached the mailbox.
    assert!(pending(&inbox_dir(root.path(), "pmai")).unwrap().is_empty());
}

#[test]
fn invalid_json_is_rejected() {
    let root = TempDir::new().unwrap();
    let err = handle(args("log", "{oops"), root.path()).unwrap_err();
    assert!(err.to_string().contains("invalid JSON"));
}
