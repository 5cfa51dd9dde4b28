// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use studio_core::{Envelope, FakeClock, MessageKind};

#[test]
fn open_touches_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("bus.jsonl");
    let journal = Journal::open(path.clone()).unwrap();
    assert!(path.exists());
    assert_eq!(journal.path(), path);
}

#[test]
fn appends_one_line_per_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::open(dir.path().join("bus.jsonl")).unwrap();
    let clock = FakeClock::new(1_000);

    let first = Envelope::new(
        MessageKind::Log,
        "impl:T001",
        "pmai",
        Some("T001".to_string()),
        json!({"msg": "started"}),
        &clock,
    );
    let second = Envelope::new(
        MessageKind::Result,
        "impl:T001",
        "pmai",
        Some("T001".to_string()),
        json!({"is_error": false, "summary": "Done"}),
        &clock,
    );
    journal.append(&first).unwrap();
    journal.append(&second).unwrap();

    let text = std::fs::read_to_string(journal.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    // Each line is the envelope verbatim.
    let back: Envelope = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(back, first);
    let back: Envelope = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(back, second);
}
