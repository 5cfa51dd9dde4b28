// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use studio_core::{Envelope, FakeClock, MessageKind};
use tempfile::tempdir;

fn envelope_at(ms: i64) -> Envelope {
    let clock = FakeClock::new(ms);
    Envelope::new(
        MessageKind::Log,
        "impl:T001",
        "pmai",
        Some("T001".to_string()),
        json!({"msg": "tick"}),
        &clock,
    )
}

#[test]
fn inbox_dir_layout() {
    assert_eq!(
        inbox_dir(Path::new("/root"), "impl-T001"),
        Path::new("/root/mbox/impl-T001/in")
    );
}

#[test]
fn deliver_then_read_back_round_trips() {
    let dir = tempdir().unwrap();
    let envelope = envelope_at(1_770_091_506_789);

    let path = deliver(dir.path(), &envelope).unwrap();
    assert_eq!(path.file_name().unwrap().to_string_lossy(), format!("{}.json", envelope.id));

    let text = fs::read_to_string(&path).unwrap();
    let back = Envelope::from_json_str(&text).unwrap();
    assert_eq!(back, envelope);
}

#[test]
fn deliver_leaves_no_tmp_files_behind() {
    let dir = tempdir().unwrap();
    deliver(dir.path(), &envelope_at(1_000)).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(!names[0].starts_with(".tmp-"));
}

#[test]
fn pending_skips_tmp_and_non_json() {
    let dir = tempdir().unwrap();
    deliver(dir.path(), &envelope_at(2_000)).unwrap();
    fs::write(dir.path().join(".tmp-half-written.json"), "{").unwrap();
    fs::write(dir.path().join("notes.txt"), "not an envelope").unwrap();

    let files = pending(dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].to_string_lossy().ends_with(".json"));
}

#[test]
fn pending_is_sorted_by_filename() {
    let dir = tempdir().unwrap();
    // Deliver out of order; filename sort restores send order.
    deliver(dir.path(), &envelope_at(3_000)).unwrap();
    deliver(dir.path(), &envelope_at(1_000)).unwrap();
    deliver(dir.path(), &envelope_at(2_000)).unwrap();

    let files = pending(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(files.len(), 3);
}

#[test]
fn pending_on_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let files = pending(&dir.path().join("nope")).unwrap();
    assert!(files.is_empty());
}

#[test]
fn inbox_dirs_walks_recipients_sorted() {
    let root = tempdir().unwrap();
    let mbox = root.path().join("mbox");
    for recipient in ["pmai", "bus", "impl-T001"] {
        fs::create_dir_all(mbox.join(recipient).join("in")).unwrap();
    }
    // A recipient directory without in/ is ignored.
    fs::create_dir_all(mbox.join("stray")).unwrap();

    let dirs = inbox_dirs(&mbox).unwrap();
    let recipients: Vec<String> = dirs
        .iter()
        .map(|d| {
            d.parent()
                .unwrap()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(recipients, vec!["bus", "impl-T001", "pmai"]);
}
