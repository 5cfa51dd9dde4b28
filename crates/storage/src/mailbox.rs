// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic mailbox delivery and draining.
//!
//! An envelope is written to `.tmp-<id>.json` and renamed to `<id>.json`
//! in one step, so a concurrent reader observes it either not at all or
//! fully formed. Files whose names start with `.tmp-` are never read.
//! Within one inbox the drain order is the filename order, which is the
//! send-time order because ids start with a sortable timestamp.

use crate::StorageError;
use std::fs;
use std::path::{Path, PathBuf};
use studio_core::Envelope;

/// Prefix of in-flight temporary files, skipped by readers.
const TMP_PREFIX: &str = ".tmp-";

/// Inbox directory for a recipient: `<root>/mbox/<recipient>/in`.
pub fn inbox_dir(root: &Path, recipient: &str) -> PathBuf {
    root.join("mbox").join(recipient).join("in")
}

/// Deliver an envelope into `dir` via the tmp -> rename discipline.
///
/// Creates the directory if missing. Returns the final path.
pub fn deliver(dir: &Path, envelope: &Envelope) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(dir)?;

    let tmp_path = dir.join(format!("{}{}.json", TMP_PREFIX, envelope.id));
    let final_path = dir.join(format!("{}.json", envelope.id));

    let mut body = envelope.to_pretty_json()?;
    body.push('\n');
    fs::write(&tmp_path, body)?;
    fs::rename(&tmp_path, &final_path)?;

    Ok(final_path)
}

/// Envelope files pending in one inbox, sorted by filename.
///
/// Skips `.tmp-` files and anything that is not `*.json`.
pub fn pending(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(TMP_PREFIX) || !name.ends_with(".json") {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

/// Every `<mbox>/<recipient>/in` directory, sorted by recipient name so a
/// full pass walks mailboxes deterministically.
pub fn inbox_dirs(mbox: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut dirs = Vec::new();
    if !mbox.is_dir() {
        return Ok(dirs);
    }
    for entry in fs::read_dir(mbox)? {
        let entry = entry?;
        let inbox = entry.path().join("in");
        if inbox.is_dir() {
            dirs.push(inbox);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
