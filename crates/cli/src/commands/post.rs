// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `busctl post`: report to the parent/root mailbox.
//!
//! This is how agents log progress and deliver their terminal result. A
//! `result` without a boolean `is_error` is rejected before anything
//! touches the mailbox.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::Path;
use studio_core::{Envelope, MessageKind, SystemClock, PMAI};
use studio_storage::{deliver, inbox_dir};

#[derive(Args)]
pub struct PostArgs {
    /// Source agent (e.g. impl:T001)
    #[arg(long)]
    pub from: String,

    /// Message type (log, result, error)
    #[arg(long = "type")]
    pub kind: String,

    /// Task ID the message concerns
    #[arg(long)]
    pub task: String,

    /// JSON data payload (result type must include is_error)
    #[arg(long)]
    pub data: String,
}

pub fn handle(args: PostArgs, root: &Path) -> Result<()> {
    let kind: MessageKind = args.kind.parse()?;
    let data: Value = serde_json::from_str(&args.data).context("invalid JSON in --data")?;

    let envelope = Envelope::new(
        kind,
        args.from.clone(),
        PMAI,
        Some(args.task.clone()),
        data,
        &SystemClock,
    );
    envelope.validate()?;

    deliver(&inbox_dir(root, PMAI), &envelope)?;
    Ok(())
}

#[cfg(test)]
#[path = "post_tests.rs"]
mod tests;
