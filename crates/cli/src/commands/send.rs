// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `busctl send`: address an envelope to a specific agent's mailbox.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::Path;
use studio_core::{mailbox_name, task_id_of, Envelope, MessageKind, SystemClock, PMAI};
use studio_storage::{deliver, inbox_dir};

#[derive(Args)]
pub struct SendArgs {
    /// Destination agent (e.g. impl:T001)
    #[arg(long)]
    pub to: String,

    /// Message type (e.g. instruct)
    #[arg(long = "type")]
    pub kind: String,

    /// JSON data payload
    #[arg(long)]
    pub data: String,
}

pub fn handle(args: SendArgs, root: &Path) -> Result<()> {
    let kind: MessageKind = args.kind.parse()?;
    let data: Value = serde_json::from_str(&args.data).context("invalid JSON in --data")?;
    let task_id = task_id_of(&args.to).to_string();

    let envelope = Envelope::new(
        kind,
        PMAI,
        args.to.clone(),
        Some(task_id),
        data,
        &SystemClock,
    );
    envelope.validate()?;

    deliver(&inbox_dir(root, &mailbox_name(&args.to)), &envelope)?;
    Ok(())
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
