// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message envelopes and their validation rules.
//!
//! An envelope is the unit of transport on the bus: one JSON object per
//! file, immutable once renamed into an inbox. `data` is carried as an
//! opaque JSON value so post-category payloads reach the journal verbatim;
//! typed views ([`SpawnData`], the result accessors) are applied at the
//! handler that needs them.

use crate::clock::Clock;
use crate::id::envelope_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from constructing, parsing or validating an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown message type: {0}")]
    UnknownKind(String),
    #[error("spawn messages must include task_id")]
    SpawnWithoutTask,
    #[error("result messages must include a boolean is_error in data")]
    ResultWithoutIsError,
}

/// The enumerated envelope types.
///
/// `spawn`, `send` and `instruct` are commands the daemon actuates;
/// `log`, `result`, `error` and `post` are post-category messages that are
/// journaled (with `result` additionally driving status propagation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Spawn,
    Send,
    Instruct,
    Log,
    Result,
    Error,
    Post,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Spawn => "spawn",
            MessageKind::Send => "send",
            MessageKind::Instruct => "instruct",
            MessageKind::Log => "log",
            MessageKind::Result => "result",
            MessageKind::Error => "error",
            MessageKind::Post => "post",
        }
    }

    /// True for the kinds that are journaled rather than actuated.
    pub fn is_post_category(&self) -> bool {
        matches!(
            self,
            MessageKind::Log | MessageKind::Result | MessageKind::Error | MessageKind::Post
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spawn" => Ok(MessageKind::Spawn),
            "send" => Ok(MessageKind::Send),
            "instruct" => Ok(MessageKind::Instruct),
            "log" => Ok(MessageKind::Log),
            "result" => Ok(MessageKind::Result),
            "error" => Ok(MessageKind::Error),
            "post" => Ok(MessageKind::Post),
            other => Err(EnvelopeError::UnknownKind(other.to_string())),
        }
    }
}

/// One message on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub ts: i64,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub data: Value,
}

/// Typed view of a spawn envelope's `data`.
///
/// Every field is optional on the wire; empty strings mean "daemon default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnData {
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub frame: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Envelope {
    /// Construct a fresh envelope, stamping `id` and `ts` from the clock.
    pub fn new<C: Clock>(
        kind: MessageKind,
        from: impl Into<String>,
        to: impl Into<String>,
        task_id: Option<String>,
        data: Value,
        clock: &C,
    ) -> Self {
        let now = clock.now();
        Self {
            id: envelope_id(now),
            ts: now.timestamp_millis(),
            from: from.into(),
            to: to.into(),
            kind,
            task_id,
            data,
        }
    }

    /// Read-side validation: required fields, plus the per-kind rules.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.id.is_empty() {
            return Err(EnvelopeError::MissingField("id"));
        }
        if self.from.is_empty() {
            return Err(EnvelopeError::MissingField("from"));
        }
        if self.to.is_empty() {
            return Err(EnvelopeError::MissingField("to"));
        }
        if self.kind == MessageKind::Spawn && self.task_id.as_deref().unwrap_or("").is_empty() {
            return Err(EnvelopeError::SpawnWithoutTask);
        }
        if self.kind == MessageKind::Result
            && !matches!(self.data.get("is_error"), Some(Value::Bool(_)))
        {
            return Err(EnvelopeError::ResultWithoutIsError);
        }
        Ok(())
    }

    /// Parse and validate an envelope read from disk.
    pub fn from_json_str(s: &str) -> Result<Self, EnvelopeError> {
        let envelope: Envelope = serde_json::from_str(s)?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Pretty-printed wire form (what the atomic writer puts on disk).
    pub fn to_pretty_json(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compact single-line form for the journal.
    pub fn to_journal_line(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode `data` as spawn parameters.
    pub fn spawn_data(&self) -> Result<SpawnData, EnvelopeError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }

    /// Text payload for send/instruct: `data.text` when present, else the
    /// JSON serialization of `data`.
    pub fn send_text(&self) -> String {
        match &self.data {
            Value::Object(map) => match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                _ => self.data.to_string(),
            },
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// `data.is_error` for result envelopes (false when absent).
    pub fn result_is_error(&self) -> bool {
        self.data
            .get("is_error")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `data.summary` for result envelopes, with the conventional default.
    pub fn result_summary(&self) -> String {
        self.data
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Task finished")
            .to_string()
    }

    /// `data.message` for result envelopes (the error detail).
    pub fn result_message(&self) -> Option<String> {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
