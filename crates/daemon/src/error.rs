// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-side handler errors.
//!
//! A handler error means the envelope stays in its inbox for the next poll
//! pass; the dispatcher logs and moves on rather than unwinding the loop.

use studio_adapters::{GitError, MuxError};
use studio_core::{DocError, EnvelopeError};
use studio_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("document error: {0}")]
    Doc(#[from] DocError),
    #[error("git error: {0}")]
    Git(#[from] GitError),
    #[error("multiplexer error: {0}")]
    Mux(#[from] MuxError),
    #[error("no pane available for unit {0}")]
    NoPane(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
