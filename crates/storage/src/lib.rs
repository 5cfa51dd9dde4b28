// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! studio-storage: mailbox delivery, journal and persisted daemon state

pub mod journal;
pub mod mailbox;
pub mod registry;

pub use journal::Journal;
pub use mailbox::{deliver, inbox_dir, inbox_dirs, pending};
pub use registry::Registry;

use thiserror::Error;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("envelope error: {0}")]
    Envelope(#[from] studio_core::EnvelopeError),
}
