// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope id generation.
//!
//! An envelope id is `<sortable-stamp>-<12-hex>`: a UTC timestamp rendered
//! so that lexicographic order equals send order, plus a random tag that
//! disambiguates concurrent writers.

use chrono::{DateTime, Utc};

/// Length of the random hex tag.
const TAG_LEN: usize = 12;

/// Render an instant in the sortable form `20260203T040506.789Z`.
pub fn sortable_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Generate a random lowercase hex tag.
pub fn hex_tag() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..TAG_LEN)
        .map(|_| format!("{:x}", rng.random::<u8>() % 16))
        .collect()
}

/// Build a fresh envelope id for the given instant.
pub fn envelope_id(now: DateTime<Utc>) -> String {
    format!("{}-{}", sortable_stamp(now), hex_tag())
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
