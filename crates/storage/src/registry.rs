// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's registry: pane bindings and unit records.
//!
//! Both maps are owned by the single daemon loop (one writer, no locking)
//! and rewritten wholesale after each mutation. `panes.json` is a plain
//! object `unit-id -> pane specifier`; `tasks.json` is an array of unit
//! records. Corrupt or missing state files are tolerated: the daemon
//! starts empty and logs a warning.

use crate::StorageError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use studio_core::UnitRecord;

const PANES_FILE: &str = "panes.json";
const TASKS_FILE: &str = "tasks.json";

/// In-memory maps with persist-on-change.
#[derive(Debug)]
pub struct Registry {
    state_dir: PathBuf,
    panes: BTreeMap<String, String>,
    units: BTreeMap<String, UnitRecord>,
}

impl Registry {
    /// Load persisted state, starting empty where files are missing or
    /// unreadable.
    pub fn load(state_dir: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&state_dir)?;

        let panes = match read_json::<BTreeMap<String, String>>(&state_dir.join(PANES_FILE)) {
            Ok(panes) => panes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load panes.json, starting empty");
                BTreeMap::new()
            }
        };

        let units = match read_json::<Vec<UnitRecord>>(&state_dir.join(TASKS_FILE)) {
            Ok(list) => list
                .into_iter()
                .map(|unit| (unit.id.clone(), unit))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tasks.json, starting empty");
                BTreeMap::new()
            }
        };

        Ok(Self {
            state_dir,
            panes,
            units,
        })
    }

    /// Bind a unit to a pane and persist.
    pub fn record_pane(
        &mut self,
        unit_id: impl Into<String>,
        pane: impl Into<String>,
    ) -> Result<(), StorageError> {
        self.panes.insert(unit_id.into(), pane.into());
        self.save_panes()
    }

    pub fn pane_of(&self, unit_id: &str) -> Option<&str> {
        self.panes.get(unit_id).map(String::as_str)
    }

    pub fn panes(&self) -> &BTreeMap<String, String> {
        &self.panes
    }

    /// Insert (or replace) a unit record and persist.
    pub fn insert_unit(&mut self, unit: UnitRecord) -> Result<(), StorageError> {
        self.units.insert(unit.id.clone(), unit);
        self.save_units()
    }

    pub fn unit(&self, unit_id: &str) -> Option<&UnitRecord> {
        self.units.get(unit_id)
    }

    pub fn unit_mut(&mut self, unit_id: &str) -> Option<&mut UnitRecord> {
        self.units.get_mut(unit_id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRecord> {
        self.units.values()
    }

    /// Rewrite `panes.json` wholesale.
    pub fn save_panes(&self) -> Result<(), StorageError> {
        write_json(&self.state_dir.join(PANES_FILE), &self.panes)
    }

    /// Rewrite `tasks.json` wholesale (array of records).
    pub fn save_units(&self) -> Result<(), StorageError> {
        let list: Vec<&UnitRecord> = self.units.values().collect();
        write_json(&self.state_dir.join(TASKS_FILE), &list)
    }
}

fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
