// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence half of the ProgressTracker (C8's `save_state`): writes the
//! per-run snapshot, upserts the shared run index, and mirrors the legacy
//! top-level `state.json`.

use crate::lock::{atomic_write_json, load_json_or_default, FileLock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use triage_core::error::LockTimeout;
use triage_core::run::{BatchRun, DataSource, RunId, RunStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunIndexEntry {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub total_findings: u32,
    pub data_source: DataSource,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunIndex {
    pub runs: Vec<RunIndexEntry>,
}

impl RunIndex {
    pub fn upsert(&mut self, entry: RunIndexEntry) {
        if let Some(existing) = self.runs.iter_mut().find(|e| e.run_id == entry.run_id) {
            *existing = entry;
        } else {
            self.runs.push(entry);
        }
    }
}

/// Root layout: `{root}/runs/index.json`, `{root}/runs/{run_id}/state.json`,
/// `{root}/state.json` (legacy mirror), matching §6's persisted state
/// layout.
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("runs").join("index.json")
    }

    fn run_state_path(&self, run_id: &RunId) -> PathBuf {
        self.root.join("runs").join(run_id.as_str()).join("state.json")
    }

    fn legacy_state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    /// Persist one run: state snapshot, index upsert, legacy mirror — all
    /// under the index's file lock so the three writes don't interleave
    /// with a concurrent save from a different run.
    pub fn save_state(&self, run: &BatchRun) -> Result<(), LockTimeout> {
        let index_path = self.index_path();
        let _lock = FileLock::acquire(&index_path, Duration::from_secs(10), Duration::from_millis(50))?;

        let _ = atomic_write_json(&self.run_state_path(&run.run_id), run);

        let mut index: RunIndex = load_json_or_default(&index_path, RunIndex::default);
        index.upsert(RunIndexEntry {
            run_id: run.run_id,
            started_at: run.started_at,
            status: run.status,
            total_findings: run.total_findings,
            data_source: run.data_source,
        });
        let _ = atomic_write_json(&index_path, &index);

        let _ = atomic_write_json(&self.legacy_state_path(), run);
        Ok(())
    }

    pub fn load_run_state(&self, run_id: &RunId) -> Option<BatchRun> {
        std::fs::read_to_string(self.run_state_path(run_id)).ok().and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn load_index(&self) -> RunIndex {
        load_json_or_default(&self.index_path(), RunIndex::default)
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
