// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable `(run, finding, attempt) → session_id` map (C2). Guarantees
//! at-most-one remote session creation per attempt across process
//! restarts.

use crate::lock::{atomic_write_json, load_json_or_default, FileLock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use triage_core::error::LockTimeout;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

/// Build the ledger key for one dispatch attempt.
pub fn make_key(run_id: &str, finding_id: &str, attempt: u32) -> String {
    format!("{run_id}-{finding_id}-attempt-{attempt}")
}

/// In-memory ledger, loaded at construction and persisted on every
/// mutation via atomic write under file lock. The on-disk file holds just
/// the `entries` map (`ledger.json`), not this wrapper.
#[derive(Debug, Clone)]
pub struct IdempotencyLedger {
    entries: HashMap<String, LedgerEntry>,
    path: PathBuf,
}

impl IdempotencyLedger {
    /// Load from `path`, or start empty if missing/corrupt.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_json_or_default(&path, HashMap::new);
        Self { entries, path }
    }

    pub fn lookup(&self, key: &str) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    /// Record `session_id` for `key` and persist. Parent directories are
    /// created on first save.
    pub fn record(&mut self, key: String, session_id: String, created_at: DateTime<Utc>) -> Result<(), LockTimeout> {
        self.entries.insert(key, LedgerEntry { session_id, created_at });
        self.save()
    }

    fn save(&self) -> Result<(), LockTimeout> {
        let _lock = FileLock::acquire(&self.path, Duration::from_secs(10), Duration::from_millis(50))?;
        let _ = atomic_write_json(&self.path, &self.entries);
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
