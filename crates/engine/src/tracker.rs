// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ProgressTracker (C8): aggregate bookkeeping over a [`BatchRun`], the
//! dashboard summary view, and persistence of state plus extracted
//! memories.

use crate::extractor::extract_memories;
use serde::Serialize;
use triage_core::classify;
use triage_core::error::LockTimeout;
use triage_core::run::{BatchRun, RunId, RunStatus};
use triage_storage::{MemoryStore, StateStore};

/// Dashboard-facing view of a run's progress, derived fresh on every call
/// rather than cached.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub status: RunStatus,
    pub total_findings: u32,
    pub completed_count: u32,
    pub successful_count: u32,
    pub failed_count: u32,
    pub prs_created: u32,
    pub active_sessions: u32,
    pub pending_reviews: u32,
    pub current_wave: u32,
    pub success_rate: f64,
}

/// Holds the [`BatchRun`] for the duration of one run and mediates every
/// mutation to its aggregates so callers never hand-recompute counters.
pub struct ProgressTracker<'a> {
    run: &'a mut BatchRun,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(run: &'a mut BatchRun) -> Self {
        Self { run }
    }

    pub fn run(&self) -> &BatchRun {
        self.run
    }

    pub fn run_mut(&mut self) -> &mut BatchRun {
        self.run
    }

    /// Recount every session in every wave and assign run- and wave-level
    /// aggregates. Deliberately O(N) per call — idempotence matters more
    /// than the cost at this scale.
    pub fn update_session(&mut self) {
        self.run.recount();
    }

    pub fn add_event(&mut self, event_type: impl Into<String>, message: impl Into<String>) {
        self.run.record_event(event_type, message);
    }

    pub fn add_event_with_details(&mut self, event_type: impl Into<String>, message: impl Into<String>, details: serde_json::Value) {
        let event = triage_core::run::Event::new(event_type, message).with_details(details);
        self.run.events.push(event);
    }

    pub fn get_summary(&self) -> RunSummary {
        let run = &self.run;
        let active_sessions =
            run.waves.iter().flat_map(|w| &w.sessions).filter(|s| classify::is_summary_active(s.status)).count() as u32;
        let pending_reviews = run.waves.iter().flat_map(|w| &w.sessions).filter(|s| s.pr_url.is_some()).count() as u32;
        let current_wave = run
            .waves
            .iter()
            .filter(|w| w.sessions.iter().any(|s| s.status != triage_core::session::SessionStatus::Pending))
            .map(|w| w.wave_number)
            .max()
            .unwrap_or(0);
        let success_rate =
            if run.completed_count == 0 { 0.0 } else { f64::from(run.successful_count) / f64::from(run.completed_count) };

        RunSummary {
            run_id: run.run_id,
            status: run.status,
            total_findings: run.total_findings,
            completed_count: run.completed_count,
            successful_count: run.successful_count,
            failed_count: run.failed_count,
            prs_created: run.prs_created,
            active_sessions,
            pending_reviews,
            current_wave,
            success_rate,
        }
    }

    /// Persist the run snapshot, the shared index, and the legacy mirror
    /// under the index's file lock (§4.8).
    pub fn save_state(&self, store: &StateStore) -> Result<(), LockTimeout> {
        store.save_state(self.run)
    }

    /// Extract a MemoryItem for every terminal session not yet covered
    /// and upsert each into the store's graph. Returns the count upserted.
    pub fn extract_and_save_memories(&self, store: &MemoryStore) -> usize {
        let items = extract_memories(self.run);
        let mut graph = store.load_graph();
        let mut count = 0;
        for item in &items {
            if store.upsert(item, &mut graph).is_ok() {
                count += 1;
            } else {
                tracing::warn!(item_id = %item.item_id, "failed to upsert memory item");
            }
        }
        count
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
