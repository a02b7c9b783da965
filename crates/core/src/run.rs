// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A batch run: the top-level unit of orchestration spanning all waves.

use crate::wave::Wave;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies one batch run. Locally generated, unlike [`crate::SessionId`].
    pub struct RunId("run-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Paused,
    Interrupted,
    Completed,
}

crate::simple_display! {
    RunStatus {
        Pending => "pending",
        Running => "running",
        Paused => "paused",
        Interrupted => "interrupted",
        Completed => "completed",
    }
}

/// Which backend produced the sessions in this run: the live remote API,
/// the local mock, or a mix when `hybrid_mode` is enabled mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Mock,
    Hybrid,
}

crate::simple_display! {
    DataSource {
        Live => "live",
        Mock => "mock",
        Hybrid => "hybrid",
    }
}

/// One entry in a run's timeline. Append-only; never mutated after
/// insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            message: message.into(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// The top-level orchestration unit: a set of findings run through waves
/// of remediation sessions from ingest to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub waves: Vec<Wave>,
    #[serde(default)]
    pub total_findings: u32,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub successful_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub prs_created: u32,
    #[serde(default = "default_run_status")]
    pub status: RunStatus,
    #[serde(default = "default_data_source")]
    pub data_source: DataSource,
    #[serde(default)]
    pub events: Vec<Event>,
}

fn default_run_status() -> RunStatus {
    RunStatus::Pending
}

fn default_data_source() -> DataSource {
    DataSource::Mock
}

impl BatchRun {
    pub fn new(total_findings: u32, data_source: DataSource) -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            completed_at: None,
            waves: Vec::new(),
            total_findings,
            completed_count: 0,
            successful_count: 0,
            failed_count: 0,
            prs_created: 0,
            status: RunStatus::Pending,
            data_source,
            events: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event_type: impl Into<String>, message: impl Into<String>) {
        self.events.push(Event::new(event_type, message));
    }

    /// Recompute run-level counters from all waves' sessions. Mirrors
    /// [`crate::wave::Wave::recount`] but folded across the whole run;
    /// called after each wave completes.
    pub fn recount(&mut self) {
        let mut completed = 0;
        let mut successful = 0;
        let mut failed = 0;
        let mut prs = 0;
        for wave in &mut self.waves {
            wave.recount();
            completed += wave.success_count + wave.failure_count;
            successful += wave.success_count;
            failed += wave.failure_count;
            prs += wave.sessions.iter().filter(|s| s.pr_url.is_some()).count() as u32;
        }
        self.completed_count = completed;
        self.successful_count = successful;
        self.failed_count = failed;
        self.prs_created = prs;
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Interrupted)
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
