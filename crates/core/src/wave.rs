// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A wave: a bounded-size ordered group of sessions dispatched and gated
//! together.

use crate::classify;
use crate::session::RemediationSession;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveStatus {
    Pending,
    Running,
    Completed,
}

crate::simple_display! {
    WaveStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    pub wave_number: u32,
    pub sessions: Vec<RemediationSession>,
    #[serde(default = "default_wave_status")]
    pub status: WaveStatus,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub failure_count: u32,
}

fn default_wave_status() -> WaveStatus {
    WaveStatus::Pending
}

impl Wave {
    pub fn new(wave_number: u32, sessions: Vec<RemediationSession>) -> Self {
        Self { wave_number, sessions, status: WaveStatus::Pending, success_count: 0, failure_count: 0 }
    }

    pub fn total_count(&self) -> u32 {
        self.sessions.len() as u32
    }

    /// Recompute `success_count`/`failure_count` from current session
    /// statuses. Called by `ProgressTracker::update_session` — never
    /// incremented in place.
    pub fn recount(&mut self) {
        let mut success = 0;
        let mut failure = 0;
        for session in &self.sessions {
            if classify::is_success(session.status) {
                success += 1;
            }
            if classify::is_failure(session.status) {
                failure += 1;
            }
        }
        self.success_count = success;
        self.failure_count = failure;
    }
}

#[cfg(test)]
#[path = "wave_tests.rs"]
mod tests;
