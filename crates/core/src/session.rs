// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remediation sessions: one remote agent task aimed at one finding.

use crate::finding::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// A remote session identifier. Assigned by the remote agent service on
/// creation, so (unlike [`crate::RunId`]) this is not locally generated —
/// it is an opaque string wrapper, not an [`crate::id::IdBuf`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a [`RemediationSession`].
///
/// Three overlapping classification sets are used by different components
/// (see [`crate::classify`]); this enum intentionally stays a flat
/// discriminated union rather than encoding "active"/"terminal" in the
/// type itself, since membership depends on context (polling vs.
/// aggregation vs. retry eligibility).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Dispatched,
    Working,
    Blocked,
    Success,
    Failed,
    Timeout,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Dispatched => "dispatched",
            SessionStatus::Working => "working",
            SessionStatus::Blocked => "blocked",
            SessionStatus::Success => "success",
            SessionStatus::Failed => "failed",
            SessionStatus::Timeout => "timeout",
        }
    }
}

crate::simple_display! {
    SessionStatus {
        Pending => "pending",
        Dispatched => "dispatched",
        Working => "working",
        Blocked => "blocked",
        Success => "success",
        Failed => "failed",
        Timeout => "timeout",
    }
}

/// HITL (human-in-the-loop) review outcome recorded by an external reviewer.
/// The orchestrator never sets these fields itself; it only preserves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// One remote agent task aimed at remediating one [`Finding`].
///
/// Invariants (enforced by callers, not by this type — see
/// `crate::session::RemediationSession::reset_for_retry`):
/// - non-`pending` implies `session_id` is set
/// - status in {success, failed, timeout} implies `completed_at` is set
/// - `pr_url`, once set, is never cleared except by a retry reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationSession {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub finding: Finding,
    pub playbook_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub devin_url: Option<String>,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub structured_output: Option<serde_json::Value>,
    #[serde(default)]
    pub wave_number: u32,
    #[serde(default = "default_attempt")]
    pub attempt: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default = "default_data_source")]
    pub data_source: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub review_status: Option<ReviewStatus>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_reason: Option<String>,
}

fn default_attempt() -> u32 {
    1
}

fn default_data_source() -> String {
    "mock".to_string()
}

impl RemediationSession {
    pub fn new(finding: Finding, playbook_id: impl Into<String>, wave_number: u32) -> Self {
        Self {
            session_id: None,
            finding,
            playbook_id: playbook_id.into(),
            status: SessionStatus::Pending,
            devin_url: None,
            pr_url: None,
            structured_output: None,
            wave_number,
            attempt: 1,
            created_at: None,
            completed_at: None,
            error_message: None,
            data_source: "mock".to_string(),
            version: 0,
            review_status: None,
            reviewed_by: None,
            reviewed_at: None,
            review_reason: None,
        }
    }

    /// Reset for a retry attempt. Clears everything a fresh dispatch would
    /// overwrite; leaves `attempt` for the caller to increment.
    pub fn reset_for_retry(&mut self) {
        self.status = SessionStatus::Pending;
        self.session_id = None;
        self.error_message = None;
        self.completed_at = None;
        self.pr_url = None;
        self.structured_output = None;
        self.version += 1;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RemediationSession {
    /// Test builder with sane defaults.
    pub fn builder_for(finding: Finding) -> RemediationSession {
        RemediationSession::new(finding, "pb-default", 1)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
