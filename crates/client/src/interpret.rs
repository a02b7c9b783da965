// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure mapping from a remote session response to internal status (C5).
//! No I/O, no mutation — the poller folds this through a session.

use serde::{Deserialize, Serialize};
use triage_core::session::SessionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub url: String,
}

/// Raw shape of `GET /sessions/{id}`. Unknown `status_enum` values
/// deserialize into `Unknown`'s captured string rather than failing, per
/// §4.5's "remote adds status values over time" rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Present on list-endpoint entries; absent (and irrelevant) on a
    /// `GET /sessions/{id}` response, since the caller already knows it.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status_enum: String,
    #[serde(default)]
    pub structured_output: Option<serde_json::Value>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
}

/// Outcome of interpreting one [`SessionResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct Interpreted {
    pub status: SessionStatus,
    pub pr_url: Option<String>,
    pub error_message: Option<String>,
}

/// Map `(status_enum, has_pr)` to internal status per the table in §4.5.
/// `blocked` with a PR is promoted to `success` — the remote blocks
/// post-PR pending human approval, which this orchestrator treats as
/// already successful.
pub fn interpret_session_status(response: &SessionResponse) -> Interpreted {
    let pr_url = response.pull_request.as_ref().map(|pr| pr.url.clone());
    let error_message = response
        .structured_output
        .as_ref()
        .and_then(|so| so.get("error_message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let status = match response.status_enum.as_str() {
        "working" | "suspend_requested" | "resume_requested" | "resumed" => SessionStatus::Working,
        "finished" => SessionStatus::Success,
        "blocked" => {
            if pr_url.is_some() {
                SessionStatus::Success
            } else {
                SessionStatus::Blocked
            }
        }
        "expired" => SessionStatus::Timeout,
        other => {
            tracing::warn!(status_enum = %other, "unknown remote status_enum, treating as working");
            SessionStatus::Working
        }
    };

    Interpreted { status, pr_url, error_message }
}

#[cfg(test)]
#[path = "interpret_tests.rs"]
mod tests;
