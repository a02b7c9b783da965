// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll one session or a batch (C7): timeout enforcement ahead of the
//! remote call, progress/completion events, status folding via C5.
//!
//! Operates on a plain session slice and an events sink rather than a
//! [`crate::tracker::ProgressTracker`] directly — the wave manager may
//! call this once per client against disjoint subsets of one wave, which
//! a single mutable tracker borrow over the whole run can't express.
//! Aggregate recount is the caller's job once all polling for the
//! iteration has settled.

use chrono::Utc;
use triage_client::{interpret_session_status, RemoteClient};
use triage_core::classify;
use triage_core::config::OrchestratorConfig;
use triage_core::run::Event;
use triage_core::session::{RemediationSession, SessionStatus};

/// Poll one session's remote status and fold the response through C5.
/// On API error the session is left unchanged — the next poll tries
/// again rather than treating a transient failure as a status change.
pub async fn poll_session(client: &dyn RemoteClient, session: &mut RemediationSession) {
    let Some(session_id) = session.session_id.as_ref().map(|id| id.as_str().to_string()) else {
        return;
    };

    match client.get_session(&session_id).await {
        Ok(response) => {
            let interpreted = interpret_session_status(&response);
            session.status = interpreted.status;
            if interpreted.pr_url.is_some() {
                session.pr_url = interpreted.pr_url;
            }
            if interpreted.error_message.is_some() {
                session.error_message = interpreted.error_message;
            }
            session.structured_output = response.structured_output;
        }
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "poll failed, session left unchanged");
        }
    }
}

fn stage_of(session: &RemediationSession) -> Option<String> {
    session.structured_output.as_ref().and_then(|so| so.get("status")).and_then(|v| v.as_str()).map(String::from)
}

/// Poll every active session in `sessions`, enforcing per-session timeout
/// ahead of the remote call and appending progress/completion events to
/// `events`. Returns the indices of sessions still active after this
/// pass. `data_source_filter`, when set, restricts polling to sessions
/// routed to that backend — used by the hybrid wave manager to poll each
/// client only against the sessions it owns.
pub async fn poll_active_sessions(
    client: &dyn RemoteClient,
    sessions: &mut [RemediationSession],
    events: &mut Vec<Event>,
    config: &OrchestratorConfig,
    data_source_filter: Option<&str>,
) -> Vec<usize> {
    let timeout = chrono::Duration::seconds((config.session_timeout_minutes * 60) as i64);

    for session in sessions.iter_mut() {
        if !classify::is_poll_active(session.status) {
            continue;
        }
        if let Some(ds) = data_source_filter {
            if session.data_source != ds {
                continue;
            }
        }

        let old_status = session.status;
        let old_stage = stage_of(session);

        if let Some(created_at) = session.created_at {
            if Utc::now() - created_at > timeout {
                session.status = SessionStatus::Timeout;
                session.error_message = Some("Session timed out".to_string());
                session.completed_at = Some(Utc::now());
                events.push(Event::new("session_failed", format!("{} timed out", session.finding.finding_id)));
                continue;
            }
        }

        poll_session(client, session).await;

        let new_stage = stage_of(session);
        if new_stage != old_stage {
            if let Some(so) = &session.structured_output {
                let stage = so.get("status").and_then(|v| v.as_str()).unwrap_or("unknown");
                let progress_pct = so.get("progress_pct").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let current_step = so.get("current_step").and_then(|v| v.as_str()).unwrap_or("");
                events.push(
                    Event::new("session_progress", format!("{} -> {stage}", session.finding.finding_id)).with_details(
                        serde_json::json!({
                            "stage": stage,
                            "progress_pct": progress_pct,
                            "current_step": current_step,
                        }),
                    ),
                );
            }
        }

        if session.status != old_status {
            if classify::is_success(session.status) {
                events.push(
                    Event::new("session_completed", format!("{} succeeded", session.finding.finding_id))
                        .with_details(serde_json::json!({ "pr_url": session.pr_url })),
                );
            } else if classify::is_poll_terminal(session.status) {
                events.push(Event::new(
                    "session_failed",
                    format!("{} ended as {}", session.finding.finding_id, session.status),
                ));
            }
        }
    }

    sessions
        .iter()
        .enumerate()
        .filter(|(_, s)| classify::is_poll_active(s.status) && data_source_filter.map_or(true, |ds| s.data_source == ds))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
