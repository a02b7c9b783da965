// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session creation (C6): ledger-check, prompt build, remote create,
//! outcome recording. Guarantees at-most-one remote session per
//! `(run_id, finding_id, attempt)` across process restarts.

use chrono::Utc;
use triage_client::{CreateSessionRequest, RemoteClient};
use triage_core::config::OrchestratorConfig;
use triage_core::run::RunId;
use triage_core::session::{RemediationSession, SessionId, SessionStatus};
use triage_storage::ledger::make_key;
use triage_storage::IdempotencyLedger;

/// In hybrid mode, route to `live` iff the finding's service substring-
/// matches a connected repo (either direction); otherwise `mock`.
/// Non-hybrid: config decides directly.
pub fn determine_data_source(service_name: &str, config: &OrchestratorConfig) -> &'static str {
    if !config.hybrid_mode {
        return if config.mock_mode { "mock" } else { "live" };
    }
    let matched = config
        .connected_repos
        .iter()
        .any(|repo| repo.contains(service_name) || service_name.contains(repo.as_str()));
    if matched {
        "live"
    } else {
        "mock"
    }
}

/// Build the prompt sent to the remote agent. `memory_context` is whatever
/// the Retriever assembled for this finding (kept as plain text here — the
/// exact prompt template is external to this engine, per the client's own
/// §7 scope boundary).
pub fn build_prompt(session: &RemediationSession, run_id: &RunId, memory_context: Option<&str>) -> String {
    let finding = &session.finding;
    let mut prompt = format!(
        "Remediate {} in {} ({}). File: {}. Severity: {}. Run: {run_id}.",
        finding.category, finding.service_name, finding.finding_id, finding.file_path, finding.severity,
    );
    if let Some(context) = memory_context {
        prompt.push_str("\n\nRelevant past fixes:\n");
        prompt.push_str(context);
    }
    prompt
}

fn tags_for(session: &RemediationSession) -> Vec<String> {
    vec![
        format!("wave-{}", session.wave_number),
        session.finding.category.to_string(),
        session.finding.service_name.clone(),
    ]
}

/// Create (or resume, via the ledger) the remote session backing
/// `session`. Mutates `session` in place per §4.6's five/six-step flow.
pub async fn create_remediation_session(
    client: &dyn RemoteClient,
    session: &mut RemediationSession,
    data_source: &str,
    ledger: Option<&mut IdempotencyLedger>,
    run_id: &RunId,
    memory_context: Option<&str>,
) {
    session.data_source = data_source.to_string();

    let ledger_key = ledger.as_ref().map(|_| make_key(run_id.as_str(), &session.finding.finding_id, session.attempt));

    if let (Some(ledger), Some(key)) = (ledger.as_ref(), ledger_key.as_ref()) {
        if let Some(entry) = ledger.lookup(key) {
            session.session_id = Some(SessionId::new(entry.session_id.clone()));
            session.status = SessionStatus::Dispatched;
            session.version += 1;
            return;
        }
    }

    let prompt = build_prompt(session, run_id, memory_context);
    let request = CreateSessionRequest {
        prompt,
        playbook_id: Some(session.playbook_id.clone()),
        tags: tags_for(session),
        structured_output_schema: None,
        max_acu_limit: None,
        idempotent: true,
    };

    match client.create_session(request).await {
        Ok(response) => {
            session.session_id = Some(SessionId::new(response.session_id.clone()));
            session.devin_url = Some(response.url);
            session.created_at = Some(Utc::now());
            session.status = SessionStatus::Dispatched;
            session.version += 1;

            if let (Some(ledger), Some(key)) = (ledger, ledger_key) {
                let _ = ledger.record(key, response.session_id, Utc::now());
            }
        }
        Err(e) => {
            session.status = SessionStatus::Failed;
            session.error_message = Some(e.to_string());
            session.version += 1;
        }
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
