// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory extraction (C10, extractor half): one [`MemoryItem`] per
//! terminal session, pulling fix details from its last structured output.

use triage_core::classify;
use triage_core::memory::{Confidence, MemoryDataSource, MemoryItem, MemoryOutcome};
use triage_core::run::BatchRun;
use triage_core::session::{RemediationSession, SessionStatus};

fn confidence_of(so: &serde_json::Value) -> Option<Confidence> {
    match so.get("confidence").and_then(|v| v.as_str()) {
        Some("high") => Some(Confidence::High),
        Some("medium") => Some(Confidence::Medium),
        Some("low") => Some(Confidence::Low),
        _ => None,
    }
}

fn data_source_of(session: &RemediationSession) -> MemoryDataSource {
    if session.data_source == "live" {
        MemoryDataSource::Live
    } else {
        MemoryDataSource::Mock
    }
}

fn item_for(run: &BatchRun, session: &RemediationSession) -> MemoryItem {
    let outcome = if session.status == SessionStatus::Success { MemoryOutcome::Success } else { MemoryOutcome::Failed };

    let so = session.structured_output.as_ref();
    let fix_approach = so.and_then(|v| v.get("fix_approach")).and_then(|v| v.as_str()).map(String::from);
    let files_modified: Vec<String> = so
        .and_then(|v| v.get("files_modified"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|f| f.as_str().map(String::from)).collect())
        .unwrap_or_default();
    let tests_passed = so.and_then(|v| v.get("tests_passed")).and_then(|v| v.as_bool());
    let tests_added = so.and_then(|v| v.get("tests_added")).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let confidence = so.and_then(confidence_of);

    MemoryItem {
        item_id: format!("{}-{}", run.run_id, session.finding.finding_id),
        finding_id: session.finding.finding_id.clone(),
        category: session.finding.category,
        service_name: session.finding.service_name.clone(),
        severity: session.finding.severity,
        title: format!("{} fix for {}", session.finding.category, session.finding.service_name),
        data_source: data_source_of(session),
        outcome,
        confidence,
        fix_approach,
        files_modified,
        error_message: session.error_message.clone(),
        tests_passed,
        tests_added,
        pr_url: session.pr_url.clone(),
        run_id: run.run_id,
        created_at: session.completed_at.unwrap_or(run.started_at).to_rfc3339(),
    }
}

/// Extract a MemoryItem for every session across the run whose status is
/// terminal for memory purposes (success, failed, timeout, or blocked).
pub fn extract_memories(run: &BatchRun) -> Vec<MemoryItem> {
    run.waves
        .iter()
        .flat_map(|wave| &wave.sessions)
        .filter(|s| classify::is_memory_eligible(s.status))
        .map(|s| item_for(run, s))
        .collect()
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
