// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory retrieval (C10, retriever half): score the graph against a new
//! finding, load the top bodies, and attach a source citation.

use chrono::{DateTime, Utc};
use triage_core::finding::Finding;
use triage_core::memory::{MemoryDataSource, MemoryGraph, MemoryGraphEntry, MemoryOutcome};
use triage_storage::MemoryStore;

/// One retrieved memory item: its narrative body plus a citation noting
/// where it came from.
#[derive(Debug, Clone)]
pub struct RetrievedMemory {
    pub item_id: String,
    pub body: String,
    pub source_note: String,
    pub score: f64,
}

fn freshness_multiplier(created_at: &str, now: DateTime<Utc>) -> f64 {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => {
            let age_days = (now - created.with_timezone(&Utc)).num_seconds() as f64 / 86_400.0;
            let age_days = age_days.max(0.0);
            let decay = 1.0 - (age_days / 30.0).min(1.0);
            0.5 + 0.5 * decay
        }
        Err(_) => 1.0,
    }
}

fn score(entry: &MemoryGraphEntry, finding: &Finding, prefer_live: bool) -> Option<f64> {
    let mut s = 0.0;
    if entry.category == finding.category {
        s += 10.0;
    }
    if entry.service_name == finding.service_name {
        s += 5.0;
    }
    if s == 0.0 {
        return None;
    }

    if entry.severity == finding.severity {
        s += 2.0;
    }
    if let Some(confidence) = entry.confidence {
        s += confidence.score_multiplier();
    }
    if prefer_live && entry.data_source == MemoryDataSource::Live {
        s += 2.0;
    }
    if entry.outcome == MemoryOutcome::Success {
        s += 3.0;
    }

    Some(s * freshness_multiplier(&entry.created_at, Utc::now()))
}

fn source_note(entry: &MemoryGraphEntry, prefer_live: bool) -> String {
    let mut note = format!("from run {} ({} data)", entry.run_id, entry.data_source);
    if prefer_live && entry.data_source == MemoryDataSource::Mock {
        note.push_str(" -- mock-sourced, no live outcome confirmed yet");
    }
    note
}

/// Score every entry in `graph` against `finding`, keep the top
/// `max_results`, and load each body from `store`. Entries scoring zero
/// (neither same category nor same service) are excluded outright.
pub fn retrieve_memories(
    finding: &Finding,
    graph: &MemoryGraph,
    store: &MemoryStore,
    max_results: usize,
    prefer_live: bool,
) -> Vec<RetrievedMemory> {
    let mut scored: Vec<(f64, &MemoryGraphEntry)> =
        graph.entries.iter().filter_map(|entry| score(entry, finding, prefer_live).map(|s| (s, entry))).collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(max_results)
        .filter_map(|(s, entry)| {
            let body = store.load_item_markdown(&entry.item_id).ok()?;
            Some(RetrievedMemory { item_id: entry.item_id.clone(), body, source_note: source_note(entry, prefer_live), score: s })
        })
        .collect()
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
