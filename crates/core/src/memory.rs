// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-run memory: a metadata graph plus full narrative items, used to
//! bias future playbook selection and prompts toward what has worked
//! before for a given category/service.

use crate::finding::{FindingCategory, Severity};
use crate::run::RunId;
use serde::{Deserialize, Serialize};

/// Which backend produced the session a memory item was extracted from.
/// A narrower set than [`crate::run::DataSource`] — memory is never
/// extracted from a `hybrid` run marker, only from the individual
/// session's own backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryDataSource {
    Live,
    Mock,
}

crate::simple_display! {
    MemoryDataSource {
        Live => "live",
        Mock => "mock",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryOutcome {
    Success,
    Failed,
}

crate::simple_display! {
    MemoryOutcome {
        Success => "success",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

crate::simple_display! {
    Confidence {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Confidence {
    /// Confidence-tier multiplier used by the retrieval scorer.
    pub fn score_multiplier(self) -> f64 {
        match self {
            Confidence::High => 3.0,
            Confidence::Medium => 1.5,
            Confidence::Low => 0.5,
        }
    }
}

/// A relationship between two memory items: same category, same service,
/// or a similar fix approach. Populated by the extractor when it notices
/// an existing item sharing one of those axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRelationship {
    pub target_id: String,
    pub relation_type: String,
}

/// Metadata-only entry in the graph index. No narrative content — that
/// lives in the matching [`MemoryItem`] on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryGraphEntry {
    pub item_id: String,
    pub finding_id: String,
    pub category: FindingCategory,
    pub service_name: String,
    pub severity: Severity,
    pub data_source: MemoryDataSource,
    pub outcome: MemoryOutcome,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub fix_approach_summary: Option<String>,
    pub created_at: String,
    pub run_id: RunId,
    #[serde(default)]
    pub relationships: Vec<MemoryRelationship>,
}

/// The full graph index. Serialized as `graph.json`; loaded whole and
/// scanned linearly by the retriever (memory sets stay small enough that
/// an index structure isn't worth the complexity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryGraph {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<MemoryGraphEntry>,
}

fn default_version() -> u32 {
    1
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self { version: 1, entries: Vec::new() }
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, entry: MemoryGraphEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.item_id == entry.item_id) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }
}

/// Full narrative memory item. Rendered as markdown and stored under
/// `items/{item_id}.md`; [`MemoryGraphEntry`] is the lightweight index
/// pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub item_id: String,
    pub finding_id: String,
    pub category: FindingCategory,
    pub service_name: String,
    pub severity: Severity,
    pub title: String,
    pub data_source: MemoryDataSource,
    pub outcome: MemoryOutcome,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub fix_approach: Option<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub tests_passed: Option<bool>,
    #[serde(default)]
    pub tests_added: u32,
    #[serde(default)]
    pub pr_url: Option<String>,
    pub run_id: RunId,
    pub created_at: String,
}

impl MemoryItem {
    /// Derive this item's graph index entry. Every field except
    /// `relationships` (assigned separately by the extractor once it has
    /// scanned the rest of the graph) is copied straight across.
    pub fn to_graph_entry(&self) -> MemoryGraphEntry {
        MemoryGraphEntry {
            item_id: self.item_id.clone(),
            finding_id: self.finding_id.clone(),
            category: self.category,
            service_name: self.service_name.clone(),
            severity: self.severity,
            data_source: self.data_source,
            outcome: self.outcome,
            confidence: self.confidence,
            fix_approach_summary: self.fix_approach.clone(),
            created_at: self.created_at.clone(),
            run_id: self.run_id,
            relationships: Vec::new(),
        }
    }

    /// Render as the markdown body stored at `items/{item_id}.md`.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- finding_id: {}\n", self.finding_id));
        out.push_str(&format!("- category: {}\n", self.category));
        out.push_str(&format!("- service: {}\n", self.service_name));
        out.push_str(&format!("- severity: {}\n", self.severity));
        out.push_str(&format!("- data_source: {}\n", self.data_source));
        out.push_str(&format!("- outcome: {}\n", self.outcome));
        if let Some(confidence) = self.confidence {
            out.push_str(&format!("- confidence: {}\n", confidence));
        }
        out.push_str(&format!("- run_id: {}\n", self.run_id));
        out.push_str(&format!("- created_at: {}\n", self.created_at));
        if let Some(fix) = &self.fix_approach {
            out.push_str(&format!("\n## Fix approach\n\n{}\n", fix));
        }
        if !self.files_modified.is_empty() {
            out.push_str("\n## Files modified\n\n");
            for f in &self.files_modified {
                out.push_str(&format!("- {}\n", f));
            }
        }
        if let Some(err) = &self.error_message {
            out.push_str(&format!("\n## Error\n\n{}\n", err));
        }
        if let Some(pr) = &self.pr_url {
            out.push_str(&format!("\n## Pull request\n\n{}\n", pr));
        }
        out
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
