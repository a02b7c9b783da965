// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk memory store (C10 store half): `graph.json` metadata index plus
//! `items/<item_id>.md` narrative bodies.

use crate::lock::{atomic_write_json, load_json_or_default, FileLock};
use std::path::{Path, PathBuf};
use std::time::Duration;
use triage_core::error::LockTimeout;
use triage_core::memory::{MemoryGraph, MemoryGraphEntry, MemoryItem, MemoryRelationship};

pub struct MemoryStore {
    dir: PathBuf,
}

impl MemoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn graph_path(&self) -> PathBuf {
        self.dir.join("graph.json")
    }

    fn item_path(&self, item_id: &str) -> PathBuf {
        self.dir.join("items").join(format!("{item_id}.md"))
    }

    pub fn load_graph(&self) -> MemoryGraph {
        load_json_or_default(&self.graph_path(), MemoryGraph::new)
    }

    pub fn save_graph(&self, graph: &MemoryGraph) -> Result<(), LockTimeout> {
        let path = self.graph_path();
        let _lock = FileLock::acquire(&path, Duration::from_secs(10), Duration::from_millis(50))?;
        let _ = atomic_write_json(&path, graph);
        Ok(())
    }

    pub fn save_item(&self, item: &MemoryItem) -> std::io::Result<()> {
        let path = self.item_path(&item.item_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, item.to_markdown())
    }

    pub fn load_item_markdown(&self, item_id: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.item_path(item_id))
    }

    /// Save `item`'s body, fold it into `graph`'s index with freshly
    /// computed relationships to existing entries, and persist the graph.
    /// Mirrors the extractor's four-step upsert from the design: save
    /// markdown, build metadata entry, compute relationships, replace or
    /// append.
    pub fn upsert(&self, item: &MemoryItem, graph: &mut MemoryGraph) -> Result<(), LockTimeout> {
        if self.save_item(item).is_err() {
            tracing::warn!(item_id = %item.item_id, "failed to write memory item body");
        }

        let mut entry = item.to_graph_entry();
        entry.fix_approach_summary = item.fix_approach.as_ref().map(|s| truncate_chars(s, 100));
        entry.relationships = relationships_for(&entry, &graph.entries);

        graph.upsert(entry);
        self.save_graph(graph)
    }
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn relationships_for(entry: &MemoryGraphEntry, existing: &[MemoryGraphEntry]) -> Vec<MemoryRelationship> {
    let mut out = Vec::new();
    for other in existing {
        if other.item_id == entry.item_id {
            continue;
        }
        if other.category == entry.category {
            out.push(MemoryRelationship { target_id: other.item_id.clone(), relation_type: "same_category".to_string() });
        }
        if other.service_name == entry.service_name {
            out.push(MemoryRelationship { target_id: other.item_id.clone(), relation_type: "same_service".to_string() });
        }
    }
    out
}

/// Used by tests and `triage-engine` to locate the store's items
/// directory directly (e.g. for the retriever to cite a path).
pub fn items_dir(dir: &Path) -> PathBuf {
    dir.join("items")
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
