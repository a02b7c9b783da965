// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{ingest, playbooks};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use triage_core::config::OrchestratorConfig;
use triage_core::run::RunId;
use triage_engine::{preflight_check, ProgressTracker, WaveManager};

use super::support;

pub async fn handle(run_id: String, findings_path: PathBuf) -> anyhow::Result<()> {
    let config = OrchestratorConfig::from_env();
    let state_store = support::open_state_store(&config);

    let parsed_run_id = RunId::from_string(&run_id);
    let mut run = state_store
        .load_run_state(&parsed_run_id)
        .ok_or_else(|| anyhow::anyhow!("no saved state found for run {run_id}"))?;

    if run.is_done() {
        println!("run {} is already {} -- nothing to resume", run.run_id, run.status);
        return Ok(());
    }

    let raw = ingest::parse_findings_csv(&findings_path)?;
    let findings = ingest::normalize_findings(raw);

    let mut seen = HashSet::new();
    let mut playbook_paths = Vec::new();
    for finding in &findings {
        let path = PathBuf::from(playbooks::get_playbook_path(finding.category));
        if seen.insert(path.clone()) {
            playbook_paths.push(path);
        }
    }
    let playbook_path_refs: Vec<&Path> = playbook_paths.iter().map(PathBuf::as_path).collect();
    preflight_check(&config, run.total_findings as usize, &playbook_path_refs)?;

    let clients = support::build_clients(&config);
    if !config.mock_mode {
        if let Some(live_client) = clients.live.as_deref() {
            triage_engine::check_api_reachable(live_client, &config.devin_api_base_url).await?;
        }
    }

    let memory_store = support::open_memory_store(&config);
    let mut ledger = support::open_ledger(&config);
    let memory_graph = memory_store.load_graph();

    tracing::info!(run_id = %run.run_id, status = %run.status, "resuming run");

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_watcher = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, will stop at the next wave boundary");
            interrupted_watcher.store(true, Ordering::SeqCst);
        }
    });

    let manager = WaveManager::new(clients.as_client_set(), &config);
    manager
        .execute_run(&mut run, Some(&mut ledger), Some(&memory_graph), Some(&memory_store), Some(&state_store), &interrupted)
        .await;

    let tracker = ProgressTracker::new(&mut run);
    let extracted = tracker.extract_and_save_memories(&memory_store);
    tracker.save_state(&state_store)?;
    let summary = tracker.get_summary();

    println!(
        "run {} finished as {} ({}/{} succeeded, {} PRs created, {extracted} memories extracted)",
        summary.run_id, summary.status, summary.successful_count, summary.total_findings, summary.prs_created,
    );

    Ok(())
}
