// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{ingest, playbooks};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use triage_core::config::OrchestratorConfig;
use triage_core::run::{BatchRun, DataSource};
use triage_engine::{preflight_check, ProgressTracker, WaveManager};

use super::support;

fn playbook_paths_for(findings: &[triage_core::finding::Finding]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for finding in findings {
        let path = PathBuf::from(playbooks::get_playbook_path(finding.category));
        if seen.insert(path.clone()) {
            paths.push(path);
        }
    }
    paths
}

pub async fn handle(findings_path: PathBuf, mock: bool, live: bool, wave_size: Option<u32>) -> anyhow::Result<()> {
    let mut config = OrchestratorConfig::from_env();
    if mock {
        config.mock_mode = true;
    }
    if live {
        config.mock_mode = false;
    }
    if let Some(ws) = wave_size {
        config.wave_size = ws;
    }

    let raw = ingest::parse_findings_csv(&findings_path)?;
    let findings = ingest::prioritize_findings(ingest::normalize_findings(raw));

    let playbook_paths = playbook_paths_for(&findings);
    let playbook_path_refs: Vec<&Path> = playbook_paths.iter().map(PathBuf::as_path).collect();
    preflight_check(&config, findings.len(), &playbook_path_refs)?;

    let clients = support::build_clients(&config);

    if !config.mock_mode {
        if let Some(live_client) = clients.live.as_deref() {
            triage_engine::check_api_reachable(live_client, &config.devin_api_base_url).await?;
        }
    }

    let playbook_client = match (clients.live.as_deref(), clients.mock.as_deref()) {
        (Some(c), _) => c,
        (None, Some(c)) => c,
        (None, None) => anyhow::bail!("no remote client configured"),
    };
    let playbook_ids = playbooks::ensure_playbooks_uploaded(playbook_client, &support::playbooks_dir()).await?;

    let mut waves = playbooks::create_waves(findings.clone(), config.wave_size);
    playbooks::assign_playbooks(&mut waves, &playbook_ids);

    let data_source = if config.hybrid_mode {
        DataSource::Hybrid
    } else if config.mock_mode {
        DataSource::Mock
    } else {
        DataSource::Live
    };

    let mut run = BatchRun::new(findings.len() as u32, data_source);
    run.waves = waves;

    tracing::info!(run_id = %run.run_id, findings = findings.len(), waves = run.waves.len(), "starting run");

    let state_store = support::open_state_store(&config);
    let memory_store = support::open_memory_store(&config);
    let mut ledger = support::open_ledger(&config);
    let memory_graph = memory_store.load_graph();

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
