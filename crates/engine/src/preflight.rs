// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal-before-dispatch checks (§7). None of these ever abort mid-run —
//! they're only consulted once, before the first wave is dispatched.

use triage_client::RemoteClient;
use triage_core::config::OrchestratorConfig;
use triage_core::error::PreflightError;

/// Run every preflight check against `config` and the ingested
/// `finding_count`. `playbook_paths` are file paths the caller has already
/// resolved for the findings' categories; a missing one fails fast rather
/// than surfacing as a remote 404 mid-wave.
pub fn preflight_check(
    config: &OrchestratorConfig,
    finding_count: usize,
    playbook_paths: &[&std::path::Path],
) -> Result<(), PreflightError> {
    if finding_count == 0 {
        return Err(PreflightError::EmptyFindings);
    }

    if !config.mock_mode && config.devin_api_key.trim().is_empty() {
        return Err(PreflightError::MissingApiKey);
    }

    if config.hybrid_requires_repos() {
        return Err(PreflightError::HybridWithoutRepos);
    }

    for path in playbook_paths {
        if !path.exists() {
            return Err(PreflightError::MissingPlaybook(path.display().to_string()));
        }
    }

    Ok(())
}

/// Probe the remote API with a cheap read. Only called in live (non-mock)
/// mode; a mock client never fails this, and a hybrid run with no live
/// findings still dispatches fine without calling this at all.
pub async fn check_api_reachable(client: &dyn RemoteClient, base_url: &str) -> Result<(), PreflightError> {
    client
        .list_playbooks()
        .await
        .map(|_| ())
        .map_err(|e| PreflightError::ApiUnreachable(format!("{base_url}: {e}")))
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
