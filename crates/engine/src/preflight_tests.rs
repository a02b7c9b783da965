// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use triage_client::MockClient;
use triage_core::clock::FakeClock;

fn config() -> OrchestratorConfig {
    OrchestratorConfig { mock_mode: true, ..OrchestratorConfig::default() }
}

#[test]
fn empty_findings_is_fatal() {
    let result = preflight_check(&config(), 0, &[]);
    assert!(matches!(result, Err(PreflightError::EmptyFindings)));
}

#[test]
fn live_mode_without_api_key_is_fatal() {
    let cfg = OrchestratorConfig { mock_mode: false, devin_api_key: String::new(), ..OrchestratorConfig::default() };
    let result = preflight_check(&cfg, 1, &[]);
    assert!(matches!(result, Err(PreflightError::MissingApiKey)));
}

#[test]
fn hybrid_without_connected_repos_is_fatal() {
    let cfg = OrchestratorConfig { hybrid_mode: true, connected_repos: Vec::new(), ..OrchestratorConfig::default() };
    let result = preflight_check(&cfg, 1, &[]);
    assert!(matches!(result, Err(PreflightError::HybridWithoutRepos)));
}

#[test]
fn missing_playbook_file_is_fatal() {
    let path = std::path::Path::new("/nonexistent/playbook.md");
    let result = preflight_check(&config(), 1, &[path]);
    assert!(matches!(result, Err(PreflightError::MissingPlaybook(_))));
}

#[test]
fn passes_with_mock_mode_and_findings() {
    let result = preflight_check(&config(), 3, &[]);
    assert!(result.is_ok());
}

#[tokio::test]
async fn reachability_check_succeeds_against_a_working_mock_client() {
    let client = MockClient::new(FakeClock::new(), 1);
    let result = check_api_reachable(&client, "https://mock").await;
    assert!(result.is_ok());
}
