// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

const VARS: &[&str] = &[
    "DEVIN_API_KEY",
    "DEVIN_API_BASE_URL",
    "MOCK_MODE",
    "HYBRID_MODE",
    "CONNECTED_REPOS",
    "MAX_PARALLEL_SESSIONS",
    "WAVE_SIZE",
    "MIN_SUCCESS_RATE",
];

fn clear_vars() {
    for v in VARS {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn defaults_match_documented_values() {
    clear_vars();
    let config = OrchestratorConfig::from_env();
    assert_eq!(config.devin_api_base_url, "https://api.devin.ai/v1");
    assert!(config.mock_mode);
    assert!(!config.hybrid_mode);
    assert_eq!(config.poll_interval_seconds, 20);
    assert_eq!(config.session_timeout_minutes, 90);
    assert_eq!(config.min_success_rate, 0.7);
    assert_eq!(config.wave_size, 10);
    assert_eq!(config.circuit_breaker_threshold, 5);
    assert_eq!(config.circuit_breaker_cooldown_seconds, 30);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_jitter_max_seconds, 1.0);
}

#[test]
#[serial]
fn connected_repos_splits_csv_and_trims() {
    clear_vars();
    env::set_var("CONNECTED_REPOS", "org/a, org/b,org/c ");
    let config = OrchestratorConfig::from_env();
    assert_eq!(config.connected_repos, vec!["org/a", "org/b", "org/c"]);
    clear_vars();
}

#[test]
#[serial]
fn mock_mode_env_overrides_default() {
    clear_vars();
    env::set_var("MOCK_MODE", "false");
    let config = OrchestratorConfig::from_env();
    assert!(!config.mock_mode);
    clear_vars();
}

#[test]
fn hybrid_without_repos_is_flagged() {
    let mut config = OrchestratorConfig::default();
    config.hybrid_mode = true;
    assert!(config.hybrid_requires_repos());
    config.connected_repos.push("org/repo".to_string());
    assert!(!config.hybrid_requires_repos());
}
