// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator configuration, loaded from environment variables with
//! defaults matching the original deployment.

use serde::{Deserialize, Serialize};
use std::env;

/// All tunables for one orchestrator process. Constructed once at
/// startup via [`OrchestratorConfig::from_env`]; never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub devin_api_key: String,
    pub devin_api_base_url: String,
    pub mock_mode: bool,
    pub hybrid_mode: bool,
    pub connected_repos: Vec<String>,
    pub max_parallel_sessions: u32,
    pub max_acu_per_session: u32,
    pub poll_interval_seconds: u64,
    pub session_timeout_minutes: u64,
    pub min_success_rate: f64,
    pub wave_size: u32,
    pub state_file_path: String,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_cooldown_seconds: u64,
    pub max_retries: u32,
    pub retry_jitter_max_seconds: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            devin_api_key: String::new(),
            devin_api_base_url: "https://api.devin.ai/v1".to_string(),
            mock_mode: true,
            hybrid_mode: false,
            connected_repos: Vec::new(),
            max_parallel_sessions: 10,
            max_acu_per_session: 5,
            poll_interval_seconds: 20,
            session_timeout_minutes: 90,
            min_success_rate: 0.7,
            wave_size: 10,
            state_file_path: "./state.json".to_string(),
            circuit_breaker_threshold: 5,
            circuit_breaker_cooldown_seconds: 30,
            max_retries: 3,
            retry_jitter_max_seconds: 1.0,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl OrchestratorConfig {
    /// Load configuration from the process environment, falling back to
    /// [`OrchestratorConfig::default`] for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let connected_repos = match env::var("CONNECTED_REPOS") {
            Ok(v) if !v.trim().is_empty() => {
                v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
            }
            _ => defaults.connected_repos.clone(),
        };

        Self {
            devin_api_key: env_string("DEVIN_API_KEY", &defaults.devin_api_key),
            devin_api_base_url: env_string("DEVIN_API_BASE_URL", &defaults.devin_api_base_url),
            mock_mode: env_bool("MOCK_MODE", defaults.mock_mode),
            hybrid_mode: env_bool("HYBRID_MODE", defaults.hybrid_mode),
            connected_repos,
            max_parallel_sessions: env_parse("MAX_PARALLEL_SESSIONS", defaults.max_parallel_sessions),
            max_acu_per_session: env_parse("MAX_ACU_PER_SESSION", defaults.max_acu_per_session),
            poll_interval_seconds: env_parse("POLL_INTERVAL_SECONDS", defaults.poll_interval_seconds),
            session_timeout_minutes: env_parse(
                "SESSION_TIMEOUT_MINUTES",
                defaults.session_timeout_minutes,
            ),
            min_success_rate: env_parse("MIN_SUCCESS_RATE", defaults.min_success_rate),
            wave_size: env_parse("WAVE_SIZE", defaults.wave_size),
            state_file_path: env_string("STATE_FILE_PATH", &defaults.state_file_path),
            circuit_breaker_threshold: env_parse(
                "CIRCUIT_BREAKER_THRESHOLD",
                defaults.circuit_breaker_threshold,
            ),
            circuit_breaker_cooldown_seconds: env_parse(
                "CIRCUIT_BREAKER_COOLDOWN_SECONDS",
                defaults.circuit_breaker_cooldown_seconds,
            ),
            max_retries: env_parse("MAX_RETRIES", defaults.max_retries),
            retry_jitter_max_seconds: env_parse(
                "RETRY_JITTER_MAX_SECONDS",
                defaults.retry_jitter_max_seconds,
            ),
        }
    }

    /// Preflight-relevant derived check: hybrid mode requires at least one
    /// connected repo (see `crate::error` / engine preflight).
    pub fn hybrid_requires_repos(&self) -> bool {
        self.hybrid_mode && self.connected_repos.is_empty()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
