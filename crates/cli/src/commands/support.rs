// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for the `run`/`resume` commands: client construction and
//! the on-disk stores every run needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use triage_client::{CircuitBreaker, LiveClient, MockClient, RemoteClient};
use triage_core::clock::{Clock, SystemClock};
use triage_core::config::OrchestratorConfig;
use triage_engine::ClientSet;
use triage_storage::{IdempotencyLedger, MemoryStore, StateStore};

/// Owned clients backing one run. Boxed so `MockClient`/`LiveClient` can
/// live behind a single `Option<Box<dyn RemoteClient>>` regardless of
/// which (or both, in hybrid mode) are in play.
pub struct Clients {
    pub mock: Option<Box<dyn RemoteClient>>,
    pub live: Option<Box<dyn RemoteClient>>,
}

impl Clients {
    pub fn as_client_set(&self) -> ClientSet<'_> {
        ClientSet { mock: self.mock.as_deref(), live: self.live.as_deref() }
    }
}

fn new_mock() -> Box<dyn RemoteClient> {
    Box::new(MockClient::new(SystemClock, SystemClock.epoch_ms()))
}

fn new_live(config: &OrchestratorConfig) -> Box<dyn RemoteClient> {
    let breaker = Arc::new(CircuitBreaker::new(
        config.circuit_breaker_threshold,
        Duration::from_secs(config.circuit_breaker_cooldown_seconds),
        SystemClock,
    ));
    Box::new(LiveClient::new(
        config.devin_api_base_url.clone(),
        config.devin_api_key.clone(),
        breaker,
        config.max_retries,
        config.retry_jitter_max_seconds,
    ))
}

/// Build the clients this run needs: both in hybrid mode, otherwise
/// whichever side `config.mock_mode` selects.
pub fn build_clients(config: &OrchestratorConfig) -> Clients {
    if config.hybrid_mode {
        Clients { mock: Some(new_mock()), live: Some(new_live(config)) }
    } else if config.mock_mode {
        Clients { mock: Some(new_mock()), live: None }
    } else {
        Clients { mock: None, live: Some(new_live(config)) }
    }
}

/// Directory where run state, the run index, and the idempotency ledger
/// live — derived from `state_file_path`'s parent directory (the legacy
/// mirror file itself stays at `state_file_path`).
pub fn state_root(config: &OrchestratorConfig) -> PathBuf {
    match Path::new(&config.state_file_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn open_state_store(config: &OrchestratorConfig) -> StateStore {
    StateStore::new(state_root(config))
}

pub fn open_memory_store(config: &OrchestratorConfig) -> MemoryStore {
    MemoryStore::new(state_root(config).join("memory"))
}

pub fn open_ledger(config: &OrchestratorConfig) -> IdempotencyLedger {
    IdempotencyLedger::load(state_root(config).join("ledger.json"))
}

/// Where playbook markdown assets live, relative to the working
/// directory the binary was invoked from.
pub fn playbooks_dir() -> PathBuf {
    PathBuf::from("playbooks")
}
