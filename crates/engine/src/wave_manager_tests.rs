// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use triage_client::MockClient;
use triage_core::clock::FakeClock;
use triage_core::config::OrchestratorConfig;
use triage_core::run::DataSource;
use triage_core::wave::Wave;
use triage_core::{Finding, RemediationSession};

fn finding(id: &str, service: &str) -> Finding {
    Finding::builder().finding_id(id).service_name(service).build()
}

fn config() -> OrchestratorConfig {
    OrchestratorConfig { poll_interval_seconds: 0, session_timeout_minutes: 90, min_success_rate: 0.7, ..OrchestratorConfig::default() }
}

#[test]
fn client_for_falls_back_to_whichever_side_is_present() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 1);
    let set = ClientSet::mock_only(&mock);

    assert!(set.client_for("mock").is_some());
    assert!(set.client_for("live").is_some());
}

#[test]
fn present_yields_only_configured_clients_tagged_by_name() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 2);
    let set = ClientSet::mock_only(&mock);
    let names: Vec<&str> = set.present().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["mock"]);
}

#[tokio::test]
async fn drain_stale_sessions_terminates_every_listed_session_and_resets_breaker() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 3);
    let req = triage_client::CreateSessionRequest { prompt: "remediate FIND-0001".to_string(), idempotent: true, ..Default::default() };
    mock.create_session(req).await.unwrap();

    let config = config();
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);
    manager.drain_stale_sessions().await;

    let page = mock.list_sessions(None, 20, 0).await.unwrap();
    assert_eq!(page.sessions.len(), 1);
}

#[test]
fn check_gate_passes_when_wave_is_empty_or_nothing_completed() {
    let config = config();
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 4);
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);

    let empty = Wave::new(1, Vec::new());
    assert!(manager.check_gate(&empty));

    let mut pending = Wave::new(1, vec![RemediationSession::builder_for(finding("FIND-0001", "payments-service"))]);
    pending.success_count = 0;
    pending.failure_count = 0;
    assert!(manager.check_gate(&pending));
}

#[test]
fn check_gate_fails_below_min_success_rate() {
    let config = config();
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 5);
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);

    let mut wave = Wave::new(
        1,
        vec![
            RemediationSession::builder_for(finding("FIND-0001", "payments-service")),
            RemediationSession::builder_for(finding("FIND-0002", "payments-service")),
            RemediationSession::builder_for(finding("FIND-0003", "payments-service")),
        ],
    );
    wave.success_count = 1;
    wave.failure_count = 2;
    assert!(!manager.check_gate(&wave));
}

#[tokio::test]
async fn execute_run_drives_a_single_wave_to_completion_and_persists_state() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock.clone(), 6);
    let config = OrchestratorConfig { poll_interval_seconds: 0, session_timeout_minutes: 90, min_success_rate: 0.0, ..OrchestratorConfig::default() };
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);

    let dir = tempdir().unwrap();
    let state_store = StateStore::new(dir.path());
    let mut ledger = IdempotencyLedger::load(dir.path().join("ledger.json"));

    let mut run = BatchRun::new(1, DataSource::Mock);
    run.waves.push(Wave::new(1, vec![RemediationSession::builder_for(finding("FIND-0001", "payments-service"))]));

    let interrupted = AtomicBool::new(false);

    // Fast-forward the clock well past every mock stage so the single
    // poll iteration already observes a terminal session.
    clock.advance(std::time::Duration::from_secs(120));

    manager.execute_run(&mut run, Some(&mut ledger), None, None, Some(&state_store), &interrupted).await;

    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.events.iter().any(|e| e.event_type == "run_completed"));
    assert!(state_store.load_run_state(&run.run_id).is_some());
}

#[tokio::test]
async fn execute_run_stops_at_a_wave_boundary_when_interrupted() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock, 7);
    let config = config();
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);

    let mut run = BatchRun::new(2, DataSource::Mock);
    run.waves.push(Wave::new(1, vec![RemediationSession::builder_for(finding("FIND-0001", "payments-service"))]));
    run.waves.push(Wave::new(2, vec![RemediationSession::builder_for(finding("FIND-0002", "payments-service"))]));

    let interrupted = AtomicBool::new(true);
    manager.execute_run(&mut run, None, None, None, None, &interrupted).await;

    assert_eq!(run.status, RunStatus::Interrupted);
}

#[tokio::test]
async fn execute_run_skips_waves_already_completed_on_a_resumed_run() {
    let clock = FakeClock::new();
    let mock = MockClient::new(clock.clone(), 8);
    let config = OrchestratorConfig { poll_interval_seconds: 0, session_timeout_minutes: 90, min_success_rate: 0.0, ..OrchestratorConfig::default() };
    let manager = WaveManager::new(ClientSet::mock_only(&mock), &config);

    let mut completed_session = RemediationSession::builder_for(finding("FIND-0001", "payments-service"));
    completed_session.status = triage_core::session::SessionStatus::Success;
    let mut completed_wave = Wave::new(1, vec![completed_session]);
    completed_wave.status = WaveStatus::Completed;
    completed_wave.success_count = 1;

    let mut run = BatchRun::new(2, DataSource::Mock);
    run.waves.push(completed_wave);
    run.waves.push(Wave::new(2, vec![RemediationSession::builder_for(finding("FIND-0002", "payments-service"))]));

    let interrupted = AtomicBool::new(false);
    clock.advance(std::time::Duration::from_secs(120));

    manager.execute_run(&mut run, None, None, None, None, &interrupted).await;

    // The already-completed wave's session must be untouched (still the
    // same status it was reloaded with, not re-dispatched).
    assert_eq!(run.waves[0].sessions[0].status, triage_core::session::SessionStatus::Success);
    assert!(!run.events.iter().any(|e| e.message.contains("wave 0 started")));
    assert_eq!(run.status, RunStatus::Completed);
}
