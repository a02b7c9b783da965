// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WaveManager (C9): drains stale sessions, then drives each wave through
//! dispatch, poll-to-quiescence, cleanup, gate, and bounded retry.

use crate::poller::poll_active_sessions;
use crate::retriever::retrieve_memories;
use crate::session_manager::{create_remediation_session, determine_data_source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use triage_client::RemoteClient;
use triage_core::classify;
use triage_core::config::OrchestratorConfig;
use triage_core::finding::Finding;
use triage_core::memory::MemoryGraph;
use triage_core::run::{BatchRun, Event, RunId, RunStatus};
use triage_core::wave::{Wave, WaveStatus};
use triage_storage::{IdempotencyLedger, MemoryStore, StateStore};

/// Routes sessions to the mock or live client by data source. Non-hybrid
/// runs populate only one side; the other falls back to whichever is
/// present so single-backend configs don't need both.
pub struct ClientSet<'a> {
    pub mock: Option<&'a dyn RemoteClient>,
    pub live: Option<&'a dyn RemoteClient>,
}

impl<'a> ClientSet<'a> {
    pub fn mock_only(client: &'a dyn RemoteClient) -> Self {
        Self { mock: Some(client), live: None }
    }

    pub fn live_only(client: &'a dyn RemoteClient) -> Self {
        Self { mock: None, live: Some(client) }
    }

    fn client_for(&self, data_source: &str) -> Option<&'a dyn RemoteClient> {
        match data_source {
            "live" => self.live.or(self.mock),
            _ => self.mock.or(self.live),
        }
    }

    fn present(&self) -> impl Iterator<Item = (&'static str, &'a dyn RemoteClient)> {
        [self.mock.map(|c| ("mock", c)), self.live.map(|c| ("live", c))].into_iter().flatten()
    }
}

fn memory_context_for(finding: &Finding, graph: Option<&MemoryGraph>, store: Option<&MemoryStore>) -> Option<String> {
    let (graph, store) = (graph?, store?);
    let hits = retrieve_memories(finding, graph, store, 3, true);
    if hits.is_empty() {
        return None;
    }
    Some(hits.iter().map(|h| format!("{}\n({})", h.body, h.source_note)).collect::<Vec<_>>().join("\n\n---\n\n"))
}

fn record_event_with_details(run: &mut BatchRun, event_type: impl Into<String>, message: impl Into<String>, details: serde_json::Value) {
    run.events.push(Event::new(event_type, message).with_details(details));
}

pub struct WaveManager<'a> {
    pub clients: ClientSet<'a>,
    pub config: &'a OrchestratorConfig,
}

impl<'a> WaveManager<'a> {
    pub fn new(clients: ClientSet<'a>, config: &'a OrchestratorConfig) -> Self {
        Self { clients, config }
    }

    /// Drain stale sessions left over from a prior process (§4.9 step 1).
    /// Failures here never fail the run; the circuit breaker is reset
    /// afterward so drain noise doesn't poison the real run.
    pub async fn drain_stale_sessions(&self) {
        for (name, client) in self.clients.present() {
            match client.list_sessions(None, 20, 0).await {
                Ok(page) => {
                    for session in &page.sessions {
                        if let Some(session_id) = &session.session_id {
                            client.terminate_session_best_effort(session_id).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(client = name, error = %e, "drain listing failed, continuing");
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(3)).await;
        for (_, client) in self.clients.present() {
            client.reset_circuit_breaker();
        }
    }

    async fn dispatch_wave(
        &self,
        wave: &mut Wave,
        events: &mut Vec<Event>,
        run_id: &RunId,
        mut ledger: Option<&mut IdempotencyLedger>,
        memory_graph: Option<&MemoryGraph>,
        memory_store: Option<&MemoryStore>,
    ) {
        let n = wave.sessions.len();
        for i in 0..n {
            let data_source = determine_data_source(&wave.sessions[i].finding.service_name, self.config).to_string();
            let Some(client) = self.clients.client_for(&data_source) else {
                tracing::warn!(data_source = %data_source, "no client configured for this data source, skipping session");
                continue;
            };
            let memory_context = memory_context_for(&wave.sessions[i].finding, memory_graph, memory_store);

            create_remediation_session(
                client,
                &mut wave.sessions[i],
                &data_source,
                ledger.as_deref_mut(),
                run_id,
                memory_context.as_deref(),
            )
            .await;

            events.push(Event::new("session_started", format!("{} dispatched ({data_source})", wave.sessions[i].finding.finding_id)));

            if i + 1 < n {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    /// Poll until no session in the wave is still active, sleeping
    /// `poll_interval_seconds` between iterations. In hybrid mode each
    /// client polls only the sessions it owns.
    async fn poll_wave(&self, wave: &mut Wave, events: &mut Vec<Event>) {
        loop {
            let any_active = wave.sessions.iter().any(|s| classify::is_poll_active(s.status));
            if !any_active {
                break;
            }

            for (name, client) in self.clients.present() {
                poll_active_sessions(client, &mut wave.sessions, events, self.config, Some(name)).await;
            }

            if wave.sessions.iter().any(|s| classify::is_poll_active(s.status)) {
                tokio::time::sleep(Duration::from_secs(self.config.poll_interval_seconds)).await;
            }
        }
    }

    /// Best-effort terminate every session in `wave` that reached a
    /// cleanup-terminal status, freeing remote concurrency slots.
    async fn cleanup_wave(&self, wave: &Wave) {
        for session in &wave.sessions {
            if !classify::is_cleanup_terminal(session.status) {
                continue;
            }
            let Some(session_id) = &session.session_id else { continue };
            let Some(client) = self.clients.client_for(&session.data_source) else { continue };
            client.terminate_session_best_effort(session_id.as_str()).await;
        }
    }

    /// `success_rate = success_count / total_count`; passes when the wave
    /// has nothing to grade yet (0 total or 0 completed).
    fn check_gate(&self, wave: &Wave) -> bool {
        let total = wave.total_count();
        let completed = wave.success_count + wave.failure_count;
        if total == 0 || completed == 0 {
            return true;
        }
        (f64::from(wave.success_count) / f64::from(total)) >= self.config.min_success_rate
    }

    /// Reset and redispatch sessions in {failed, timeout} with
    /// `attempt < 2`, then poll to quiescence. Because only the
    /// just-reset sessions are active afterward, polling the whole wave
    /// naturally touches only that subset.
    async fn retry_failed(
        &self,
        wave: &mut Wave,
        events: &mut Vec<Event>,
        run_id: &RunId,
        mut ledger: Option<&mut IdempotencyLedger>,
        memory_graph: Option<&MemoryGraph>,
        memory_store: Option<&MemoryStore>,
    ) {
        let retry_indices: Vec<usize> = wave
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| classify::is_retry_eligible(s.status) && s.attempt < 2)
            .map(|(i, _)| i)
            .collect();

        if retry_indices.is_empty() {
            return;
        }

        for &i in &retry_indices {
            wave.sessions[i].reset_for_retry();
            wave.sessions[i].attempt += 1;
        }

        for &i in &retry_indices {
            let data_source = determine_data_source(&wave.sessions[i].finding.service_name, self.config).to_string();
            let Some(client) = self.clients.client_for(&data_source) else { continue };
            let memory_context = memory_context_for(&wave.sessions[i].finding, memory_graph, memory_store);
            create_remediation_session(
                client,
                &mut wave.sessions[i],
                &data_source,
                ledger.as_deref_mut(),
                run_id,
                memory_context.as_deref(),
            )
            .await;
            events.push(Event::new(
                "session_started",
                format!("{} retried (attempt {})", wave.sessions[i].finding.finding_id, wave.sessions[i].attempt),
            ));
        }

        loop {
            let any_active = wave.sessions.iter().any(|s| classify::is_poll_active(s.status));
            if !any_active {
                break;
            }
            for (name, client) in self.clients.present() {
                poll_active_sessions(client, &mut wave.sessions, events, self.config, Some(name)).await;
            }
            if wave.sessions.iter().any(|s| classify::is_poll_active(s.status)) {
                tokio::time::sleep(Duration::from_secs(self.config.poll_interval_seconds)).await;
            }
        }
    }

    /// Drive `run` through every wave in order: drain, then per wave
    /// dispatch/poll/cleanup/gate/retry, stopping early on interruption
    /// or a failed gate. Persists via `state_store` at each wave boundary
    /// when given one.
    pub async fn execute_run(
        &self,
        run: &mut BatchRun,
        mut ledger: Option<&mut IdempotencyLedger>,
        memory_graph: Option<&MemoryGraph>,
        memory_store: Option<&MemoryStore>,
        state_store: Option<&StateStore>,
        interrupted: &AtomicBool,
    ) {
        self.drain_stale_sessions().await;

        let run_id = run.run_id;
        run.status = RunStatus::Running;

        let wave_count = run.waves.len();
        for wave_idx in 0..wave_count {
            if interrupted.load(Ordering::SeqCst) {
                run.status = RunStatus::Interrupted;
                run.record_event("run_interrupted", "run interrupted at wave boundary");
                if let Some(store) = state_store {
                    let _ = store.save_state(run);
                }
                return;
            }

            // A resumed run reloads a state snapshot where earlier waves may
            // already be Completed; re-driving them would re-dispatch
            // terminal sessions through the idempotency ledger and clobber
            // their recorded status. Only a wave still Pending/Running at
            // reload time needs (re)processing.
            if run.waves[wave_idx].status == WaveStatus::Completed {
                continue;
            }

            run.record_event("wave_started", format!("wave {wave_idx} started"));
            run.waves[wave_idx].status = WaveStatus::Running;
            if let Some(store) = state_store {
                let _ = store.save_state(run);
            }

            {
                let wave = &mut run.waves[wave_idx];
                let events = &mut run.events;
                self.dispatch_wave(wave, events, &run_id, ledger.as_deref_mut(), memory_graph, memory_store).await;
            }

            {
                let wave = &mut run.waves[wave_idx];
                let events = &mut run.events;
                self.poll_wave(wave, events).await;
            }

            run.waves[wave_idx].status = WaveStatus::Completed;
            self.cleanup_wave(&run.waves[wave_idx]).await;
            run.recount();

            let (success_count, failure_count) = (run.waves[wave_idx].success_count, run.waves[wave_idx].failure_count);
            record_event_with_details(
                run,
                "wave_completed",
                format!("wave {wave_idx} completed"),
                serde_json::json!({ "success_count": success_count, "failure_count": failure_count }),
            );

            if !self.check_gate(&run.waves[wave_idx]) {
                run.status = RunStatus::Paused;
                run.record_event("wave_gated", format!("wave {wave_idx} failed the success-rate gate"));
                if let Some(store) = state_store {
                    let _ = store.save_state(run);
                }
                return;
            }

            {
                let wave = &mut run.waves[wave_idx];
                let events = &mut run.events;
                self.retry_failed(wave, events, &run_id, ledger.as_deref_mut(), memory_graph, memory_store).await;
            }
            run.recount();

            if let Some(store) = state_store {
                let _ = store.save_state(run);
            }
        }

        if run.status != RunStatus::Paused {
            run.status = RunStatus::Completed;
            run.record_event("run_completed", "run completed");
            if let Some(store) = state_store {
                let _ = store.save_state(run);
            }
        }
    }
}

#[cfg(test)]
#[path = "wave_manager_tests.rs"]
mod tests;
