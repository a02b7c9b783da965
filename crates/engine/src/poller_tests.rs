// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use triage_client::MockClient;
use triage_core::clock::FakeClock;
use triage_core::config::OrchestratorConfig;
use triage_core::{Finding, RemediationSession};

fn finding() -> Finding {
    Finding::builder().service_name("payments-service").finding_id("FIND-0001").build()
}

fn config() -> OrchestratorConfig {
    OrchestratorConfig { session_timeout_minutes: 90, ..OrchestratorConfig::default() }
}

#[tokio::test]
async fn poll_session_folds_response_into_the_session() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock.clone(), 1);
    let mut session = RemediationSession::builder_for(finding());

    let request = triage_client::CreateSessionRequest { prompt: "remediate FIND-0001".to_string(), idempotent: true, ..Default::default() };
    let created = client.create_session(request).await.unwrap();
    session.session_id = Some(triage_core::SessionId::new(created.session_id));
    session.created_at = Some(chrono::Utc::now());
    session.status = triage_core::SessionStatus::Dispatched;

    poll_session(&client, &mut session).await;

    assert!(session.structured_output.is_some());
}

#[tokio::test]
async fn poll_session_on_missing_id_leaves_session_unchanged() {
    let client = MockClient::new(FakeClock::new(), 2);
    let mut session = RemediationSession::builder_for(finding());
    session.session_id = Some(triage_core::SessionId::new("nonexistent"));
    session.status = triage_core::SessionStatus::Dispatched;

    poll_session(&client, &mut session).await;

    assert_eq!(session.status, triage_core::SessionStatus::Dispatched);
}

#[tokio::test]
async fn poll_active_sessions_times_out_past_session_timeout_minutes() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock.clone(), 3);
    let mut session = RemediationSession::builder_for(finding());
    session.session_id = Some(triage_core::SessionId::new("sess-1"));
    session.status = triage_core::SessionStatus::Working;
    session.created_at = Some(chrono::Utc::now() - chrono::Duration::minutes(200));

    let mut sessions = vec![session];
    let mut events = Vec::new();
    let config = config();

    let active = poll_active_sessions(&client, &mut sessions, &mut events, &config, None).await;

    assert!(active.is_empty());
    assert_eq!(sessions[0].status, triage_core::SessionStatus::Timeout);
    assert!(events.iter().any(|e| e.event_type == "session_failed"));
}

#[tokio::test]
async fn poll_active_sessions_respects_data_source_filter() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 4);
    let mut session = RemediationSession::builder_for(finding());
    session.session_id = Some(triage_core::SessionId::new("sess-live"));
    session.status = triage_core::SessionStatus::Working;
    session.created_at = Some(chrono::Utc::now());
    session.data_source = "live".to_string();

    let mut sessions = vec![session];
    let mut events = Vec::new();
    let config = config();

    let active = poll_active_sessions(&client, &mut sessions, &mut events, &config, Some("mock")).await;

    assert!(active.is_empty());
    assert!(events.is_empty());
    assert_eq!(sessions[0].status, triage_core::SessionStatus::Working);
}
