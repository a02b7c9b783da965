// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::remote::RemoteClient;
use std::time::Duration;
use triage_core::clock::FakeClock;

fn request(prompt: &str, tags: &[&str]) -> CreateSessionRequest {
    CreateSessionRequest {
        prompt: prompt.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        idempotent: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn create_session_assigns_an_id_and_starts_working() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 1);

    let created = client
        .create_session(request("fix FIND-0001 sql_injection in billing-service", &["sql_injection"]))
        .await
        .unwrap();
    assert!(created.is_new_session);

    let session = client.get_session(&created.session_id).await.unwrap();
    assert_eq!(session.status_enum, "working");
}

#[tokio::test]
async fn idempotent_create_with_same_prompt_reuses_session() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 2);

    let first = client.create_session(request("fix FIND-0002 xss in auth-service", &["xss"])).await.unwrap();
    let second = client.create_session(request("fix FIND-0002 xss in auth-service", &["xss"])).await.unwrap();

    assert_eq!(first.session_id, second.session_id);
    assert!(!second.is_new_session);
}

#[tokio::test]
async fn session_progresses_through_stages_as_clock_advances() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock.clone(), 3);

    let created = client
        .create_session(request("fix FIND-0003 hardcoded_secret in payments-service", &["hardcoded_secret"]))
        .await
        .unwrap();

    let early = client.get_session(&created.session_id).await.unwrap();
    assert_eq!(early.status_enum, "working");

    clock.advance(Duration::from_secs(120));
    let later = client.get_session(&created.session_id).await.unwrap();
    assert!(later.status_enum == "finished" || later.status_enum == "blocked");
}

#[tokio::test]
async fn terminate_marks_session_blocked_immediately() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 4);

    let created = client
        .create_session(request("fix FIND-0004 path_traversal in files-service", &["path_traversal"]))
        .await
        .unwrap();
    client.terminate_session(&created.session_id).await.unwrap();

    let session = client.get_session(&created.session_id).await.unwrap();
    assert_eq!(session.status_enum, "blocked");
}

#[tokio::test]
async fn get_session_missing_id_is_a_404() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 5);

    let result = client.get_session("no-such-session").await;
    assert!(matches!(result, Err(triage_core::error::RemoteError::Api { status: 404, .. })));
}

#[tokio::test]
async fn list_sessions_paginates_and_reports_total() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 6);

    for i in 0..3 {
        client
            .create_session(request(&format!("fix FIND-000{i} xss in svc-{i}-service"), &["xss"]))
            .await
            .unwrap();
    }

    let page = client.list_sessions(None, 2, 0).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.sessions.len(), 2);
}

#[tokio::test]
async fn create_playbook_then_list_round_trips() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 7);

    let created = client.create_playbook("SQL injection remediation", "steps...").await.unwrap();
    let playbooks = client.list_playbooks().await.unwrap();

    assert!(playbooks.iter().any(|p| p.playbook_id == created.playbook_id));
}

#[tokio::test]
async fn reset_circuit_breaker_and_close_are_no_ops() {
    let clock = FakeClock::new();
    let client = MockClient::new(clock, 8);

    client.reset_circuit_breaker();
    client.close().await;
}
