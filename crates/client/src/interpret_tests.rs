// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn response(status_enum: &str, pr: Option<&str>) -> SessionResponse {
    SessionResponse {
        session_id: None,
        status_enum: status_enum.to_string(),
        structured_output: None,
        pull_request: pr.map(|url| PullRequest { url: url.to_string() }),
    }
}

#[yare::parameterized(
    working            = { "working", SessionStatus::Working },
    suspend_requested  = { "suspend_requested", SessionStatus::Working },
    resume_requested   = { "resume_requested", SessionStatus::Working },
    resumed            = { "resumed", SessionStatus::Working },
    finished           = { "finished", SessionStatus::Success },
    expired            = { "expired", SessionStatus::Timeout },
    unknown            = { "some_future_status", SessionStatus::Working },
    missing            = { "", SessionStatus::Working },
)]
fn status_without_pr(status_enum: &str, expected: SessionStatus) {
    let result = interpret_session_status(&response(status_enum, None));
    assert_eq!(result.status, expected);
    assert!(result.pr_url.is_none());
}

#[test]
fn blocked_without_pr_stays_blocked() {
    let result = interpret_session_status(&response("blocked", None));
    assert_eq!(result.status, SessionStatus::Blocked);
}

#[test]
fn blocked_with_pr_promotes_to_success() {
    let result = interpret_session_status(&response("blocked", Some("https://example.com/pr/1")));
    assert_eq!(result.status, SessionStatus::Success);
    assert_eq!(result.pr_url.as_deref(), Some("https://example.com/pr/1"));
}

#[test]
fn finished_carries_pr_url_through() {
    let result = interpret_session_status(&response("finished", Some("https://example.com/pr/2")));
    assert_eq!(result.status, SessionStatus::Success);
    assert_eq!(result.pr_url.as_deref(), Some("https://example.com/pr/2"));
}

#[test]
fn error_message_read_from_structured_output() {
    let mut r = response("working", None);
    r.structured_output = Some(serde_json::json!({"error_message": "boom"}));
    let result = interpret_session_status(&r);
    assert_eq!(result.error_message.as_deref(), Some("boom"));
}
