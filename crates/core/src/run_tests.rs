// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::finding::Finding;
use crate::session::{RemediationSession, SessionStatus};

fn session(status: SessionStatus, pr: Option<&str>) -> RemediationSession {
    let mut s = RemediationSession::new(Finding::builder().build(), "pb-1", 1);
    s.status = status;
    s.pr_url = pr.map(|p| p.to_string());
    s
}

#[test]
fn new_run_is_pending_with_no_events() {
    let run = BatchRun::new(10, DataSource::Mock);
    assert_eq!(run.status, RunStatus::Pending);
    assert!(run.events.is_empty());
    assert_eq!(run.total_findings, 10);
}

#[test]
fn record_event_appends_with_timestamp() {
    let mut run = BatchRun::new(1, DataSource::Mock);
    run.record_event("run_started", "starting batch");
    assert_eq!(run.events.len(), 1);
    assert_eq!(run.events[0].event_type, "run_started");
}

#[test]
fn recount_folds_across_waves() {
    let mut run = BatchRun::new(4, DataSource::Mock);
    run.waves.push(Wave::new(
        1,
        vec![
            session(SessionStatus::Success, Some("https://x/pr/1")),
            session(SessionStatus::Failed, None),
        ],
    ));
    run.waves.push(Wave::new(2, vec![session(SessionStatus::Timeout, None)]));

    run.recount();

    assert_eq!(run.completed_count, 3);
    assert_eq!(run.successful_count, 1);
    assert_eq!(run.failed_count, 2);
    assert_eq!(run.prs_created, 1);
}

#[test]
fn is_done_only_for_completed_or_interrupted() {
    let mut run = BatchRun::new(1, DataSource::Mock);
    assert!(!run.is_done());
    run.status = RunStatus::Running;
    assert!(!run.is_done());
    run.status = RunStatus::Completed;
    assert!(run.is_done());
    run.status = RunStatus::Interrupted;
    assert!(run.is_done());
}
