// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session status classification predicates.
//!
//! `blocked` belongs to a different set depending on who's asking: it is
//! *active* for polling (a PR may still appear and promote it to success)
//! but counts as a *failure* for aggregate bookkeeping, and is excluded
//! from both wave cleanup and retry eligibility (nobody auto-terminates or
//! auto-retries a session a human may still need to unblock). Each
//! predicate below corresponds to one named set from the design rather
//! than a single collapsed `is_terminal()` — collapsing them would lose
//! the distinction that matters at each call site.

use crate::session::SessionStatus;

/// Active for polling: dispatched, working, or blocked. `blocked` is here
/// because `interpret_session_status` can still promote it to `success`
/// once a PR appears.
pub fn is_poll_active(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Dispatched | SessionStatus::Working | SessionStatus::Blocked)
}

/// Terminal for polling: success, failed, or timeout. Does not include
/// `blocked`, which keeps getting polled.
pub fn is_poll_terminal(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Success | SessionStatus::Failed | SessionStatus::Timeout)
}

/// Terminal for aggregate counting (`ProgressTracker`/memory extraction):
/// success, failed, timeout, or blocked.
pub fn is_aggregate_terminal(status: SessionStatus) -> bool {
    matches!(
        status,
        SessionStatus::Success | SessionStatus::Failed | SessionStatus::Timeout | SessionStatus::Blocked
    )
}

/// Counts as a failure for aggregates: failed, timeout, or blocked.
pub fn is_failure(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Failed | SessionStatus::Timeout | SessionStatus::Blocked)
}

pub fn is_success(status: SessionStatus) -> bool {
    status == SessionStatus::Success
}

/// Counts toward `get_summary`'s `active_sessions`: dispatched or working.
/// Excludes `blocked` — a blocked session isn't "active work in flight"
/// from the dashboard's point of view.
pub fn is_summary_active(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Dispatched | SessionStatus::Working)
}

/// Terminal for wave cleanup (safe to best-effort `terminate_session`):
/// success, failed, or timeout. Excludes `blocked` — cleanup never
/// terminates a session a human may still need to unblock.
pub fn is_cleanup_terminal(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Success | SessionStatus::Failed | SessionStatus::Timeout)
}

/// Eligible for automatic retry: failed or timeout. Excludes `blocked` —
/// blocked sessions are never auto-retried.
pub fn is_retry_eligible(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Failed | SessionStatus::Timeout)
}

/// Terminal for memory extraction: same set as aggregate-terminal.
pub fn is_memory_eligible(status: SessionStatus) -> bool {
    is_aggregate_terminal(status)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
