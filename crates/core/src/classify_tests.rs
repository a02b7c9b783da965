// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::SessionStatus as S;

#[yare::parameterized(
    pending    = { S::Pending, false },
    dispatched = { S::Dispatched, true },
    working    = { S::Working, true },
    blocked    = { S::Blocked, true },
    success    = { S::Success, false },
    failed     = { S::Failed, false },
    timeout    = { S::Timeout, false },
)]
fn poll_active_set(status: S, expected: bool) {
    assert_eq!(is_poll_active(status), expected);
}

#[yare::parameterized(
    success = { S::Success, true },
    failed  = { S::Failed, true },
    timeout = { S::Timeout, true },
    blocked = { S::Blocked, false },
    working = { S::Working, false },
)]
fn poll_terminal_excludes_blocked(status: S, expected: bool) {
    assert_eq!(is_poll_terminal(status), expected);
}

#[yare::parameterized(
    success = { S::Success, true },
    failed  = { S::Failed, true },
    timeout = { S::Timeout, true },
    blocked = { S::Blocked, true },
    working = { S::Working, false },
    pending = { S::Pending, false },
)]
fn aggregate_terminal_includes_blocked(status: S, expected: bool) {
    assert_eq!(is_aggregate_terminal(status), expected);
}

#[yare::parameterized(
    failed  = { S::Failed, true },
    timeout = { S::Timeout, true },
    blocked = { S::Blocked, true },
    success = { S::Success, false },
)]
fn failure_set_includes_blocked(status: S, expected: bool) {
    assert_eq!(is_failure(status), expected);
}

#[yare::parameterized(
    dispatched = { S::Dispatched, true },
    working    = { S::Working, true },
    blocked    = { S::Blocked, false },
)]
fn summary_active_excludes_blocked(status: S, expected: bool) {
    assert_eq!(is_summary_active(status), expected);
}

#[yare::parameterized(
    success = { S::Success, true },
    failed  = { S::Failed, true },
    timeout = { S::Timeout, true },
    blocked = { S::Blocked, false },
)]
fn cleanup_terminal_excludes_blocked(status: S, expected: bool) {
    assert_eq!(is_cleanup_terminal(status), expected);
}

#[yare::parameterized(
    failed  = { S::Failed, true },
    timeout = { S::Timeout, true },
    blocked = { S::Blocked, false },
    success = { S::Success, false },
)]
fn retry_eligible_excludes_blocked(status: S, expected: bool) {
    assert_eq!(is_retry_eligible(status), expected);
}
