// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy for the orchestration engine.
//!
//! Kinds, not types: every fallible subsystem funnels into one of these
//! variants so call sites can match on taxonomy rather than on a specific
//! crate's error enum.

use thiserror::Error;

/// Cross-process file lock acquisition failed.
#[derive(Debug, Error)]
#[error("could not acquire lock on {path} within {timeout_seconds}s")]
pub struct LockTimeout {
    pub path: String,
    pub timeout_seconds: f64,
}

/// Errors from the resilient remote client (C4).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-2xx response from the remote agent API that was not retried
    /// (or survived retrying), carrying the HTTP status (0 for a network
    /// failure that exhausted retries).
    #[error("remote API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The circuit breaker is open and short-circuited the call.
    #[error("circuit breaker is open ({cooldown_remaining_secs:.1}s cooldown remaining)")]
    BreakerOpen { cooldown_remaining_secs: f64 },

    /// Underlying transport failure (connect/timeout) that exhausted retries.
    #[error("network error after retries: {0}")]
    Network(String),
}

impl RemoteError {
    /// The HTTP status carried by this error, if any (0 for network errors,
    /// `None` for a breaker-open short-circuit).
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Network(_) => Some(0),
            RemoteError::BreakerOpen { .. } => None,
        }
    }
}

/// Fatal preflight check failures (§7); a run never dispatches a single
/// session while any of these hold.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("DEVIN_API_KEY is not set and mock_mode is disabled")]
    MissingApiKey,
    #[error("remote API at {0} is unreachable")]
    ApiUnreachable(String),
    #[error("playbook file missing: {0}")]
    MissingPlaybook(String),
    #[error("no findings to remediate")]
    EmptyFindings,
    #[error("hybrid_mode is enabled but connected_repos is empty")]
    HybridWithoutRepos,
}
