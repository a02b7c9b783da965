// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Three-state circuit breaker (C3): closed/open/half_open with cooldown
//! and single-probe admission. Per-client, not per-endpoint.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use triage_core::clock::Clock;
use triage_core::error::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<std::time::Instant>,
}

/// `check()` admits or short-circuits a call; `record_success`/
/// `record_failure` report the outcome afterward. Reading state while
/// `open` lazily transitions to `half_open` once `cooldown` has elapsed —
/// there's no background timer, just a check on read.
pub struct CircuitBreaker<C: Clock> {
    inner: Mutex<Inner>,
    threshold: u32,
    cooldown: Duration,
    clock: C,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(threshold: u32, cooldown: Duration, clock: C) -> Self {
        Self {
            inner: Mutex::new(Inner { state: BreakerState::Closed, failure_count: 0, last_failure: None }),
            threshold,
            cooldown,
            clock,
        }
    }

    /// Current state, resolving a pending open→half_open transition first.
    pub fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock();
        self.resolve_cooldown(&mut inner);
        inner.state
    }

    fn resolve_cooldown(&self, inner: &mut Inner) {
        if inner.state == BreakerState::Open {
            if let Some(last) = inner.last_failure {
                if self.clock.now().duration_since(last) >= self.cooldown {
                    inner.state = BreakerState::HalfOpen;
                }
            }
        }
    }

    /// Admit or reject a call. `open` rejects with the remaining cooldown;
    /// `half_open` admits exactly one probe per transition (no internal
    /// counter of in-flight probes — callers are expected to be
    /// sequential per §5's single-threaded dispatch model).
    pub fn check(&self) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        self.resolve_cooldown(&mut inner);
        match inner.state {
            BreakerState::Open => {
                let remaining = inner
                    .last_failure
                    .map(|last| self.cooldown.saturating_sub(self.clock.now().duration_since(last)))
                    .unwrap_or(self.cooldown);
                Err(RemoteError::BreakerOpen { cooldown_remaining_secs: remaining.as_secs_f64() })
            }
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.state = BreakerState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count += 1;
        inner.last_failure = Some(self.clock.now());
        if inner.failure_count >= self.threshold {
            inner.state = BreakerState::Open;
        }
    }

    /// Un-record one failure (used by `terminate_session_best_effort`
    /// when a 404 is treated as success after the fact).
    pub fn unrecord_failure(&self) {
        let mut inner = self.inner.lock();
        if inner.failure_count > 0 {
            inner.failure_count -= 1;
        }
        if inner.failure_count < self.threshold && inner.state == BreakerState::Open {
            inner.state = BreakerState::Closed;
        }
    }

    /// Unconditionally force closed + zero count.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = BreakerState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
    }
}

/// Shareable handle, since a single breaker instance is shared by every
/// call site on a client.
pub type SharedBreaker<C> = Arc<CircuitBreaker<C>>;

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
