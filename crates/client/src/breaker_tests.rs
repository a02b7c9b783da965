// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use triage_core::clock::FakeClock;

fn breaker() -> CircuitBreaker<FakeClock> {
    CircuitBreaker::new(3, Duration::from_secs(30), FakeClock::new())
}

#[test]
fn closed_stays_closed_below_threshold() {
    let b = breaker();
    b.record_failure();
    b.record_failure();
    assert_eq!(b.state(), BreakerState::Closed);
    assert!(b.check().is_ok());
}

#[test]
fn reaching_threshold_opens_breaker_and_rejects() {
    let b = breaker();
    for _ in 0..3 {
        b.record_failure();
    }
    assert_eq!(b.state(), BreakerState::Open);
    assert!(b.check().is_err());
}

#[test]
fn cooldown_elapsed_transitions_to_half_open_on_read() {
    let clock = FakeClock::new();
    let b = CircuitBreaker::new(2, Duration::from_secs(30), clock.clone());
    b.record_failure();
    b.record_failure();
    assert_eq!(b.state(), BreakerState::Open);

    clock.advance(Duration::from_secs(31));
    assert_eq!(b.state(), BreakerState::HalfOpen);
    assert!(b.check().is_ok());
}

#[test]
fn half_open_probe_success_closes_with_zero_count() {
    let clock = FakeClock::new();
    let b = CircuitBreaker::new(2, Duration::from_secs(30), clock.clone());
    b.record_failure();
    b.record_failure();
    clock.advance(Duration::from_secs(31));
    assert_eq!(b.state(), BreakerState::HalfOpen);

    b.record_success();
    assert_eq!(b.state(), BreakerState::Closed);
    b.record_failure();
    assert_eq!(b.state(), BreakerState::Closed);
}

#[test]
fn half_open_probe_failure_reopens_with_new_last_failure() {
    let clock = FakeClock::new();
    let b = CircuitBreaker::new(2, Duration::from_secs(30), clock.clone());
    b.record_failure();
    b.record_failure();
    clock.advance(Duration::from_secs(31));
    assert_eq!(b.state(), BreakerState::HalfOpen);

    b.record_failure();
    assert_eq!(b.state(), BreakerState::Open);
    // cooldown resets from this new failure, not the original one
    assert!(b.check().is_err());
    clock.advance(Duration::from_secs(31));
    assert_eq!(b.state(), BreakerState::HalfOpen);
}

#[test]
fn reset_forces_closed_regardless_of_state() {
    let b = breaker();
    for _ in 0..3 {
        b.record_failure();
    }
    b.reset();
    assert_eq!(b.state(), BreakerState::Closed);
    assert!(b.check().is_ok());
}

#[test]
fn unrecord_failure_can_close_breaker_below_threshold() {
    let b = breaker();
    b.record_failure();
    b.record_failure();
    b.record_failure();
    assert_eq!(b.state(), BreakerState::Open);
    b.unrecord_failure();
    assert_eq!(b.state(), BreakerState::Closed);
}
