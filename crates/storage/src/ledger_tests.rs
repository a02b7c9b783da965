// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn make_key_matches_documented_format() {
    assert_eq!(make_key("run-abc", "FIND-1", 1), "run-abc-FIND-1-attempt-1");
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = IdempotencyLedger::load(dir.path().join("ledger.json"));
    assert!(ledger.lookup("anything").is_none());
}

#[test]
fn corrupt_file_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, b"not json").unwrap();
    let ledger = IdempotencyLedger::load(&path);
    assert!(ledger.lookup("anything").is_none());
}

#[test]
fn record_then_reload_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ledger.json");
    let mut ledger = IdempotencyLedger::load(&path);
    let key = make_key("run-1", "FIND-1", 1);
    ledger.record(key.clone(), "ses-123".to_string(), Utc::now()).unwrap();

    let reloaded = IdempotencyLedger::load(&path);
    assert_eq!(reloaded.lookup(&key).unwrap().session_id, "ses-123");
}
