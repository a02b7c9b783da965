// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remote API returns either a bare JSON array or an envelope object
//! (`{sessions: [...], total}` / `{playbooks: [...]}`) depending on
//! endpoint and pagination. This normalizes either shape into a `Vec<T>`
//! without per-endpoint special-casing (§9).

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull a `Vec<T>` out of `value`, trying a bare array first, then an
/// envelope object keyed by `envelope_key` (e.g. `"sessions"`,
/// `"playbooks"`).
pub fn normalize_list<T: DeserializeOwned>(value: &Value, envelope_key: &str) -> Vec<T> {
    if let Some(items) = value.as_array() {
        return items.iter().filter_map(|v| serde_json::from_value(v.clone()).ok()).collect();
    }
    if let Some(items) = value.get(envelope_key).and_then(Value::as_array) {
        return items.iter().filter_map(|v| serde_json::from_value(v.clone()).ok()).collect();
    }
    Vec::new()
}

/// Total count, if the envelope carries one (bare-array responses have no
/// `total` field; callers fall back to the list's own length).
pub fn envelope_total(value: &Value) -> Option<u64> {
    value.get("total").and_then(Value::as_u64)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
