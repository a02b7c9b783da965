// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process exclusive lock and atomic rename for shared JSON files
//! (C1). Lock protocol: atomically create a sibling `{path}.lock` file
//! with exclusive-create semantics; delete it on every exit path.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use triage_core::error::LockTimeout;

const DEFAULT_STALE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockPayload {
    pid: u32,
    host: String,
    started_at: u64,
    writer: String,
}

/// Best-effort liveness check for a locally-owned PID. Isolated behind a
/// function (not a trait) since it's only ever exercised by the one stale
/// detection call site; tests exercise the age-only cross-host path
/// instead of faking liveness.
#[cfg(unix)]
fn pid_is_alive(pid: u32) -> bool {
    // signal 0 performs no action but still validates the pid exists and
    // is reachable by this process.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_is_alive(_pid: u32) -> bool {
    true
}

fn current_host() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}

fn lock_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".lock");
    PathBuf::from(s)
}

fn is_stale(lock_file: &Path, stale_timeout: Duration) -> bool {
    let metadata = match std::fs::metadata(lock_file) {
        Ok(m) => m,
        Err(_) => return true,
    };
    let age = match metadata.modified().ok().and_then(|m| m.elapsed().ok()) {
        Some(age) => age,
        None => return false,
    };
    if age <= stale_timeout {
        return false;
    }
    match std::fs::read_to_string(lock_file).ok().and_then(|s| serde_json::from_str::<LockPayload>(&s).ok())
    {
        Some(payload) if payload.host == current_host() => !pid_is_alive(payload.pid),
        // unreadable/corrupt metadata, or a different host: age alone decides.
        _ => true,
    }
}

/// A held exclusive lock on `target`. Deletes the sidecar `.lock` file on
/// drop, including on panic-unwind, so every exit path releases it.
pub struct FileLock {
    lock_file: PathBuf,
}

impl FileLock {
    /// Acquire the lock on `target`, retrying every `poll_interval` until
    /// `timeout` elapses.
    pub fn acquire(target: &Path, timeout: Duration, poll_interval: Duration) -> Result<Self, LockTimeout> {
        Self::acquire_as(target, timeout, poll_interval, "triage-storage")
    }

    pub fn acquire_as(
        target: &Path,
        timeout: Duration,
        poll_interval: Duration,
        writer: &str,
    ) -> Result<Self, LockTimeout> {
        let lock_file = lock_path(target);
        let deadline = std::time::Instant::now() + timeout;

        loop {
            match try_create(&lock_file, writer) {
                Ok(()) => return Ok(Self { lock_file }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(&lock_file, DEFAULT_STALE_TIMEOUT) {
                        let _ = std::fs::remove_file(&lock_file);
                        continue;
                    }
                    if std::time::Instant::now() >= deadline {
                        return Err(LockTimeout {
                            path: target.display().to_string(),
                            timeout_seconds: timeout.as_secs_f64(),
                        });
                    }
                    std::thread::sleep(poll_interval);
                }
                Err(_) => {
                    if std::time::Instant::now() >= deadline {
                        return Err(LockTimeout {
                            path: target.display().to_string(),
                            timeout_seconds: timeout.as_secs_f64(),
                        });
                    }
                    std::thread::sleep(poll_interval);
                }
            }
        }
    }
}

fn try_create(lock_file: &Path, writer: &str) -> io::Result<()> {
    use std::io::Write;
    let payload = LockPayload {
        pid: std::process::id(),
        host: current_host(),
        started_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs(),
        writer: writer.to_string(),
    };
    let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(lock_file)?;
    let bytes = serde_json::to_vec(&payload).unwrap_or_default();
    file.write_all(&bytes)?;
    Ok(())
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.lock_file);
    }
}

/// Write `value` to `path` via a sibling `.tmp` file then an atomic
/// rename, so a concurrent reader never observes a partial write.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load JSON from `path`, falling back to `default()` on missing or
/// corrupt content (state-file-corruption policy from the error design:
/// never fail the process, just warn and start empty).
pub fn load_json_or_default<T: for<'de> Deserialize<'de>>(path: &Path, default: impl FnOnce() -> T) -> T {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt state file, starting fresh");
                default()
            }
        },
        Err(_) => default(),
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
