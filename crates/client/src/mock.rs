// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process simulation of the remote agent API (C4's mock contract).
//! Sessions progress through stages by elapsed wall-clock time (read via
//! [`Clock`] so tests can fast-forward deterministically); ~15% stall
//! permanently in `testing` with `status_enum=blocked`.

use crate::interpret::{PullRequest, SessionResponse};
use crate::remote::{CreateSessionRequest, CreateSessionResponse, PlaybookInfo, RemoteClient, SessionListResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use triage_core::clock::Clock;
use triage_core::error::RemoteError;

struct Stage {
    name: &'static str,
    min_secs: f64,
    max_secs: f64,
    progress_start: u32,
    progress_end: u32,
}

const STAGES: &[Stage] = &[
    Stage { name: "analyzing", min_secs: 5.0, max_secs: 10.0, progress_start: 0, progress_end: 25 },
    Stage { name: "fixing", min_secs: 10.0, max_secs: 20.0, progress_start: 25, progress_end: 60 },
    Stage { name: "testing", min_secs: 8.0, max_secs: 15.0, progress_start: 60, progress_end: 85 },
    Stage { name: "creating_pr", min_secs: 3.0, max_secs: 8.0, progress_start: 85, progress_end: 95 },
];

fn fix_approach(category: &str) -> &'static str {
    match category {
        "sql_injection" => "Replace string concatenation in SQL query with a parameterized query",
        "dependency_vulnerability" => "Upgrade the vulnerable dependency to the patched version from the advisory",
        "hardcoded_secret" => "Move the hardcoded credential to an environment variable loaded via config",
        "pii_logging" => "Redact PII fields from log output using a sanitization filter",
        "missing_encryption" => "Add encryption at rest for sensitive data using a managed key store",
        "access_logging" => "Add structured audit logging middleware for compliance",
        "xss" => "Apply context-aware output encoding using the framework's escaping utilities",
        "path_traversal" => "Validate and canonicalize file paths against an allowed-directory whitelist",
        _ => "Apply security best practices to remediate the identified vulnerability",
    }
}

fn file_templates(category: &str) -> &'static [&'static str] {
    match category {
        "sql_injection" => &["src/dao/{cls}.java", "src/dao/{cls}Test.java"],
        "dependency_vulnerability" => &["pom.xml", "requirements.txt"],
        "hardcoded_secret" => &["src/config/{cls}.java", "config.py"],
        "pii_logging" => &["app/routes/{service}_routes.py"],
        "missing_encryption" => &["src/model/{cls}.java"],
        "access_logging" => &["src/middleware/auth.ts"],
        "xss" => &["src/controllers/{service}Controller.ts"],
        "path_traversal" => &["src/controllers/fileController.ts"],
        _ => &["src/main/fix.java"],
    }
}

const CATEGORIES: &[&str] = &[
    "sql_injection",
    "dependency_vulnerability",
    "hardcoded_secret",
    "pii_logging",
    "missing_encryption",
    "access_logging",
    "xss",
    "path_traversal",
];

fn extract_finding_id(prompt: &str) -> String {
    if let Some(pos) = prompt.find("FIND-") {
        let digits: String = prompt[pos + "FIND-".len()..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return format!("FIND-{digits}");
        }
    }
    "FIND-UNKNOWN".to_string()
}

fn extract_category(prompt: &str, tags: &[String]) -> String {
    for tag in tags {
        if CATEGORIES.contains(&tag.as_str()) {
            return tag.clone();
        }
    }
    let lowered = prompt.to_lowercase();
    for cat in CATEGORIES {
        if lowered.contains(cat) {
            return (*cat).to_string();
        }
    }
    "other".to_string()
}

fn extract_service(prompt: &str, tags: &[String]) -> String {
    for word in prompt.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
        if trimmed.ends_with("-service") {
            return trimmed.to_string();
        }
    }
    for tag in tags {
        if tag.ends_with("-service") {
            return tag.clone();
        }
    }
    "unknown-service".to_string()
}

struct StageDuration {
    name: &'static str,
    secs: f64,
    progress_start: u32,
    progress_end: u32,
}

struct SessionState {
    created_at: std::time::Instant,
    will_fail: bool,
    stage_durations: Vec<StageDuration>,
    prompt: String,
    finding_id: String,
    category: String,
    service: String,
    terminated: bool,
}

/// Deterministic given a fixed `seed` and a [`Clock`] the caller advances
/// manually — real wall-clock time with `SystemClock`, instantaneous
/// fast-forward in tests with `FakeClock`.
pub struct MockClient<C: Clock> {
    clock: C,
    rng: Mutex<StdRng>,
    sessions: Mutex<HashMap<String, SessionState>>,
    playbooks: Mutex<HashMap<String, PlaybookInfo>>,
    stall_fraction: f64,
}

impl<C: Clock> MockClient<C> {
    pub fn new(clock: C, seed: u64) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            sessions: Mutex::new(HashMap::new()),
            playbooks: Mutex::new(HashMap::new()),
            stall_fraction: 0.15,
        }
    }

    fn build_response(&self, id: &str, state: &SessionState) -> SessionResponse {
        if state.terminated {
            return self.terminal_blocked_response(id, state, "Session terminated by user");
        }

        let elapsed = self.clock.now().duration_since(state.created_at).as_secs_f64();
        let mut cumulative = 0.0;
        for stage in &state.stage_durations {
            if elapsed < cumulative + stage.secs {
                let frac = ((elapsed - cumulative) / stage.secs).clamp(0.0, 1.0);
                let progress =
                    stage.progress_start + (frac * (stage.progress_end - stage.progress_start) as f64) as u32;

                if state.will_fail && stage.name == "testing" {
                    return self.terminal_blocked_response(id, state, "Tests failed: existing tests broke after applying fix");
                }
                return self.working_response(id, state, stage.name, progress);
            }
            cumulative += stage.secs;
        }

        if state.will_fail {
            return self.terminal_blocked_response(id, state, "Tests failed: existing tests broke after applying fix");
        }
        self.completed_response(id, state)
    }

    fn structured_output(&self, state: &SessionState, stage: &str, progress: u32, error: Option<&str>) -> serde_json::Value {
        let stage_idx = ["analyzing", "fixing", "testing", "creating_pr", "completed", "failed"]
            .iter()
            .position(|s| *s == stage)
            .unwrap_or(0);

        let fix = if stage_idx >= 1 || stage == "failed" { Some(fix_approach(&state.category)) } else { None };
        let files: Vec<String> = if stage_idx >= 2 || stage == "failed" {
            file_templates(&state.category)
                .iter()
                .take(2)
                .map(|t| t.replace("{service}", &state.service.replace("-service", "")).replace("{cls}", &state.finding_id.replace('-', "")))
                .collect()
        } else {
            Vec::new()
        };
        let (tests_passed, tests_added) = if stage == "failed" {
            (Some(false), 0)
        } else if stage_idx >= 3 {
            (Some(true), self.rng.lock().gen_range(1..=5))
        } else {
            (None, 0)
        };
        let pr_url = if stage == "creating_pr" || stage == "completed" {
            let n: u32 = self.rng.lock().gen_range(10..=999);
            Some(format!("https://github.com/example-org/{}/pull/{n}", state.service))
        } else {
            None
        };
        let confidence = fix.map(|_| if state.category != "other" { "high" } else { "low" });

        serde_json::json!({
            "finding_id": state.finding_id,
            "status": stage,
            "progress_pct": progress,
            "current_step": format!("{} {}", stage, state.finding_id),
            "fix_approach": fix,
            "files_modified": files,
            "tests_passed": tests_passed,
            "tests_added": tests_added,
            "pr_url": pr_url,
            "error_message": error,
            "confidence": confidence,
        })
    }

    fn working_response(&self, id: &str, state: &SessionState, stage: &str, progress: u32) -> SessionResponse {
        SessionResponse {
            session_id: Some(id.to_string()),
            status_enum: "working".to_string(),
            structured_output: Some(self.structured_output(state, stage, progress, None)),
            pull_request: None,
        }
    }

    fn terminal_blocked_response(&self, id: &str, state: &SessionState, error: &str) -> SessionResponse {
        SessionResponse {
            session_id: Some(id.to_string()),
            status_enum: "blocked".to_string(),
            structured_output: Some(self.structured_output(state, "failed", 60, Some(error))),
            pull_request: None,
        }
    }

    fn completed_response(&self, id: &str, state: &SessionState) -> SessionResponse {
        let so = self.structured_output(state, "completed", 100, None);
        let pr_url = so.get("pr_url").and_then(|v| v.as_str()).map(|s| s.to_string());
        SessionResponse {
            session_id: Some(id.to_string()),
            status_enum: "finished".to_string(),
            structured_output: Some(so),
            pull_request: pr_url.map(|url| PullRequest { url }),
        }
    }
}

#[async_trait]
impl<C: Clock + 'static> RemoteClient for MockClient<C> {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<CreateSessionResponse, RemoteError> {
        if request.idempotent {
            let sessions = self.sessions.lock();
            if let Some((id, _)) = sessions.iter().find(|(_, s)| s.prompt == request.prompt) {
                return Ok(CreateSessionResponse {
                    session_id: id.clone(),
                    url: format!("https://app.example.ai/sessions/{id}"),
                    is_new_session: false,
                });
            }
        }

        let suffix: u32 = self.rng.lock().gen_range(0..=0xFFFF_FFFFu32);
        let session_id = format!("mock-{suffix:08x}");
        let will_fail = self.rng.lock().gen_bool(self.stall_fraction);
        let finding_id = extract_finding_id(&request.prompt);
        let category = extract_category(&request.prompt, &request.tags);
        let service = extract_service(&request.prompt, &request.tags);

        let stage_durations = STAGES
            .iter()
            .map(|s| StageDuration {
                name: s.name,
                secs: self.rng.lock().gen_range(s.min_secs..=s.max_secs),
                progress_start: s.progress_start,
                progress_end: s.progress_end,
            })
            .collect();

        self.sessions.lock().insert(
            session_id.clone(),
            SessionState {
                created_at: self.clock.now(),
                will_fail,
                stage_durations,
                prompt: request.prompt,
                finding_id,
                category,
                service,
                terminated: false,
            },
        );

        Ok(CreateSessionResponse {
            session_id: session_id.clone(),
            url: format!("https://app.example.ai/sessions/{session_id}"),
            is_new_session: true,
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionResponse, RemoteError> {
        let sessions = self.sessions.lock();
        let state = sessions
            .get(session_id)
            .ok_or_else(|| RemoteError::Api { status: 404, message: format!("no such session: {session_id}") })?;
        Ok(self.build_response(session_id, state))
    }

    async fn list_sessions(
        &self,
        tags: Option<&[String]>,
        limit: u32,
        offset: u32,
    ) -> Result<SessionListResponse, RemoteError> {
        let _ = tags; // mock doesn't track tags per-session; kept for trait parity
        let sessions = self.sessions.lock();
        let mut ids: Vec<&String> = sessions.keys().collect();
        ids.sort();
        let total = ids.len() as u64;
        let page: Vec<SessionResponse> = ids
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|id| sessions.get(id).map(|state| self.build_response(id, state)))
            .collect();
        Ok(SessionListResponse { sessions: page, total })
    }

    async fn send_message(&self, _session_id: &str, _text: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn terminate_session(&self, session_id: &str) -> Result<(), RemoteError> {
        if let Some(state) = self.sessions.lock().get_mut(session_id) {
            state.terminated = true;
        }
        Ok(())
    }

    async fn terminate_session_best_effort(&self, session_id: &str) {
        let _ = self.terminate_session(session_id).await;
    }

    async fn create_playbook(&self, title: &str, body: &str) -> Result<PlaybookInfo, RemoteError> {
        let _ = body;
        let suffix: u32 = self.rng.lock().gen_range(0..=0xFFFF_FFFFu32);
        let playbook_id = format!("pb-mock-{suffix:08x}");
        let info = PlaybookInfo { playbook_id: playbook_id.clone(), title: title.to_string() };
        self.playbooks.lock().insert(playbook_id, info.clone());
        Ok(info)
    }

    async fn list_playbooks(&self) -> Result<Vec<PlaybookInfo>, RemoteError> {
        Ok(self.playbooks.lock().values().cloned().collect())
    }

    fn reset_circuit_breaker(&self) {}

    async fn close(&self) {}
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
