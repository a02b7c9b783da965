// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of [`RemoteClient`] against the remote agent API.
//! Retry + jitter + `Retry-After` honoring + circuit breaker integration,
//! per §4.4's request envelope.

use crate::breaker::CircuitBreaker;
use crate::interpret::SessionResponse;
use crate::normalize::normalize_list;
use crate::remote::{CreateSessionRequest, CreateSessionResponse, PlaybookInfo, RemoteClient, SessionListResponse};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use triage_core::clock::Clock;
use triage_core::error::RemoteError;

pub struct LiveClient<C: Clock> {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    breaker: Arc<CircuitBreaker<C>>,
    max_retries: u32,
    retry_jitter_max_seconds: f64,
}

impl<C: Clock + 'static> LiveClient<C> {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        breaker: Arc<CircuitBreaker<C>>,
        max_retries: u32,
        retry_jitter_max_seconds: f64,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            breaker,
            max_retries,
            retry_jitter_max_seconds,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn jitter(&self) -> Duration {
        let max_ms = (self.retry_jitter_max_seconds * 1000.0).max(0.0) as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Run one request through the breaker, retrying transient failures
    /// with exponential backoff + jitter, honoring `Retry-After` when
    /// present (capped at 60s).
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, RemoteError> {
        self.breaker.check()?;

        let mut last_status: u16 = 0;
        for attempt in 0..=self.max_retries {
            let mut builder = self
                .http
                .request(method.clone(), self.url(path))
                .bearer_auth(&self.api_key)
                .header("Content-Type", "application/json");
            if let Some(b) = &body {
                builder = builder.json(b);
            }

            let response = match builder.send().await {
                Ok(r) => r,
                Err(e) => {
                    if attempt == self.max_retries {
                        self.breaker.record_failure();
                        return Err(RemoteError::Network(e.to_string()));
                    }
                    tokio::time::sleep(self.backoff_delay(attempt, None)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                self.breaker.record_success();
                return response.json().await.map_err(|e| RemoteError::Network(e.to_string()));
            }

            last_status = status.as_u16();
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if !retryable {
                self.breaker.record_failure();
                let message = response.text().await.unwrap_or_default();
                return Err(RemoteError::Api { status: last_status, message });
            }

            if attempt == self.max_retries {
                self.breaker.record_failure();
                let message = response.text().await.unwrap_or_default();
                return Err(RemoteError::Api { status: last_status, message });
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| Duration::from_secs(s.min(60)));
            tokio::time::sleep(self.backoff_delay(attempt, retry_after)).await;
        }

        self.breaker.record_failure();
        Err(RemoteError::Api { status: last_status, message: "retries exhausted".to_string() })
    }

    fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let base = retry_after.unwrap_or_else(|| Duration::from_secs(2u64.saturating_pow(attempt)));
        base + self.jitter()
    }
}

#[async_trait]
impl<C: Clock + 'static> RemoteClient for LiveClient<C> {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<CreateSessionResponse, RemoteError> {
        let body = serde_json::json!({
            "prompt": request.prompt,
            "playbook_id": request.playbook_id,
            "tags": request.tags,
            "structured_output_schema": request.structured_output_schema,
            "max_acu_limit": request.max_acu_limit,
            "idempotent": request.idempotent,
        });
        let value = self.request_json(Method::POST, "/sessions", Some(body)).await?;
        serde_json::from_value(value).map_err(|e| RemoteError::Network(e.to_string()))
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionResponse, RemoteError> {
        let value = self.request_json(Method::GET, &format!("/sessions/{session_id}"), None).await?;
        serde_json::from_value(value).map_err(|e| RemoteError::Network(e.to_string()))
    }

    async fn list_sessions(
        &self,
        tags: Option<&[String]>,
        limit: u32,
        offset: u32,
    ) -> Result<SessionListResponse, RemoteError> {
        let tags_csv = tags.map(|t| t.join(",")).unwrap_or_default();
        let path = format!("/sessions?tags={tags_csv}&limit={limit}&offset={offset}");
        let value = self.request_json(Method::GET, &path, None).await?;
        let total = crate::normalize::envelope_total(&value).unwrap_or(0);
        let sessions: Vec<SessionResponse> = normalize_list(&value, "sessions");
        let total = if total == 0 { sessions.len() as u64 } else { total };
        Ok(SessionListResponse { sessions, total })
    }

    async fn send_message(&self, session_id: &str, text: &str) -> Result<(), RemoteError> {
        let body = serde_json::json!({ "message": text });
        self.request_json(Method::POST, &format!("/sessions/{session_id}/message"), Some(body)).await?;
        Ok(())
    }

    async fn terminate_session(&self, session_id: &str) -> Result<(), RemoteError> {
        self.request_json(Method::DELETE, &format!("/sessions/{session_id}"), None).await?;
        Ok(())
    }

    async fn terminate_session_best_effort(&self, session_id: &str) {
        match self.request_json(Method::DELETE, &format!("/sessions/{session_id}"), None).await {
            Ok(_) => {}
            Err(RemoteError::Api { status, .. }) if status == 404 => {
                self.breaker.unrecord_failure();
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "best-effort terminate failed");
            }
        }
    }

    async fn create_playbook(&self, title: &str, body: &str) -> Result<PlaybookInfo, RemoteError> {
        let payload = serde_json::json!({ "title": title, "body": body });
        let value = self.request_json(Method::POST, "/playbooks", Some(payload)).await?;
        serde_json::from_value(value).map_err(|e| RemoteError::Network(e.to_string()))
    }

    async fn list_playbooks(&self) -> Result<Vec<PlaybookInfo>, RemoteError> {
        let value = self.request_json(Method::GET, "/playbooks", None).await?;
        Ok(normalize_list(&value, "playbooks"))
    }

    fn reset_circuit_breaker(&self) {
        self.breaker.reset();
    }

    async fn close(&self) {}
}

#[cfg(test)]
#[path = "live_tests.rs"]
mod tests;
