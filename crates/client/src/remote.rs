// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability interface (C4, §9 "client polymorphism"): the 10
//! operations `LiveClient` and `MockClient` both implement, so call sites
//! are written once against `dyn RemoteClient`.

use crate::interpret::SessionResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use triage_core::error::RemoteError;

#[derive(Debug, Clone, Default)]
pub struct CreateSessionRequest {
    pub prompt: String,
    pub playbook_id: Option<String>,
    pub tags: Vec<String>,
    pub structured_output_schema: Option<serde_json::Value>,
    pub max_acu_limit: Option<u32>,
    pub idempotent: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub url: String,
    pub is_new_session: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybookInfo {
    pub playbook_id: String,
    pub title: String,
}

/// Ten operations of §4.4. Both `LiveClient` and `MockClient` implement
/// this; `triage-engine` is written only against `dyn RemoteClient` (or
/// `Arc<dyn RemoteClient>`), never against a concrete client type.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<CreateSessionResponse, RemoteError>;

    async fn get_session(&self, session_id: &str) -> Result<SessionResponse, RemoteError>;

    async fn list_sessions(
        &self,
        tags: Option<&[String]>,
        limit: u32,
        offset: u32,
    ) -> Result<SessionListResponse, RemoteError>;

    async fn send_message(&self, session_id: &str, text: &str) -> Result<(), RemoteError>;

    async fn terminate_session(&self, session_id: &str) -> Result<(), RemoteError>;

    /// Same as `terminate_session` but a 404 is treated as success (the
    /// session is already gone) and un-records the breaker failure that
    /// `terminate_session` would otherwise have recorded for it.
    async fn terminate_session_best_effort(&self, session_id: &str);

    async fn create_playbook(&self, title: &str, body: &str) -> Result<PlaybookInfo, RemoteError>;

    async fn list_playbooks(&self) -> Result<Vec<PlaybookInfo>, RemoteError>;

    fn reset_circuit_breaker(&self);

    async fn close(&self);
}
