// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Playbook assignment: map each finding's category to a playbook file,
//! upload whatever isn't already registered remotely, and chunk
//! prioritized findings into waves.

use std::collections::HashMap;
use std::path::Path;
use triage_client::RemoteClient;
use triage_core::finding::{Finding, FindingCategory};
use triage_core::session::RemediationSession;
use triage_core::wave::Wave;

const PLAYBOOKS_DIR: &str = "playbooks";

const PLAYBOOK_FILES: &[&str] = &[
    "dependency_vulnerability.devin.md",
    "sql_injection.devin.md",
    "hardcoded_secret.devin.md",
    "pii_logging.devin.md",
    "missing_encryption.devin.md",
    "access_logging.devin.md",
];

const FALLBACK_PLAYBOOK_FILE: &str = "dependency_vulnerability.devin.md";

fn playbook_file(category: FindingCategory) -> &'static str {
    match category {
        FindingCategory::DependencyVulnerability => "dependency_vulnerability.devin.md",
        FindingCategory::SqlInjection => "sql_injection.devin.md",
        FindingCategory::HardcodedSecret => "hardcoded_secret.devin.md",
        FindingCategory::PiiLogging => "pii_logging.devin.md",
        FindingCategory::MissingEncryption => "missing_encryption.devin.md",
        FindingCategory::AccessLogging => "access_logging.devin.md",
        FindingCategory::Xss | FindingCategory::PathTraversal | FindingCategory::Other => FALLBACK_PLAYBOOK_FILE,
    }
}

/// Path (relative to the working directory) of the playbook covering
/// `category`, falling back to the dependency-vulnerability playbook for
/// categories with no dedicated one.
pub fn get_playbook_path(category: FindingCategory) -> String {
    format!("{PLAYBOOKS_DIR}/{}", playbook_file(category))
}

fn title_of(file_name: &str) -> &str {
    file_name.trim_end_matches(".devin.md")
}

/// List remote playbooks, upload any of the six category playbooks not
/// already present (read from `playbooks_dir` on disk), and return a map
/// from playbook path (as returned by [`get_playbook_path`]) to remote
/// playbook id.
pub async fn ensure_playbooks_uploaded(
    client: &dyn RemoteClient,
    playbooks_dir: &Path,
) -> anyhow::Result<HashMap<String, String>> {
    let existing = client.list_playbooks().await?;
    let existing_by_title: HashMap<String, String> =
        existing.into_iter().map(|p| (p.title, p.playbook_id)).collect();

    let mut by_path = HashMap::new();
    for file_name in PLAYBOOK_FILES {
        let path_key = format!("{PLAYBOOKS_DIR}/{file_name}");
        let title = title_of(file_name);

        if let Some(id) = existing_by_title.get(title) {
            by_path.insert(path_key, id.clone());
            continue;
        }

        let file_path = playbooks_dir.join(file_name);
        let body = std::fs::read_to_string(&file_path)
            .map_err(|e| anyhow::anyhow!("reading playbook {}: {e}", file_path.display()))?;
        let info = client.create_playbook(title, &body).await?;
        by_path.insert(path_key, info.playbook_id);
    }

    Ok(by_path)
}

/// Assign each session's `playbook_id` from its finding's category,
/// falling back to an arbitrary uploaded playbook (with a warning) if the
/// exact match isn't in `playbook_ids`.
pub fn assign_playbooks(waves: &mut [Wave], playbook_ids: &HashMap<String, String>) {
    let fallback = playbook_ids.values().next().cloned();

    for wave in waves {
        for session in &mut wave.sessions {
            let path = get_playbook_path(session.finding.category);
            match playbook_ids.get(&path) {
                Some(id) => session.playbook_id = id.clone(),
                None => {
                    tracing::warn!(
                        category = %session.finding.category,
                        path = %path,
                        "no uploaded playbook for category, using fallback"
                    );
                    if let Some(id) = &fallback {
                        session.playbook_id = id.clone();
                    }
                }
            }
        }
    }
}

/// Chunk prioritized findings into waves of at most `wave_size`,
/// 1-indexed. Each finding becomes one pending session with an empty
/// `playbook_id`, filled in afterward by [`assign_playbooks`].
pub fn create_waves(findings: Vec<Finding>, wave_size: u32) -> Vec<Wave> {
    let chunk_size = wave_size.max(1) as usize;
    findings
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, chunk)| {
            let wave_number = i as u32 + 1;
            let sessions =
                chunk.iter().cloned().map(|finding| RemediationSession::new(finding, String::new(), wave_number)).collect();
            Wave::new(wave_number, sessions)
        })
        .collect()
}

#[cfg(test)]
#[path = "playbooks_tests.rs"]
mod tests;
