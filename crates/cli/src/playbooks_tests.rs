// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use triage_client::MockClient;
use triage_core::clock::FakeClock;
use triage_core::finding::{Finding, Severity};

fn finding(id: &str, category: FindingCategory) -> Finding {
    Finding::builder().finding_id(id).category(category).severity(Severity::High).build()
}

fn write_playbooks(dir: &Path) {
    for file_name in PLAYBOOK_FILES {
        std::fs::write(dir.join(file_name), format!("# {}\n\nDo the thing.\n", title_of(file_name))).expect("write playbook");
    }
}

#[test]
fn get_playbook_path_falls_back_for_categories_with_no_dedicated_file() {
    assert_eq!(get_playbook_path(FindingCategory::Xss), get_playbook_path(FindingCategory::DependencyVulnerability));
    assert_eq!(get_playbook_path(FindingCategory::SqlInjection), "playbooks/sql_injection.devin.md");
}

#[tokio::test]
async fn ensure_playbooks_uploaded_creates_every_missing_playbook_exactly_once() {
    let dir = tempdir().expect("tempdir");
    write_playbooks(dir.path());

    let clock = FakeClock::new();
    let client = MockClient::new(clock, 1);

    let ids = ensure_playbooks_uploaded(&client, dir.path()).await.expect("upload");
    assert_eq!(ids.len(), PLAYBOOK_FILES.len());

    let listed = client.list_playbooks().await.expect("list");
    assert_eq!(listed.len(), PLAYBOOK_FILES.len());

    // A second call against the same client must not create duplicates.
    let ids_again = ensure_playbooks_uploaded(&client, dir.path()).await.expect("upload again");
    assert_eq!(ids_again, ids);
    let listed_again = client.list_playbooks().await.expect("list again");
    assert_eq!(listed_again.len(), PLAYBOOK_FILES.len());
}

#[test]
fn assign_playbooks_sets_each_session_from_its_finding_category() {
    let mut waves = vec![Wave::new(
        1,
        vec![
            RemediationSession::new(finding("F1", FindingCategory::SqlInjection), String::new(), 1),
            RemediationSession::new(finding("F2", FindingCategory::Xss), String::new(), 1),
        ],
    )];

    let mut playbook_ids = HashMap::new();
    playbook_ids.insert("playbooks/sql_injection.devin.md".to_string(), "pb-sql".to_string());
    playbook_ids.insert("playbooks/dependency_vulnerability.devin.md".to_string(), "pb-dep".to_string());

    assign_playbooks(&mut waves, &playbook_ids);

    assert_eq!(waves[0].sessions[0].playbook_id, "pb-sql");
    assert_eq!(waves[0].sessions[1].playbook_id, "pb-dep");
}

#[test]
fn assign_playbooks_falls_back_when_no_exact_match_is_uploaded() {
    let mut waves =
        vec![Wave::new(1, vec![RemediationSession::new(finding("F1", FindingCategory::SqlInjection), String::new(), 1)])];

    let mut playbook_ids = HashMap::new();
    playbook_ids.insert("playbooks/pii_logging.devin.md".to_string(), "pb-pii".to_string());

    assign_playbooks(&mut waves, &playbook_ids);

    assert_eq!(waves[0].sessions[0].playbook_id, "pb-pii");
}

#[test]
fn create_waves_chunks_by_wave_size_and_numbers_from_one() {
    let findings = vec![
        finding("F1", FindingCategory::SqlInjection),
        finding("F2", FindingCategory::SqlInjection),
        finding("F3", FindingCategory::SqlInjection),
    ];
    let waves = create_waves(findings, 2);
    assert_eq!(waves.len(), 2);
    assert_eq!(waves[0].wave_number, 1);
    assert_eq!(waves[0].sessions.len(), 2);
    assert_eq!(waves[1].wave_number, 2);
    assert_eq!(waves[1].sessions.len(), 1);
    assert!(waves[0].sessions.iter().all(|s| s.playbook_id.is_empty()));
}
