// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;
use triage_core::finding::{FindingCategory, Severity};

fn write_csv(rows: &str) -> NamedTempFile {
    let header = "finding_id,scanner,category,severity,title,description,service_name,repo_url,file_path,line_number,cwe_id,dependency_name,current_version,fixed_version,language\n";
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(header.as_bytes()).expect("write header");
    file.write_all(rows.as_bytes()).expect("write rows");
    file
}

#[test]
fn parses_a_well_formed_row() {
    let file = write_csv(
        "FIND-0001,semgrep,sql_injection,high,Bad query,desc,payment-service,https://repo,src/db.rs,42,,,,,rust\n",
    );
    let findings = parse_findings_csv(file.path()).expect("parse");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_id, "FIND-0001");
    assert_eq!(findings[0].category, FindingCategory::SqlInjection);
    assert_eq!(findings[0].severity, Severity::High);
    assert_eq!(findings[0].line_number, Some(42));
    assert_eq!(findings[0].language.as_deref(), Some("rust"));
}

#[test]
fn empty_optional_fields_become_none() {
    let file =
        write_csv("FIND-0002,semgrep,sql_injection,high,Bad query,desc,payment-service,https://repo,src/db.rs,,,,,,\n");
    let findings = parse_findings_csv(file.path()).expect("parse");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line_number, None);
    assert_eq!(findings[0].cwe_id, None);
    assert_eq!(findings[0].language, None);
}

#[test]
fn unrecognized_category_or_severity_skips_the_row_without_failing() {
    let file = write_csv(concat!(
        "FIND-0003,semgrep,not_a_category,high,t,d,svc,https://repo,f.rs,,,,,,\n",
        "FIND-0004,semgrep,sql_injection,not_a_severity,t,d,svc,https://repo,f.rs,,,,,,\n",
        "FIND-0005,semgrep,sql_injection,high,t,d,svc,https://repo,f.rs,,,,,,\n",
    ));
    let findings = parse_findings_csv(file.path()).expect("parse");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_id, "FIND-0005");
}

fn finding(id: &str, service: &str, file_path: &str, line: Option<i64>, category: FindingCategory, severity: Severity) -> Finding {
    let mut builder =
        Finding::builder().finding_id(id).service_name(service).file_path(file_path).category(category).severity(severity);
    if let Some(l) = line {
        builder = builder.line_number(l);
    }
    builder.build()
}

#[test]
fn normalize_dedupes_by_service_file_line_category_keeping_higher_severity() {
    let findings = vec![
        finding("FIND-1", "payment-service", "a.rs", Some(1), FindingCategory::SqlInjection, Severity::Low),
        finding("FIND-2", "payment-service", "a.rs", Some(1), FindingCategory::SqlInjection, Severity::High),
        finding("FIND-3", "payment-service", "b.rs", Some(2), FindingCategory::SqlInjection, Severity::Medium),
    ];
    let normalized = normalize_findings(findings);
    assert_eq!(normalized.len(), 2);
    assert_eq!(normalized[0].finding_id, "FIND-2");
    assert_eq!(normalized[1].finding_id, "FIND-3");
}

#[test]
fn normalize_keeps_the_first_one_encountered_on_a_severity_tie() {
    let findings = vec![
        finding("FIND-1", "payment-service", "a.rs", Some(1), FindingCategory::SqlInjection, Severity::High),
        finding("FIND-2", "payment-service", "a.rs", Some(1), FindingCategory::SqlInjection, Severity::High),
    ];
    let normalized = normalize_findings(findings);
    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].finding_id, "FIND-1");
}

#[test]
fn prioritize_scores_and_sorts_descending() {
    let findings = vec![
        finding("LOW", "catalog-service", "a.rs", None, FindingCategory::Other, Severity::Low),
        finding("HIGH", "payment-service", "b.rs", None, FindingCategory::SqlInjection, Severity::Critical),
    ];
    let prioritized = prioritize_findings(findings);
    assert_eq!(prioritized[0].finding_id, "HIGH");
    assert!(prioritized[0].priority_score > prioritized[1].priority_score);
    assert_eq!(prioritized[0].priority_score, 40.0 + 25.0 + 20.0);
}
