// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CSV ingestion: parse a findings export into [`Finding`]s, drop
//! duplicates, and assign each a priority score for wave ordering.

use serde::Deserialize;
use std::path::Path;
use triage_core::finding::{Finding, FindingCategory, Severity};

#[derive(Debug, Deserialize)]
struct RawRow {
    finding_id: String,
    scanner: String,
    category: String,
    severity: String,
    title: String,
    description: String,
    service_name: String,
    repo_url: String,
    file_path: String,
    #[serde(default)]
    line_number: String,
    #[serde(default)]
    cwe_id: String,
    #[serde(default)]
    dependency_name: String,
    #[serde(default)]
    current_version: String,
    #[serde(default)]
    fixed_version: String,
    #[serde(default)]
    language: String,
}

fn parse_category(s: &str) -> Option<FindingCategory> {
    match s.trim() {
        "dependency_vulnerability" => Some(FindingCategory::DependencyVulnerability),
        "sql_injection" => Some(FindingCategory::SqlInjection),
        "hardcoded_secret" => Some(FindingCategory::HardcodedSecret),
        "pii_logging" => Some(FindingCategory::PiiLogging),
        "missing_encryption" => Some(FindingCategory::MissingEncryption),
        "access_logging" => Some(FindingCategory::AccessLogging),
        "xss" => Some(FindingCategory::Xss),
        "path_traversal" => Some(FindingCategory::PathTraversal),
        "other" => Some(FindingCategory::Other),
        _ => None,
    }
}

fn parse_severity(s: &str) -> Option<Severity> {
    match s.trim() {
        "critical" => Some(Severity::Critical),
        "high" => Some(Severity::High),
        "medium" => Some(Severity::Medium),
        "low" => Some(Severity::Low),
        _ => None,
    }
}

fn opt(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn row_to_finding(row: RawRow) -> Option<Finding> {
    let category = match parse_category(&row.category) {
        Some(c) => c,
        None => {
            tracing::warn!(finding_id = %row.finding_id, category = %row.category, "unrecognized category, skipping row");
            return None;
        }
    };
    let severity = match parse_severity(&row.severity) {
        Some(s) => s,
        None => {
            tracing::warn!(finding_id = %row.finding_id, severity = %row.severity, "unrecognized severity, skipping row");
            return None;
        }
    };

    Some(Finding {
        finding_id: row.finding_id,
        scanner: row.scanner,
        category,
        severity,
        title: row.title,
        description: row.description,
        service_name: row.service_name,
        repo_url: row.repo_url,
        file_path: row.file_path,
        line_number: row.line_number.trim().parse().ok(),
        cwe_id: opt(&row.cwe_id),
        dependency_name: opt(&row.dependency_name),
        current_version: opt(&row.current_version),
        fixed_version: opt(&row.fixed_version),
        language: opt(&row.language),
        priority_score: 0.0,
    })
}

/// Parse a findings CSV into `Finding`s. A row with an unrecognized
/// `category`/`severity` is logged and skipped rather than failing the
/// whole ingest; a structurally malformed row (wrong column count, bad
/// encoding) is likewise skipped.
pub fn parse_findings_csv(path: &Path) -> anyhow::Result<Vec<Finding>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut findings = Vec::new();
    for result in reader.deserialize::<RawRow>() {
        match result {
            Ok(row) => {
                if let Some(finding) = row_to_finding(row) {
                    findings.push(finding);
                }
            }
            Err(e) => tracing::warn!(error = %e, "malformed CSV row, skipping"),
        }
    }
    Ok(findings)
}

/// Drop duplicate findings keyed by `(service_name, file_path,
/// line_number, category)`, keeping the higher-severity one and, on a
/// tie, the one encountered first. Preserves the original relative order
/// of the survivors.
pub fn normalize_findings(findings: Vec<Finding>) -> Vec<Finding> {
    use std::collections::HashMap;

    let mut best: HashMap<(String, String, Option<i64>, FindingCategory), usize> = HashMap::new();
    for (i, finding) in findings.iter().enumerate() {
        let key = (finding.service_name.clone(), finding.file_path.clone(), finding.line_number, finding.category);
        match best.get(&key) {
            Some(&existing) if findings[existing].severity >= finding.severity => {}
            _ => {
                best.insert(key, i);
            }
        }
    }

    let mut kept: Vec<usize> = best.into_values().collect();
    kept.sort_unstable();

    let removed = findings.len() - kept.len();
    if removed > 0 {
        tracing::info!(removed, "deduplicated findings");
    }

    kept.into_iter().map(|i| findings[i].clone()).collect()
}

fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 40.0,
        Severity::High => 30.0,
        Severity::Medium => 15.0,
        Severity::Low => 5.0,
    }
}

fn category_weight(category: FindingCategory) -> f64 {
    match category {
        FindingCategory::SqlInjection | FindingCategory::HardcodedSecret => 25.0,
        FindingCategory::DependencyVulnerability | FindingCategory::Xss | FindingCategory::PathTraversal => 20.0,
        FindingCategory::PiiLogging | FindingCategory::MissingEncryption => 15.0,
        FindingCategory::AccessLogging | FindingCategory::Other => 10.0,
    }
}

fn service_weight(service_name: &str) -> f64 {
    match service_name {
        "payment-service" | "auth-service" => 20.0,
        "user-service" => 15.0,
        "catalog-service" => 10.0,
        _ => 10.0,
    }
}

/// Assign `priority_score = severity_weight + category_weight +
/// service_weight` to every finding, then return them sorted descending
/// by that score.
pub fn prioritize_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    for finding in &mut findings {
        finding.priority_score =
            severity_weight(finding.severity) + category_weight(finding.category) + service_weight(&finding.service_name);
    }
    findings.sort_by(|a, b| b.priority_score.partial_cmp(&a.priority_score).unwrap_or(std::cmp::Ordering::Equal));
    findings
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
