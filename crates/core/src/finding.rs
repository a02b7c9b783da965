// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Findings: the immutable input to the orchestrator.

use serde::{Deserialize, Serialize};

/// Severity of a security finding, ordered least to most severe for
/// `PartialOrd` (low < medium < high < critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

crate::simple_display! {
    Severity {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

/// Category of a security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    DependencyVulnerability,
    SqlInjection,
    HardcodedSecret,
    PiiLogging,
    MissingEncryption,
    AccessLogging,
    Xss,
    PathTraversal,
    Other,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::DependencyVulnerability => "dependency_vulnerability",
            FindingCategory::SqlInjection => "sql_injection",
            FindingCategory::HardcodedSecret => "hardcoded_secret",
            FindingCategory::PiiLogging => "pii_logging",
            FindingCategory::MissingEncryption => "missing_encryption",
            FindingCategory::AccessLogging => "access_logging",
            FindingCategory::Xss => "xss",
            FindingCategory::PathTraversal => "path_traversal",
            FindingCategory::Other => "other",
        }
    }
}

crate::simple_display! {
    FindingCategory {
        DependencyVulnerability => "dependency_vulnerability",
        SqlInjection => "sql_injection",
        HardcodedSecret => "hardcoded_secret",
        PiiLogging => "pii_logging",
        MissingEncryption => "missing_encryption",
        AccessLogging => "access_logging",
        Xss => "xss",
        PathTraversal => "path_traversal",
        Other => "other",
    }
}

/// An immutable security finding ingested from an upstream scanner.
///
/// Identity is `finding_id`. `priority_score` is assigned by the external
/// prioritizer and carried through unchanged by everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: String,
    pub scanner: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub service_name: String,
    pub repo_url: String,
    pub file_path: String,
    #[serde(default)]
    pub line_number: Option<i64>,
    #[serde(default)]
    pub cwe_id: Option<String>,
    #[serde(default)]
    pub dependency_name: Option<String>,
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub fixed_version: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub priority_score: f64,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct FindingBuilder => Finding {
        into {
            finding_id: String = "FIND-0001",
            scanner: String = "test-scanner",
            title: String = "Test finding",
            description: String = "A test finding",
            service_name: String = "test-service",
            repo_url: String = "https://example.com/test-service",
            file_path: String = "src/main.rs",
        }
        set {
            category: FindingCategory = FindingCategory::SqlInjection,
            severity: Severity = Severity::High,
            priority_score: f64 = 0.0,
        }
        option {
            line_number: i64 = None,
            cwe_id: String = None,
            dependency_name: String = None,
            current_version: String = None,
            fixed_version: String = None,
            language: String = None,
        }
    }
}
