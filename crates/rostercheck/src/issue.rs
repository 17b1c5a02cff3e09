//! Issue types reported by the validation engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category of a detected issue.
///
/// A closed set so downstream consumers get exhaustiveness checking when
/// branching on category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// A required column is missing from the dataset.
    Schema,
    /// A required field is null/blank in a row.
    RequiredField,
    /// A numeric cell could not be parsed.
    InvalidNumeric,
    /// A negative value in a non-negative domain.
    NegativeValue,
    /// A date cell the parser could not interpret.
    InvalidDate,
    /// Start date after end date.
    #[serde(rename = "temporal_logic_error")]
    TemporalLogic,
    /// A date later than the as-of reference date.
    FutureDate,
    /// A same-row count relationship violated (partial > total).
    LogicError,
    /// A dependent-table identity missing from the base table.
    OrphanedRecord,
    /// A base-table identity with no rows in a dependent dataset.
    MissingCoverage,
    /// A key value occurring more than once where uniqueness is required.
    DuplicateValue,
    /// A metric outside its configured bounds.
    Threshold,
    /// A declared cross-metric relationship violated.
    MetricConsistency,
    /// A designated must-exist metric absent from the metric map.
    MissingMetric,
    /// A metric deviating from its historical baseline.
    HistoricalAnomaly,
}

impl IssueCategory {
    /// Stable wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Schema => "schema",
            IssueCategory::RequiredField => "required_field",
            IssueCategory::InvalidNumeric => "invalid_numeric",
            IssueCategory::NegativeValue => "negative_value",
            IssueCategory::InvalidDate => "invalid_date",
            IssueCategory::TemporalLogic => "temporal_logic_error",
            IssueCategory::FutureDate => "future_date",
            IssueCategory::LogicError => "logic_error",
            IssueCategory::OrphanedRecord => "orphaned_record",
            IssueCategory::MissingCoverage => "missing_coverage",
            IssueCategory::DuplicateValue => "duplicate_value",
            IssueCategory::Threshold => "threshold",
            IssueCategory::MetricConsistency => "metric_consistency",
            IssueCategory::MissingMetric => "missing_metric",
            IssueCategory::HistoricalAnomaly => "historical_anomaly",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::Schema => "Missing Column",
            IssueCategory::RequiredField => "Missing Required Field",
            IssueCategory::InvalidNumeric => "Invalid Number",
            IssueCategory::NegativeValue => "Negative Value",
            IssueCategory::InvalidDate => "Invalid Date",
            IssueCategory::TemporalLogic => "Date Order Violation",
            IssueCategory::FutureDate => "Future Date",
            IssueCategory::LogicError => "Count Logic Violation",
            IssueCategory::OrphanedRecord => "Orphaned Record",
            IssueCategory::MissingCoverage => "Missing Coverage",
            IssueCategory::DuplicateValue => "Duplicate Key",
            IssueCategory::Threshold => "Threshold Violation",
            IssueCategory::MetricConsistency => "Metric Inconsistency",
            IssueCategory::MissingMetric => "Missing Metric",
            IssueCategory::HistoricalAnomaly => "Historical Anomaly",
        }
    }
}

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Notable but non-blocking.
    Warning,
    /// Blocks the overall pass.
    Critical,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }

    /// Stable wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// One reported data defect.
///
/// Created by exactly one checker, consumed only by result builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What kind of defect this is.
    pub category: IssueCategory,
    /// Severity level.
    pub severity: Severity,
    /// Zero-based row index, when the issue points at one row.
    #[serde(rename = "row_ref", skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Offending field, when the issue points at one column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Observed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
    /// What was expected instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Short remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Free-form supporting detail (statistics, affected keys, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(category: IssueCategory, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            row: None,
            field: None,
            observed: None,
            expected: None,
            message: message.into(),
            remediation: None,
            metadata: Map::new(),
        }
    }

    /// Set the row index.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Set the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the observed value.
    pub fn with_observed(mut self, observed: impl Into<Value>) -> Self {
        self.observed = Some(observed.into());
        self
    }

    /// Set the expected description.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the remediation hint.
    pub fn with_remediation(mut self, hint: impl Into<String>) -> Self {
        self.remediation = Some(hint.into());
        self
    }

    /// Attach one metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Per-severity counts for one issue list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl IssueSummary {
    /// Count issues by severity in a single pass.
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            summary.total += 1;
            match issue.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

/// The aggregate outcome of one validation pass over one surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All issues found, critical first.
    pub issues: Vec<ValidationIssue>,
    /// Per-severity counts.
    pub summary: IssueSummary,
    /// True iff zero critical issues exist.
    pub passed: bool,
}

impl ValidationResult {
    /// Build a result from an issue list, sorting critical issues first.
    pub fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        let summary = IssueSummary::from_issues(&issues);
        let passed = summary.critical == 0;
        Self {
            issues,
            summary,
            passed,
        }
    }
}
