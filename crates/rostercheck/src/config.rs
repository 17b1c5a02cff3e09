//! Engine configuration.
//!
//! Loaded once by the caller (from disk or built in code) and injected at
//! engine construction; no threshold or column name is hard-coded inside the
//! checks. Every struct carries a `Default` matching the conventional HR
//! dataset layout so tests and simple callers can start from
//! `EngineConfig::default()` and override fields.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::issue::Severity;

/// Column names for the employee roster dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    /// Identity key shared with dependent datasets.
    pub id: String,
    /// Date the employee entered service.
    pub entrance_date: String,
    /// Date the employee left service (blank while employed).
    pub stop_date: String,
    /// Employment classification (permanent, contract, ...).
    pub classification: String,
    /// Position / role title.
    pub position: String,
    /// Organizational group assignment.
    pub group: String,
    /// Columns that must exist and be non-null in every row.
    pub required: Vec<String>,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            id: "employee_id".into(),
            entrance_date: "entrance_date".into(),
            stop_date: "stop_date".into(),
            classification: "classification".into(),
            position: "position".into(),
            group: "group".into(),
            required: vec!["employee_id".into(), "entrance_date".into()],
        }
    }
}

/// Column names for the attendance log dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceColumns {
    /// Identity key back to the roster.
    pub id: String,
    /// Days the employee was actually present in the period.
    pub days_present: String,
    /// Days the employee was scheduled to work in the period.
    pub days_scheduled: String,
    /// Columns that must exist and be non-null in every row.
    pub required: Vec<String>,
    /// Columns holding non-negative numbers.
    pub numeric: Vec<String>,
}

impl Default for AttendanceColumns {
    fn default() -> Self {
        Self {
            id: "employee_id".into(),
            days_present: "days_present".into(),
            days_scheduled: "days_scheduled".into(),
            required: vec!["employee_id".into(), "days_scheduled".into()],
            numeric: vec!["days_present".into(), "days_scheduled".into()],
        }
    }
}

/// Acceptable range for one named metric.
///
/// `[min, max]` is the hard range (violation is critical); the optional
/// warning bounds carve a tighter band inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricThresholdRule {
    /// Metric this rule applies to.
    pub metric: String,
    /// Hard lower bound.
    pub min: f64,
    /// Hard upper bound.
    pub max: f64,
    /// Tighter lower bound; values in `[min, warning_min)` warn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_min: Option<f64>,
    /// Tighter upper bound; values in `(warning_max, max]` warn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_max: Option<f64>,
}

impl MetricThresholdRule {
    /// Check the `min <= warning band <= max` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(EngineError::Config(format!(
                "threshold rule for '{}': min {} exceeds max {}",
                self.metric, self.min, self.max
            )));
        }
        if let Some(wmin) = self.warning_min {
            if wmin < self.min || wmin > self.max {
                return Err(EngineError::Config(format!(
                    "threshold rule for '{}': warning_min {} outside [{}, {}]",
                    self.metric, wmin, self.min, self.max
                )));
            }
        }
        if let Some(wmax) = self.warning_max {
            if wmax < self.min || wmax > self.max {
                return Err(EngineError::Config(format!(
                    "threshold rule for '{}': warning_max {} outside [{}, {}]",
                    self.metric, wmax, self.min, self.max
                )));
            }
        }
        if let (Some(wmin), Some(wmax)) = (self.warning_min, self.warning_max) {
            if wmin > wmax {
                return Err(EngineError::Config(format!(
                    "threshold rule for '{}': warning_min {} exceeds warning_max {}",
                    self.metric, wmin, wmax
                )));
            }
        }
        Ok(())
    }
}

/// Kind of cross-metric relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// A subset rate must not exceed its superset rate.
    RateSubset,
    /// A sub-population count must not exceed its containing population count.
    CountSubset,
}

/// A declared relationship between two metrics.
///
/// Relationships are never inferred; only declared ones are checked, each at
/// its fixed severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRelationship {
    pub kind: RelationshipKind,
    /// The metric that must stay below or equal.
    pub subset: String,
    /// The containing metric.
    pub superset: String,
    /// Severity when the relationship is violated.
    #[serde(default = "default_relationship_severity")]
    pub severity: Severity,
}

fn default_relationship_severity() -> Severity {
    Severity::Warning
}

/// Configuration for the threshold & range validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Range rules for rate metrics.
    pub rules: Vec<MetricThresholdRule>,
    /// Metrics typed as percentages; bound-checked against [0, 100].
    pub percentage_metrics: Vec<String>,
    /// Metrics typed as counts; checked for negativity.
    pub count_metrics: Vec<String>,
    /// Metrics that must be present in every metric map.
    pub required_metrics: Vec<String>,
    /// Declared cross-metric relationships.
    pub relationships: Vec<MetricRelationship>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            percentage_metrics: vec![
                "absence_rate".into(),
                "unauthorized_absence_rate".into(),
                "resignation_rate".into(),
            ],
            count_metrics: vec!["headcount".into(), "leaver_count".into()],
            required_metrics: vec!["headcount".into(), "absence_rate".into()],
            relationships: vec![MetricRelationship {
                kind: RelationshipKind::RateSubset,
                subset: "unauthorized_absence_rate".into(),
                superset: "absence_rate".into(),
                severity: Severity::Warning,
            }],
        }
    }
}

impl ThresholdConfig {
    /// Validate every rule in the table.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

/// Deviation bands for the historical anomaly detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyBands {
    /// Minimum historical samples required before a metric is compared.
    pub min_history: usize,
    /// Deviations beyond this many standard deviations warn.
    pub warn_sigma: f64,
    /// Deviations beyond this many standard deviations are critical.
    pub critical_sigma: f64,
}

impl Default for AnomalyBands {
    fn default() -> Self {
        Self {
            min_history: 3,
            warn_sigma: 2.0,
            critical_sigma: 3.0,
        }
    }
}

impl AnomalyBands {
    pub fn validate(&self) -> Result<()> {
        if self.warn_sigma <= 0.0 || self.critical_sigma < self.warn_sigma {
            return Err(EngineError::Config(format!(
                "anomaly bands: require 0 < warn_sigma ({}) <= critical_sigma ({})",
                self.warn_sigma, self.critical_sigma
            )));
        }
        Ok(())
    }
}

/// Full configuration for a [`crate::ValidationEngine`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Roster dataset column layout.
    pub roster: RosterColumns,
    /// Attendance dataset column layout.
    pub attendance: AttendanceColumns,
    /// Accepted employment classification values. Empty disables the check.
    pub valid_classifications: Vec<String>,
    /// Threshold validator configuration.
    pub thresholds: ThresholdConfig,
    /// Anomaly detector bands.
    pub anomaly: AnomalyBands,
}

impl EngineConfig {
    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.anomaly.validate()?;
        Ok(())
    }
}
