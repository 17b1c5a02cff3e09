//! Historical anomaly detection over metric baselines.

use serde_json::json;

use crate::config::AnomalyBands;
use crate::issue::{IssueCategory, Severity, ValidationIssue};

use super::thresholds::MetricMap;

/// Compare current metric values against a rolling historical baseline.
///
/// `history` is ordered oldest to newest and is caller-owned; the detector
/// only reads it. A metric with fewer than `min_history` samples or with a
/// flat baseline (sigma = 0) is skipped silently.
pub fn detect(
    current: &MetricMap,
    history: &[MetricMap],
    bands: &AnomalyBands,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (metric, &value) in current {
        let samples: Vec<f64> = history
            .iter()
            .filter_map(|period| period.get(metric))
            .copied()
            .collect();
        if samples.len() < bands.min_history {
            continue;
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance = samples
            .iter()
            .map(|sample| (sample - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev <= 0.0 {
            continue;
        }

        let deviation = (value - mean).abs();
        if deviation <= bands.warn_sigma * std_dev {
            continue;
        }

        let severity = if deviation <= bands.critical_sigma * std_dev {
            Severity::Warning
        } else {
            Severity::Critical
        };
        let percent_change = if mean == 0.0 {
            0.0
        } else {
            (value - mean) / mean * 100.0
        };

        issues.push(
            ValidationIssue::new(
                IssueCategory::HistoricalAnomaly,
                severity,
                format!(
                    "metric '{metric}' is {value}, {:.1} standard deviations from its baseline mean {mean:.2}",
                    deviation / std_dev
                ),
            )
            .with_field(metric.clone())
            .with_observed(json!(value))
            .with_expected(format!(
                "within {} standard deviations of {mean:.2}",
                bands.warn_sigma
            ))
            .with_remediation("compare against the prior periods before publishing")
            .with_meta("mean", json!(mean))
            .with_meta("std_dev", json!(std_dev))
            .with_meta("percent_change", json!(percent_change))
            .with_meta("history_len", json!(samples.len())),
        );
    }

    issues
}
