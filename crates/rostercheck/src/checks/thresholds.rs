//! Threshold and range validation for computed summary metrics.

use indexmap::IndexMap;
use serde_json::json;

use crate::config::{MetricRelationship, RelationshipKind, ThresholdConfig};
use crate::issue::{IssueCategory, Severity, ValidationIssue};
use crate::score::{QualityScore, ScoreCard};

/// Current-period metric values keyed by metric name.
///
/// A metric the upstream computed as null is simply absent from the map.
pub type MetricMap = IndexMap<String, f64>;

/// Issues plus the quality score for one metric validation pass.
#[derive(Debug, Clone)]
pub struct ThresholdOutcome {
    pub issues: Vec<ValidationIssue>,
    pub score: QualityScore,
}

/// Validates metric values against an injected [`ThresholdConfig`].
pub struct ThresholdValidator<'a> {
    config: &'a ThresholdConfig,
}

impl<'a> ThresholdValidator<'a> {
    pub fn new(config: &'a ThresholdConfig) -> Self {
        Self { config }
    }

    /// Run every configured check over the metric map.
    ///
    /// Each bound check, relationship check, and required-presence check
    /// counts toward the score; a metric with no configured rule is skipped,
    /// not failed.
    pub fn validate(&self, metrics: &MetricMap) -> ThresholdOutcome {
        let mut issues = Vec::new();
        let mut card = ScoreCard::new();

        // Percentage-typed metrics: [0, 100].
        for metric in &self.config.percentage_metrics {
            let Some(&value) = metrics.get(metric) else {
                continue;
            };
            let in_bounds = (0.0..=100.0).contains(&value);
            card.record(in_bounds);
            if !in_bounds {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::Threshold,
                        Severity::Critical,
                        format!("percentage metric '{metric}' is {value}, outside [0, 100]"),
                    )
                    .with_field(metric.clone())
                    .with_observed(json!(value))
                    .with_expected("a value in [0, 100]")
                    .with_remediation("recompute the metric; a percentage cannot leave [0, 100]"),
                );
            }
        }

        // Rate metrics with a configured rule.
        for rule in &self.config.rules {
            let Some(&value) = metrics.get(&rule.metric) else {
                continue; // no value to check; required-presence handles must-exist metrics
            };
            if value < rule.min || value > rule.max {
                card.record_fail();
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::Threshold,
                        Severity::Critical,
                        format!(
                            "metric '{}' is {value}, outside [{}, {}]",
                            rule.metric, rule.min, rule.max
                        ),
                    )
                    .with_field(rule.metric.clone())
                    .with_observed(json!(value))
                    .with_expected(format!("a value in [{}, {}]", rule.min, rule.max))
                    .with_remediation("investigate the period before publishing this metric")
                    .with_meta("min", json!(rule.min))
                    .with_meta("max", json!(rule.max)),
                );
                continue;
            }

            let below_warn = rule.warning_min.map(|w| value < w).unwrap_or(false);
            let above_warn = rule.warning_max.map(|w| value > w).unwrap_or(false);
            if below_warn || above_warn {
                card.record_fail();
                let (bound, side) = if below_warn {
                    (rule.warning_min.unwrap_or(rule.min), "below")
                } else {
                    (rule.warning_max.unwrap_or(rule.max), "above")
                };
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::Threshold,
                        Severity::Warning,
                        format!(
                            "metric '{}' is {value}, {side} the warning bound {bound}",
                            rule.metric
                        ),
                    )
                    .with_field(rule.metric.clone())
                    .with_observed(json!(value))
                    .with_expected(format!("a value inside the warning band of [{}, {}]", rule.min, rule.max))
                    .with_remediation("keep an eye on this metric; it is drifting toward its limit")
                    .with_meta("warning_bound", json!(bound)),
                );
            } else {
                card.record_pass();
            }
        }

        // Count metrics: non-negative.
        for metric in &self.config.count_metrics {
            let Some(&value) = metrics.get(metric) else {
                continue;
            };
            let non_negative = value >= 0.0;
            card.record(non_negative);
            if !non_negative {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::Threshold,
                        Severity::Critical,
                        format!("count metric '{metric}' is negative ({value})"),
                    )
                    .with_field(metric.clone())
                    .with_observed(json!(value))
                    .with_expected("a value >= 0")
                    .with_remediation("a count cannot be negative; recompute it"),
                );
            }
        }

        // Declared cross-metric relationships.
        for relationship in &self.config.relationships {
            let (Some(&subset), Some(&superset)) = (
                metrics.get(&relationship.subset),
                metrics.get(&relationship.superset),
            ) else {
                continue;
            };
            let holds = subset <= superset;
            card.record(holds);
            if !holds {
                issues.push(relationship_issue(relationship, subset, superset));
            }
        }

        // Required-presence list.
        for metric in &self.config.required_metrics {
            let present = metrics.contains_key(metric);
            card.record(present);
            if !present {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::MissingMetric,
                        Severity::Warning,
                        format!("expected metric '{metric}' is absent from this period"),
                    )
                    .with_field(metric.clone())
                    .with_expected("a computed value for this metric")
                    .with_remediation("check whether the metric calculation ran for this period"),
                );
            }
        }

        ThresholdOutcome {
            issues,
            score: card.score(),
        }
    }
}

fn relationship_issue(
    relationship: &MetricRelationship,
    subset: f64,
    superset: f64,
) -> ValidationIssue {
    let noun = match relationship.kind {
        RelationshipKind::RateSubset => "rate",
        RelationshipKind::CountSubset => "count",
    };
    ValidationIssue::new(
        IssueCategory::MetricConsistency,
        relationship.severity,
        format!(
            "subset {noun} '{}' ({subset}) exceeds '{}' ({superset})",
            relationship.subset, relationship.superset
        ),
    )
    .with_field(relationship.subset.clone())
    .with_observed(json!({ "subset": subset, "superset": superset }))
    .with_expected(format!("'{}' <= '{}'", relationship.subset, relationship.superset))
    .with_remediation("the two metrics aggregate inconsistently; recompute both from source")
    .with_meta("superset_metric", relationship.superset.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricThresholdRule;
    use crate::score::Grade;

    fn metrics(pairs: &[(&str, f64)]) -> MetricMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn empty_config() -> ThresholdConfig {
        ThresholdConfig {
            rules: Vec::new(),
            percentage_metrics: Vec::new(),
            count_metrics: Vec::new(),
            required_metrics: Vec::new(),
            relationships: Vec::new(),
        }
    }

    #[test]
    fn test_percentage_bounds() {
        let config = ThresholdConfig {
            percentage_metrics: vec!["absence_rate".into()],
            ..empty_config()
        };
        let outcome = ThresholdValidator::new(&config).validate(&metrics(&[("absence_rate", 104.2)]));

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, Severity::Critical);
        assert_eq!(outcome.score.value, 0.0);
    }

    #[test]
    fn test_rule_hard_and_warning_bands() {
        let config = ThresholdConfig {
            rules: vec![MetricThresholdRule {
                metric: "resignation_rate".into(),
                min: 0.0,
                max: 20.0,
                warning_min: None,
                warning_max: Some(15.0),
            }],
            ..empty_config()
        };
        let validator = ThresholdValidator::new(&config);

        let critical = validator.validate(&metrics(&[("resignation_rate", 25.0)]));
        assert_eq!(critical.issues.len(), 1);
        assert_eq!(critical.issues[0].severity, Severity::Critical);

        let warning = validator.validate(&metrics(&[("resignation_rate", 17.0)]));
        assert_eq!(warning.issues.len(), 1);
        assert_eq!(warning.issues[0].severity, Severity::Warning);

        let clean = validator.validate(&metrics(&[("resignation_rate", 10.0)]));
        assert!(clean.issues.is_empty());
        assert_eq!(clean.score.value, 100.0);
    }

    #[test]
    fn test_unconfigured_metric_skipped() {
        let config = empty_config();
        let outcome = ThresholdValidator::new(&config).validate(&metrics(&[("whatever", 9999.0)]));
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.score.total_checks, 0);
        assert_eq!(outcome.score.value, 100.0);
    }

    #[test]
    fn test_subset_rate_relationship_warns() {
        let config = ThresholdConfig::default();
        let outcome = ThresholdValidator::new(&config).validate(&metrics(&[
            ("absence_rate", 10.0),
            ("unauthorized_absence_rate", 15.0),
            ("headcount", 120.0),
        ]));

        let consistency: Vec<_> = outcome
            .issues
            .iter()
            .filter(|i| i.category == IssueCategory::MetricConsistency)
            .collect();
        assert_eq!(consistency.len(), 1);
        assert_eq!(consistency[0].severity, Severity::Warning);
    }

    #[test]
    fn test_count_subset_relationship_fixed_severity() {
        let config = ThresholdConfig {
            relationships: vec![MetricRelationship {
                kind: RelationshipKind::CountSubset,
                subset: "leaver_count".into(),
                superset: "headcount".into(),
                severity: Severity::Critical,
            }],
            ..empty_config()
        };
        let outcome = ThresholdValidator::new(&config)
            .validate(&metrics(&[("leaver_count", 30.0), ("headcount", 25.0)]));

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_required_metric_absent_warns() {
        let config = ThresholdConfig {
            required_metrics: vec!["headcount".into()],
            ..empty_config()
        };
        let outcome = ThresholdValidator::new(&config).validate(&metrics(&[]));

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].category, IssueCategory::MissingMetric);
        assert_eq!(outcome.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_score_tallies_checks() {
        let config = ThresholdConfig {
            percentage_metrics: vec!["a".into(), "b".into()],
            required_metrics: vec!["a".into(), "b".into()],
            ..empty_config()
        };
        // a passes both; b's percentage check fails, presence passes.
        let outcome = ThresholdValidator::new(&config)
            .validate(&metrics(&[("a", 50.0), ("b", 150.0)]));

        assert_eq!(outcome.score.total_checks, 4);
        assert_eq!(outcome.score.passed_checks, 3);
        assert_eq!(outcome.score.value, 75.0);
        assert_eq!(outcome.score.grade, Grade::C);
    }
}
