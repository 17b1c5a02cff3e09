//! Engine orchestration: runs the layered checks in order and merges their
//! issue lists into one report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checks::{anomaly, consistency, schema};
use crate::checks::{
    CategorizedDetector, CategorizedInput, CategorizedReport, MetricMap, ThresholdOutcome,
    ThresholdValidator,
};
use crate::config::EngineConfig;
use crate::dates::{DateParser, StrictDateParser};
use crate::error::{EngineError, Result};
use crate::issue::{IssueSummary, ValidationIssue, ValidationResult};
use crate::score::{QualityScore, ScoreCard};
use crate::table::RecordTable;

/// Inputs for one full batch validation pass.
pub struct RunInput<'a> {
    /// The authoritative employee roster.
    pub roster: &'a RecordTable,
    /// Attendance log for the period, when available.
    pub attendance: Option<&'a RecordTable>,
    /// Reporting reference date.
    pub as_of: NaiveDate,
    /// Current-period summary metrics, when available.
    pub metrics: Option<&'a MetricMap>,
    /// Prior-period metric snapshots, oldest to newest.
    pub history: &'a [MetricMap],
}

/// The downstream report: a plain serializable structure consumed by the
/// reporting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All issues from the run, critical first.
    pub issues: Vec<ValidationIssue>,
    /// Per-severity counts.
    pub summary: IssueSummary,
    /// Overall data quality score.
    pub score: QualityScore,
}

impl ValidationReport {
    /// True iff the run produced zero critical issues.
    pub fn passed(&self) -> bool {
        self.summary.critical == 0
    }
}

/// The validation and anomaly-detection engine.
///
/// Stateless request/response: every method is a pure pass over
/// caller-supplied inputs, so independent calls may run concurrently without
/// coordination.
pub struct ValidationEngine {
    config: EngineConfig,
    parser: Box<dyn DateParser + Send + Sync>,
}

impl ValidationEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parser: Box::new(StrictDateParser::default()),
        })
    }

    /// Replace the date parser (the ingestion layer may supply its own).
    pub fn with_parser(mut self, parser: impl DateParser + Send + Sync + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the roster dataset.
    ///
    /// Ordering matters: schema runs first (a check against a missing column
    /// cannot run), required fields before uniqueness (duplicates of a null
    /// key are meaningless).
    pub fn validate_roster(
        &self,
        roster: &RecordTable,
        as_of: NaiveDate,
    ) -> Result<ValidationResult> {
        require_rows(roster, "roster")?;
        let columns = &self.config.roster;
        let date_fields = vec![columns.entrance_date.clone(), columns.stop_date.clone()];

        let mut issues = schema::check_schema(roster, &columns.required);
        issues.extend(schema::check_required_fields(roster, &columns.required));
        issues.extend(consistency::check_date_order(
            roster,
            &columns.entrance_date,
            &columns.stop_date,
            self.parser.as_ref(),
        ));
        issues.extend(consistency::check_future_dates(
            roster,
            &date_fields,
            as_of,
            self.parser.as_ref(),
        ));
        issues.extend(consistency::check_unique(roster, &columns.id));

        Ok(ValidationResult::from_issues(issues))
    }

    /// Validate the attendance dataset.
    pub fn validate_attendance(&self, attendance: &RecordTable) -> Result<ValidationResult> {
        require_rows(attendance, "attendance")?;
        let columns = &self.config.attendance;

        let mut issues = schema::check_schema(attendance, &columns.required);
        issues.extend(schema::check_required_fields(attendance, &columns.required));
        issues.extend(schema::check_numeric(attendance, &columns.numeric));
        issues.extend(consistency::check_partial_totals(
            attendance,
            &columns.days_present,
            &columns.days_scheduled,
        ));

        Ok(ValidationResult::from_issues(issues))
    }

    /// Cross-dataset identity consistency between the roster and its
    /// dependent datasets.
    pub fn validate_cross(
        &self,
        roster: &RecordTable,
        dependents: &[(String, &RecordTable)],
    ) -> Result<Vec<ValidationIssue>> {
        require_rows(roster, "roster")?;
        let key = &self.config.roster.id;

        let mut issues = consistency::check_orphans(roster, key, dependents)?;
        issues.extend(consistency::check_coverage(roster, key, dependents)?);
        Ok(issues)
    }

    /// Run the categorized error detector for external reporting.
    pub fn categorize(&self, input: CategorizedInput<'_>) -> CategorizedReport {
        CategorizedDetector::new(&self.config, self.parser.as_ref()).detect(input)
    }

    /// Validate summary metrics against the configured thresholds.
    pub fn validate_metrics(&self, metrics: &MetricMap) -> ThresholdOutcome {
        ThresholdValidator::new(&self.config.thresholds).validate(metrics)
    }

    /// Flag metrics deviating from their historical baseline.
    pub fn detect_anomalies(
        &self,
        current: &MetricMap,
        history: &[MetricMap],
    ) -> Vec<ValidationIssue> {
        anomaly::detect(current, history, &self.config.anomaly)
    }

    /// Full batch pass for one reporting period.
    ///
    /// Merges every checker's issue list and aggregates one summary and one
    /// score. Each checker invocation counts as one check toward the score,
    /// passing iff it emitted no issues; the threshold validator contributes
    /// its own per-rule tally.
    pub fn run(&self, input: RunInput<'_>) -> Result<ValidationReport> {
        let mut issues = Vec::new();
        let mut card = ScoreCard::new();

        let roster_result = self.validate_roster(input.roster, input.as_of)?;
        card.record(roster_result.issues.is_empty());
        issues.extend(roster_result.issues);

        if let Some(attendance) = input.attendance {
            let attendance_result = self.validate_attendance(attendance)?;
            card.record(attendance_result.issues.is_empty());
            issues.extend(attendance_result.issues);

            let dependents = vec![("attendance".to_string(), attendance)];
            let cross = self.validate_cross(input.roster, &dependents)?;
            card.record(cross.is_empty());
            issues.extend(cross);
        }

        if let Some(metrics) = input.metrics {
            let outcome = self.validate_metrics(metrics);
            card.add_counts(outcome.score.passed_checks, outcome.score.total_checks);
            issues.extend(outcome.issues);

            let anomalies = self.detect_anomalies(metrics, input.history);
            card.record(anomalies.is_empty());
            issues.extend(anomalies);
        }

        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        let summary = IssueSummary::from_issues(&issues);

        Ok(ValidationReport {
            issues,
            summary,
            score: card.score(),
        })
    }
}

fn require_rows(table: &RecordTable, name: &str) -> Result<()> {
    if table.row_count() == 0 {
        return Err(EngineError::EmptyTable(name.to_string()));
    }
    Ok(())
}
