//! Property-based tests for the validation engine.
//!
//! These tests use proptest to generate random inputs and verify that the
//! checks maintain their invariants under all conditions:
//!
//! 1. **No panics**: checks never crash on any input
//! 2. **Determinism**: same input always produces same output
//! 3. **Invariants**: summary counts, pass flags, and score bounds always hold

use proptest::prelude::*;

use rostercheck::checks::{anomaly, consistency, schema};
use rostercheck::{
    AnomalyBands, Grade, IssueCategory, IssueSummary, MetricMap, QualityScore, RecordTable,
    ScoreCard, Severity, ValidationIssue, ValidationResult,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary cell content, including null tokens and junk.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("NA".to_string()),
        Just("null".to_string()),
        "[a-zA-Z0-9_\\-\\. ]{0,20}",
        "E[0-9]{3}",
        "-?[0-9]{1,6}(\\.[0-9]{1,3})?",
    ]
}

/// A single-column table of arbitrary cells.
fn single_column_table() -> impl Strategy<Value = RecordTable> {
    prop::collection::vec(cell(), 1..40).prop_map(|cells| {
        RecordTable::new(
            vec!["employee_id".to_string()],
            cells.into_iter().map(|c| vec![c]).collect(),
        )
    })
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Critical),
    ]
}

fn issues() -> impl Strategy<Value = Vec<ValidationIssue>> {
    prop::collection::vec(severity(), 0..50).prop_map(|severities| {
        severities
            .into_iter()
            .map(|s| ValidationIssue::new(IssueCategory::LogicError, s, "generated"))
            .collect()
    })
}

// =============================================================================
// Summary and result invariants
// =============================================================================

proptest! {
    /// Summary counts always add up exactly: no double counting, no omission.
    #[test]
    fn summary_counts_are_exact(issues in issues()) {
        let summary = IssueSummary::from_issues(&issues);
        prop_assert_eq!(summary.total, issues.len());
        prop_assert_eq!(summary.critical + summary.warning + summary.info, summary.total);
    }

    /// The overall-pass flag is false iff at least one critical issue exists.
    #[test]
    fn pass_flag_tracks_critical_issues(issues in issues()) {
        let has_critical = issues.iter().any(|i| i.severity == Severity::Critical);
        let result = ValidationResult::from_issues(issues);
        prop_assert_eq!(result.passed, !has_critical);
    }
}

// =============================================================================
// Score properties
// =============================================================================

proptest! {
    /// Adding one more failing check, all else fixed, never increases the score.
    #[test]
    fn score_is_monotonic(passed in 0usize..500, extra_total in 0usize..500) {
        let total = passed + extra_total;
        let before = QualityScore::from_counts(passed, total).value;
        let mut card = ScoreCard::new();
        card.add_counts(passed, total);
        card.record_fail();
        prop_assert!(card.score().value <= before);
    }

    /// Scores stay in [0, 100] and grades match the fixed breakpoints.
    #[test]
    fn score_bounds_and_grade(passed in 0usize..500, extra_total in 0usize..500) {
        let score = QualityScore::from_counts(passed, passed + extra_total);
        prop_assert!((0.0..=100.0).contains(&score.value));

        let expected = if score.value >= 95.0 {
            Grade::A
        } else if score.value >= 85.0 {
            Grade::B
        } else if score.value >= 70.0 {
            Grade::C
        } else if score.value >= 50.0 {
            Grade::D
        } else {
            Grade::F
        };
        prop_assert_eq!(score.grade, expected);
    }
}

// =============================================================================
// Check invariants
// =============================================================================

proptest! {
    /// Uniqueness detection never panics and is idempotent on an unmodified
    /// table.
    #[test]
    fn uniqueness_is_idempotent(table in single_column_table()) {
        let first = consistency::check_unique(&table, "employee_id");
        let second = consistency::check_unique(&table, "employee_id");
        prop_assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    /// Schema check returns exactly one critical issue per missing column and
    /// none for present columns.
    #[test]
    fn schema_issue_count_matches_missing_columns(
        missing in prop::collection::hash_set("[a-z]{3,10}", 0..6),
    ) {
        let table = RecordTable::new(
            vec!["employee_id".to_string()],
            vec![vec!["E001".to_string()]],
        );
        let mut required: Vec<String> = missing.iter().cloned().collect();
        required.retain(|c| c != "employee_id");
        let expected_missing = required.len();
        required.push("employee_id".to_string());

        let issues = schema::check_schema(&table, &required);
        prop_assert_eq!(issues.len(), expected_missing);
        prop_assert!(issues.iter().all(|i| i.severity == Severity::Critical));
    }

    /// Fewer than three historical samples emit zero anomaly issues no matter
    /// how extreme the current value is.
    #[test]
    fn anomaly_skips_short_history(
        current in -1.0e9f64..1.0e9,
        samples in prop::collection::vec(-100.0f64..100.0, 0..3),
    ) {
        let history: Vec<MetricMap> = samples
            .into_iter()
            .map(|v| [("m".to_string(), v)].into_iter().collect())
            .collect();
        let metrics: MetricMap = [("m".to_string(), current)].into_iter().collect();
        let issues = anomaly::detect(&metrics, &history, &AnomalyBands::default());
        prop_assert!(issues.is_empty());
    }

    /// Required-field checking never panics on arbitrary cells and flags
    /// exactly the null ones.
    #[test]
    fn required_fields_flag_exactly_null_cells(table in single_column_table()) {
        let nulls = (0..table.row_count())
            .filter(|&row| {
                RecordTable::is_null_value(table.value(row, "employee_id").unwrap_or(""))
            })
            .count();
        let issues =
            schema::check_required_fields(&table, &["employee_id".to_string()]);
        prop_assert_eq!(issues.len(), nulls);
    }
}
