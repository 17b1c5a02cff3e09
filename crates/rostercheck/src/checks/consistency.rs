//! Logical consistency checks: same-row invariants and cross-dataset
//! identity consistency.

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::json;

use crate::dates::{DateParser, ParsedDate};
use crate::error::{EngineError, Result};
use crate::issue::{IssueCategory, Severity, ValidationIssue};
use crate::table::RecordTable;

/// Per-row date ordering: `start <= end`.
///
/// Null cells are skipped (the required-field check owns those). A non-null
/// cell the parser cannot interpret is its own critical issue; the pair
/// comparison only runs when both sides parse.
pub fn check_date_order(
    table: &RecordTable,
    start_field: &str,
    end_field: &str,
    parser: &dyn DateParser,
) -> Vec<ValidationIssue> {
    if !table.has_column(start_field) || !table.has_column(end_field) {
        return Vec::new(); // covered by check_schema
    }

    let mut issues = Vec::new();

    for row in 0..table.row_count() {
        let start_cell = table.value(row, start_field).unwrap_or("");
        let end_cell = table.value(row, end_field).unwrap_or("");

        let start = parse_cell(parser, row, start_field, start_cell, &mut issues);
        let end = parse_cell(parser, row, end_field, end_cell, &mut issues);

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::TemporalLogic,
                        Severity::Critical,
                        format!(
                            "row {row}: '{start_field}' {start} is after '{end_field}' {end}"
                        ),
                    )
                    .with_row(row)
                    .with_field(start_field)
                    .with_observed(json!({ "start": start.to_string(), "end": end.to_string() }))
                    .with_expected(format!("'{start_field}' on or before '{end_field}'"))
                    .with_remediation("check the two dates against the personnel file"),
                );
            }
        }
    }

    issues
}

fn parse_cell(
    parser: &dyn DateParser,
    row: usize,
    field: &str,
    cell: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<NaiveDate> {
    if RecordTable::is_null_value(cell) {
        return None;
    }
    match parser.parse(cell) {
        ParsedDate::Date(date) => Some(date),
        ParsedDate::Unparsable => {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::InvalidDate,
                    Severity::Critical,
                    format!("row {row}: '{}' in '{field}' is not a recognizable date", cell.trim()),
                )
                .with_row(row)
                .with_field(field)
                .with_observed(json!(cell.trim()))
                .with_expected("a parseable calendar date")
                .with_remediation("normalize the date format in the source export"),
            );
            None
        }
    }
}

/// Any parsed date later than the as-of reference date is a warning.
///
/// Unparsable cells are skipped here; the date-order check reports them.
pub fn check_future_dates(
    table: &RecordTable,
    fields: &[String],
    as_of: NaiveDate,
    parser: &dyn DateParser,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field in fields {
        let Some(values) = table.column_values(field) else {
            continue;
        };
        for (row, cell) in values.enumerate() {
            if RecordTable::is_null_value(cell) {
                continue;
            }
            if let ParsedDate::Date(date) = parser.parse(cell) {
                if date > as_of {
                    issues.push(
                        ValidationIssue::new(
                            IssueCategory::FutureDate,
                            Severity::Warning,
                            format!("row {row}: '{field}' {date} is after the reporting date {as_of}"),
                        )
                        .with_row(row)
                        .with_field(field.clone())
                        .with_observed(json!(date.to_string()))
                        .with_expected(format!("a date on or before {as_of}"))
                        .with_remediation("confirm whether the record was entered ahead of time"),
                    );
                }
            }
        }
    }

    issues
}

/// Per-row count relationship: `partial <= total`.
///
/// Exact equality is fine. A zero total with a positive partial is a warning
/// rather than critical: it usually means the total was never filled in.
/// Unparsable cells are skipped (the numeric check owns those).
pub fn check_partial_totals(
    table: &RecordTable,
    partial_field: &str,
    total_field: &str,
) -> Vec<ValidationIssue> {
    if !table.has_column(partial_field) || !table.has_column(total_field) {
        return Vec::new();
    }

    let mut issues = Vec::new();

    for row in 0..table.row_count() {
        let partial = parse_number(table.value(row, partial_field).unwrap_or(""));
        let total = parse_number(table.value(row, total_field).unwrap_or(""));
        let (Some(partial), Some(total)) = (partial, total) else {
            continue;
        };

        if total == 0.0 && partial > 0.0 {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::LogicError,
                    Severity::Warning,
                    format!(
                        "row {row}: '{total_field}' is zero but '{partial_field}' is {partial}"
                    ),
                )
                .with_row(row)
                .with_field(total_field)
                .with_observed(json!({ "partial": partial, "total": total }))
                .with_expected(format!("'{total_field}' > 0 when '{partial_field}' > 0"))
                .with_remediation("fill in the scheduled total for the period"),
            );
        } else if partial > total {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::LogicError,
                    Severity::Critical,
                    format!(
                        "row {row}: '{partial_field}' {partial} exceeds '{total_field}' {total}"
                    ),
                )
                .with_row(row)
                .with_field(partial_field)
                .with_observed(json!({ "partial": partial, "total": total }))
                .with_expected(format!("'{partial_field}' <= '{total_field}'"))
                .with_remediation("recount the period; a partial tally cannot exceed its total"),
            );
        }
    }

    issues
}

fn parse_number(cell: &str) -> Option<f64> {
    if RecordTable::is_null_value(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok()
}

/// Rows in a dependent dataset whose identity key does not exist in the
/// authoritative base dataset. One warning per offending row.
pub fn check_orphans(
    base: &RecordTable,
    key: &str,
    dependents: &[(String, &RecordTable)],
) -> Result<Vec<ValidationIssue>> {
    let base_ids = base_identity_set(base, key)?;
    let mut issues = Vec::new();

    for (dataset, table) in dependents {
        let Some(values) = table.column_values(key) else {
            continue; // dependent schema issues are reported on that dataset
        };
        for (row, cell) in values.enumerate() {
            if RecordTable::is_null_value(cell) {
                continue;
            }
            let id = cell.trim();
            if !base_ids.contains(id) {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::OrphanedRecord,
                        Severity::Warning,
                        format!("{dataset} row {row}: '{id}' has no matching roster record"),
                    )
                    .with_row(row)
                    .with_field(key)
                    .with_observed(json!(id))
                    .with_expected("an identity present in the roster")
                    .with_remediation("remove the stale record or restore the roster entry")
                    .with_meta("dataset", dataset.as_str()),
                );
            }
        }
    }

    Ok(issues)
}

/// Base identities with zero matching rows in a dependent dataset. One
/// aggregate warning per dataset, never per row.
pub fn check_coverage(
    base: &RecordTable,
    key: &str,
    dependents: &[(String, &RecordTable)],
) -> Result<Vec<ValidationIssue>> {
    let base_ids = base_identity_set(base, key)?;
    let mut issues = Vec::new();

    for (dataset, table) in dependents {
        let Some(values) = table.column_values(key) else {
            continue;
        };
        let covered: HashSet<&str> = values
            .filter(|cell| !RecordTable::is_null_value(cell))
            .map(str::trim)
            .collect();

        let missing: Vec<&str> = base_ids
            .iter()
            .filter(|id| !covered.contains(id.as_str()))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::MissingCoverage,
                    Severity::Warning,
                    format!(
                        "{} roster identit{} have no rows in {dataset}",
                        missing.len(),
                        if missing.len() == 1 { "y" } else { "ies" },
                    ),
                )
                .with_field(key)
                .with_expected(format!("every roster identity covered in {dataset}"))
                .with_remediation("check whether the export for this dataset was truncated")
                .with_meta("dataset", dataset.as_str())
                .with_meta("missing_ids", json!(missing)),
            );
        }
    }

    Ok(issues)
}

fn base_identity_set(base: &RecordTable, key: &str) -> Result<HashSet<String>> {
    let Some(values) = base.column_values(key) else {
        return Err(EngineError::UnknownColumn {
            table: "base".into(),
            column: key.into(),
        });
    };
    Ok(values
        .filter(|cell| !RecordTable::is_null_value(cell))
        .map(|cell| cell.trim().to_string())
        .collect())
}

/// Uniqueness over a key field: one critical issue per distinct duplicated
/// value, carrying all offending row indices.
///
/// Null keys are skipped; the required-field check owns those, and duplicates
/// of a null key are meaningless.
pub fn check_unique(table: &RecordTable, field: &str) -> Vec<ValidationIssue> {
    let Some(values) = table.column_values(field) else {
        return Vec::new();
    };

    let mut value_rows: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (row, cell) in values.enumerate() {
        if RecordTable::is_null_value(cell) {
            continue;
        }
        value_rows.entry(cell.trim().to_string()).or_default().push(row);
    }
    value_rows.retain(|_, rows| rows.len() > 1);

    value_rows
        .into_iter()
        .map(|(value, rows)| {
            ValidationIssue::new(
                IssueCategory::DuplicateValue,
                Severity::Critical,
                format!("'{value}' occurs {} times in unique field '{field}'", rows.len()),
            )
            .with_field(field)
            .with_observed(json!(value))
            .with_expected("each key value at most once")
            .with_remediation("merge or delete the duplicated records")
            .with_meta("rows", json!(rows))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::StrictDateParser;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> RecordTable {
        RecordTable::new(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_date_order_violation() {
        let table = make_table(
            vec!["entrance_date", "stop_date"],
            vec![
                vec!["2025-03-01", "2025-01-01"],
                vec!["2024-01-01", "2024-06-01"],
                vec!["2024-05-05", "2024-05-05"], // equality allowed
            ],
        );
        let issues = check_date_order(&table, "entrance_date", "stop_date", &StrictDateParser::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::TemporalLogic);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].row, Some(0));
    }

    #[test]
    fn test_date_order_reports_unparsable() {
        let table = make_table(
            vec!["entrance_date", "stop_date"],
            vec![vec!["03-2025-01", "2025-06-01"]],
        );
        let issues = check_date_order(&table, "entrance_date", "stop_date", &StrictDateParser::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::InvalidDate);
    }

    #[test]
    fn test_future_dates() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let table = make_table(
            vec!["entrance_date"],
            vec![vec!["2025-12-01"], vec!["2025-06-30"], vec![""]],
        );
        let issues = check_future_dates(
            &table,
            &["entrance_date".to_string()],
            as_of,
            &StrictDateParser::default(),
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::FutureDate);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].row, Some(0));
    }

    #[test]
    fn test_partial_totals_boundary() {
        let table = make_table(
            vec!["days_present", "days_scheduled"],
            vec![
                vec!["22", "20"], // violation
                vec!["20", "20"], // equality is fine
                vec!["5", "0"],   // zero total, positive partial
                vec!["0", "0"],
            ],
        );
        let issues = check_partial_totals(&table, "days_present", "days_scheduled");

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].row, Some(0));
        assert_eq!(issues[1].severity, Severity::Warning);
        assert_eq!(issues[1].row, Some(2));
    }

    #[test]
    fn test_orphans_and_coverage() {
        let roster = make_table(vec!["employee_id"], vec![vec!["E001"], vec!["E002"]]);
        let attendance = make_table(
            vec!["employee_id", "days_present"],
            vec![vec!["E001", "20"], vec!["E999", "18"]],
        );
        let dependents = vec![("attendance".to_string(), &attendance)];

        let orphans = check_orphans(&roster, "employee_id", &dependents).unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].category, IssueCategory::OrphanedRecord);
        assert_eq!(orphans[0].row, Some(1));

        let coverage = check_coverage(&roster, "employee_id", &dependents).unwrap();
        assert_eq!(coverage.len(), 1);
        assert_eq!(coverage[0].category, IssueCategory::MissingCoverage);
        assert_eq!(coverage[0].metadata["missing_ids"], json!(["E002"]));
    }

    #[test]
    fn test_orphans_unknown_base_key_is_error() {
        let roster = make_table(vec!["id"], vec![vec!["E001"]]);
        let attendance = make_table(vec!["employee_id"], vec![vec!["E001"]]);
        let dependents = vec![("attendance".to_string(), &attendance)];
        assert!(check_orphans(&roster, "employee_id", &dependents).is_err());
    }

    #[test]
    fn test_unique_groups_all_rows() {
        let table = make_table(
            vec!["employee_id"],
            vec![
                vec!["E001"],
                vec!["E002"],
                vec!["E001"],
                vec!["E001"],
                vec![""],
                vec![""],
            ],
        );
        let issues = check_unique(&table, "employee_id");

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::DuplicateValue);
        assert_eq!(issues[0].metadata["rows"], json!([0, 2, 3]));
    }

    #[test]
    fn test_unique_idempotent() {
        let table = make_table(
            vec!["employee_id"],
            vec![vec!["E001"], vec!["E001"], vec!["E002"]],
        );
        let first = check_unique(&table, "employee_id");
        let second = check_unique(&table, "employee_id");
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
