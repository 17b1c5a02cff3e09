//! Field and schema checks: column presence, required fields, numeric
//! well-formedness.

use serde_json::json;

use crate::issue::{IssueCategory, Severity, ValidationIssue};
use crate::table::RecordTable;

/// One critical issue per required column missing from the table.
///
/// A missing column short-circuits every per-row check referencing it: the
/// row-level checks skip absent columns silently, so the single schema issue
/// is the only report for that column.
pub fn check_schema(table: &RecordTable, required_columns: &[String]) -> Vec<ValidationIssue> {
    required_columns
        .iter()
        .filter(|column| !table.has_column(column))
        .map(|column| {
            ValidationIssue::new(
                IssueCategory::Schema,
                Severity::Critical,
                format!("required column '{column}' is missing from the dataset"),
            )
            .with_field(column.clone())
            .with_expected(format!("a column named '{column}'"))
            .with_remediation("re-export the dataset with the full column set")
        })
        .collect()
}

/// One critical issue per (row, field) where a required field is null/blank.
pub fn check_required_fields(table: &RecordTable, fields: &[String]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field in fields {
        let Some(values) = table.column_values(field) else {
            continue; // covered by check_schema
        };
        for (row, value) in values.enumerate() {
            if RecordTable::is_null_value(value) {
                issues.push(
                    ValidationIssue::new(
                        IssueCategory::RequiredField,
                        Severity::Critical,
                        format!("required field '{field}' is null in row {row}"),
                    )
                    .with_row(row)
                    .with_field(field.clone())
                    .with_observed(json!(value))
                    .with_expected("a non-empty value")
                    .with_remediation("fill in the missing value in the source system"),
                );
            }
        }
    }

    issues
}

/// Numeric well-formedness and sign over non-negative count columns.
///
/// An unparsable non-null cell is critical `invalid_numeric`; a parsed
/// negative value is critical `negative_value`.
pub fn check_numeric(table: &RecordTable, columns: &[String]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for column in columns {
        let Some(values) = table.column_values(column) else {
            continue; // covered by check_schema
        };
        for (row, value) in values.enumerate() {
            if RecordTable::is_null_value(value) {
                continue;
            }
            match value.trim().parse::<f64>() {
                Err(_) => issues.push(
                    ValidationIssue::new(
                        IssueCategory::InvalidNumeric,
                        Severity::Critical,
                        format!("'{}' in column '{column}' is not a number", value.trim()),
                    )
                    .with_row(row)
                    .with_field(column.clone())
                    .with_observed(json!(value.trim()))
                    .with_expected("a numeric value")
                    .with_remediation("correct the cell to a plain number"),
                ),
                Ok(number) if number < 0.0 => issues.push(
                    ValidationIssue::new(
                        IssueCategory::NegativeValue,
                        Severity::Critical,
                        format!("column '{column}' holds negative value {number} in row {row}"),
                    )
                    .with_row(row)
                    .with_field(column.clone())
                    .with_observed(json!(number))
                    .with_expected("a value >= 0")
                    .with_remediation("counts cannot be negative; fix the source record"),
                ),
                Ok(_) => {}
            }
        }
    }

    issues
}
