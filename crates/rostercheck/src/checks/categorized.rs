//! Categorized error detection for external reporting.
//!
//! Re-expresses the structural and logical checks into six fixed reporting
//! categories. The output is a plain nested structure (strings and lists
//! only) so the reporting layer serializes it unchanged.

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dates::{DateParser, ParsedDate};
use crate::issue::IssueSummary;
use crate::table::RecordTable;

/// Inputs for one categorized detection pass.
///
/// Absent optional inputs silently skip the categories that need them; they
/// never abort the run.
#[derive(Clone, Copy)]
pub struct CategorizedInput<'a> {
    /// The employee roster.
    pub roster: &'a RecordTable,
    /// Attendance log; required for the attendance-logic category.
    pub attendance: Option<&'a RecordTable>,
    /// Reporting reference date; required for future-date temporal checks.
    pub as_of: Option<NaiveDate>,
    /// Accepted group names; required for the group-assignment category.
    pub valid_groups: Option<&'a HashSet<String>>,
}

/// One categorized finding, in external-consumer shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedEntry {
    /// Stable row identity: the employee id when present, else `row <n>`.
    pub row_key: String,
    /// Human label for the finding.
    pub label: String,
    /// Reporting category (one of the six fixed names).
    pub category: String,
    /// Severity wire name: critical, warning, or info.
    pub severity: String,
    /// Offending field.
    pub field: String,
    /// Observed value.
    pub observed: String,
    /// Expected value or condition.
    pub expected: String,
    /// Short remediation hint.
    pub remediation: String,
}

/// Findings grouped into the six fixed reporting categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedReport {
    pub temporal: Vec<CategorizedEntry>,
    pub classification: Vec<CategorizedEntry>,
    pub position: Vec<CategorizedEntry>,
    pub group_assignment: Vec<CategorizedEntry>,
    pub attendance_logic: Vec<CategorizedEntry>,
    pub duplicate: Vec<CategorizedEntry>,
    /// Counts over all six lists.
    pub summary: IssueSummary,
}

impl CategorizedReport {
    fn all_entries(&self) -> impl Iterator<Item = &CategorizedEntry> {
        self.temporal
            .iter()
            .chain(&self.classification)
            .chain(&self.position)
            .chain(&self.group_assignment)
            .chain(&self.attendance_logic)
            .chain(&self.duplicate)
    }

    fn finalize(mut self) -> Self {
        // Single pass over every list.
        let mut summary = IssueSummary::default();
        for entry in self.all_entries() {
            summary.total += 1;
            match entry.severity.as_str() {
                "critical" => summary.critical += 1,
                "warning" => summary.warning += 1,
                _ => summary.info += 1,
            }
        }
        self.summary = summary;
        self
    }
}

/// Detector over the six fixed reporting categories.
pub struct CategorizedDetector<'a> {
    config: &'a EngineConfig,
    parser: &'a dyn DateParser,
}

impl<'a> CategorizedDetector<'a> {
    pub fn new(config: &'a EngineConfig, parser: &'a dyn DateParser) -> Self {
        Self { config, parser }
    }

    /// Run all categories whose inputs are present.
    pub fn detect(&self, input: CategorizedInput<'_>) -> CategorizedReport {
        let report = CategorizedReport {
            temporal: self.detect_temporal(input.roster, input.as_of),
            classification: self.detect_classification(input.roster),
            position: self.detect_position(input.roster),
            group_assignment: self.detect_group_assignment(input.roster, input.valid_groups),
            attendance_logic: input
                .attendance
                .map(|t| self.detect_attendance_logic(t))
                .unwrap_or_default(),
            duplicate: self.detect_duplicates(input.roster),
            summary: IssueSummary::default(),
        };
        report.finalize()
    }

    fn row_key(&self, table: &RecordTable, row: usize) -> String {
        let id = table.value(row, &self.config.roster.id).unwrap_or("");
        if RecordTable::is_null_value(id) {
            format!("row {row}")
        } else {
            id.trim().to_string()
        }
    }

    fn detect_temporal(&self, roster: &RecordTable, as_of: Option<NaiveDate>) -> Vec<CategorizedEntry> {
        let entrance = &self.config.roster.entrance_date;
        let stop = &self.config.roster.stop_date;
        let mut entries = Vec::new();

        for row in 0..roster.row_count() {
            let mut parsed = IndexMap::new();
            for field in [entrance, stop] {
                let Some(cell) = roster.value(row, field) else {
                    continue;
                };
                if RecordTable::is_null_value(cell) {
                    continue;
                }
                match self.parser.parse(cell) {
                    ParsedDate::Date(date) => {
                        parsed.insert(field.clone(), date);
                    }
                    ParsedDate::Unparsable => entries.push(CategorizedEntry {
                        row_key: self.row_key(roster, row),
                        label: "Unreadable date".into(),
                        category: "temporal".into(),
                        severity: "critical".into(),
                        field: field.clone(),
                        observed: cell.trim().into(),
                        expected: "a parseable calendar date".into(),
                        remediation: "normalize the date format in the source export".into(),
                    }),
                }
            }

            if let (Some(start), Some(end)) = (parsed.get(entrance), parsed.get(stop)) {
                if start > end {
                    entries.push(CategorizedEntry {
                        row_key: self.row_key(roster, row),
                        label: "Entrance after stop date".into(),
                        category: "temporal".into(),
                        severity: "critical".into(),
                        field: entrance.clone(),
                        observed: format!("{start} > {end}"),
                        expected: format!("'{entrance}' on or before '{stop}'"),
                        remediation: "check both dates against the personnel file".into(),
                    });
                }
            }

            if let Some(as_of) = as_of {
                for (field, date) in &parsed {
                    if *date > as_of {
                        entries.push(CategorizedEntry {
                            row_key: self.row_key(roster, row),
                            label: "Date in the future".into(),
                            category: "temporal".into(),
                            severity: "warning".into(),
                            field: field.clone(),
                            observed: date.to_string(),
                            expected: format!("on or before {as_of}"),
                            remediation: "confirm whether the record was entered ahead of time".into(),
                        });
                    }
                }
            }
        }

        entries
    }

    fn detect_classification(&self, roster: &RecordTable) -> Vec<CategorizedEntry> {
        let field = &self.config.roster.classification;
        let valid = &self.config.valid_classifications;
        let Some(values) = roster.column_values(field) else {
            return Vec::new();
        };

        let cells: Vec<String> = values.map(str::to_string).collect();
        let mut entries = Vec::new();
        for (row, cell) in cells.iter().enumerate() {
            if RecordTable::is_null_value(cell) {
                entries.push(CategorizedEntry {
                    row_key: self.row_key(roster, row),
                    label: "Classification missing".into(),
                    category: "classification".into(),
                    severity: "warning".into(),
                    field: field.clone(),
                    observed: String::new(),
                    expected: "a classification value".into(),
                    remediation: "set the employment classification in the HR system".into(),
                });
            } else if !valid.is_empty() && !valid.iter().any(|v| v == cell.trim()) {
                entries.push(CategorizedEntry {
                    row_key: self.row_key(roster, row),
                    label: "Unknown classification".into(),
                    category: "classification".into(),
                    severity: "warning".into(),
                    field: field.clone(),
                    observed: cell.trim().into(),
                    expected: format!("one of {valid:?}"),
                    remediation: "map the value onto an accepted classification".into(),
                });
            }
        }
        entries
    }

    fn detect_position(&self, roster: &RecordTable) -> Vec<CategorizedEntry> {
        let field = &self.config.roster.position;
        let Some(values) = roster.column_values(field) else {
            return Vec::new();
        };

        let cells: Vec<String> = values.map(str::to_string).collect();
        cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| RecordTable::is_null_value(cell))
            .map(|(row, _)| CategorizedEntry {
                row_key: self.row_key(roster, row),
                label: "Position missing".into(),
                category: "position".into(),
                severity: "warning".into(),
                field: field.clone(),
                observed: String::new(),
                expected: "a position or role title".into(),
                remediation: "assign the employee a position in the HR system".into(),
            })
            .collect()
    }

    fn detect_group_assignment(
        &self,
        roster: &RecordTable,
        valid_groups: Option<&HashSet<String>>,
    ) -> Vec<CategorizedEntry> {
        let Some(valid_groups) = valid_groups else {
            return Vec::new(); // no group structure supplied
        };
        let field = &self.config.roster.group;
        let Some(values) = roster.column_values(field) else {
            return Vec::new();
        };

        let cells: Vec<String> = values.map(str::to_string).collect();
        let mut entries = Vec::new();
        for (row, cell) in cells.iter().enumerate() {
            if RecordTable::is_null_value(cell) {
                entries.push(CategorizedEntry {
                    row_key: self.row_key(roster, row),
                    label: "No group assigned".into(),
                    category: "group_assignment".into(),
                    severity: "warning".into(),
                    field: field.clone(),
                    observed: String::new(),
                    expected: "an organizational group".into(),
                    remediation: "assign the employee to a group".into(),
                });
            } else if !valid_groups.contains(cell.trim()) {
                entries.push(CategorizedEntry {
                    row_key: self.row_key(roster, row),
                    label: "Unknown group".into(),
                    category: "group_assignment".into(),
                    severity: "warning".into(),
                    field: field.clone(),
                    observed: cell.trim().into(),
                    expected: "a group from the organizational structure".into(),
                    remediation: "correct the group name or update the structure".into(),
                });
            }
        }
        entries
    }

    fn detect_attendance_logic(&self, attendance: &RecordTable) -> Vec<CategorizedEntry> {
        let present_field = &self.config.attendance.days_present;
        let scheduled_field = &self.config.attendance.days_scheduled;
        if !attendance.has_column(present_field) || !attendance.has_column(scheduled_field) {
            return Vec::new();
        }

        let mut entries = Vec::new();
        for row in 0..attendance.row_count() {
            let key = {
                let id = attendance.value(row, &self.config.attendance.id).unwrap_or("");
                if RecordTable::is_null_value(id) {
                    format!("row {row}")
                } else {
                    id.trim().to_string()
                }
            };

            let mut numbers = Vec::new();
            let mut readable = true;
            for field in [present_field, scheduled_field] {
                let cell = attendance.value(row, field).unwrap_or("");
                if RecordTable::is_null_value(cell) {
                    readable = false;
                    continue;
                }
                match cell.trim().parse::<f64>() {
                    Ok(n) => numbers.push(n),
                    Err(_) => {
                        readable = false;
                        entries.push(CategorizedEntry {
                            row_key: key.clone(),
                            label: "Unreadable day count".into(),
                            category: "attendance_logic".into(),
                            severity: "critical".into(),
                            field: field.clone(),
                            observed: cell.trim().into(),
                            expected: "a numeric day count".into(),
                            remediation: "correct the cell to a plain number".into(),
                        });
                    }
                }
            }
            if !readable || numbers.len() != 2 {
                continue;
            }
            let (present, scheduled) = (numbers[0], numbers[1]);

            if scheduled == 0.0 && present > 0.0 {
                entries.push(CategorizedEntry {
                    row_key: key,
                    label: "Present with zero scheduled days".into(),
                    category: "attendance_logic".into(),
                    severity: "warning".into(),
                    field: scheduled_field.clone(),
                    observed: format!("present {present}, scheduled 0"),
                    expected: "scheduled days > 0 when presence is recorded".into(),
                    remediation: "fill in the scheduled total for the period".into(),
                });
            } else if present > scheduled {
                entries.push(CategorizedEntry {
                    row_key: key,
                    label: "More days present than scheduled".into(),
                    category: "attendance_logic".into(),
                    severity: "critical".into(),
                    field: present_field.clone(),
                    observed: format!("present {present}, scheduled {scheduled}"),
                    expected: "days present <= days scheduled".into(),
                    remediation: "recount the period; presence cannot exceed the schedule".into(),
                });
            }
        }
        entries
    }

    fn detect_duplicates(&self, roster: &RecordTable) -> Vec<CategorizedEntry> {
        let field = &self.config.roster.id;
        let Some(values) = roster.column_values(field) else {
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
            .map(|(value, rows)| CategorizedEntry {
                row_key: value.clone(),
                label: "Duplicate employee id".into(),
                category: "duplicate".into(),
                severity: "critical".into(),
                field: field.clone(),
                observed: format!("{} occurrences (rows {rows:?})", rows.len()),
                expected: "each employee id at most once".into(),
                remediation: "merge or delete the duplicated records".into(),
            })
            .collect()
    }
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

    fn roster() -> RecordTable {
        make_table(
            vec![
                "employee_id",
                "entrance_date",
                "stop_date",
                "classification",
                "position",
                "group",
            ],
            vec![
                vec!["E001", "2025-03-01", "2025-01-01", "permanent", "Analyst", "Finance"],
                vec!["E002", "2024-01-15", "", "", "", "Ops"],
                vec!["E001", "2024-02-01", "", "permanent", "Clerk", "Ghost Team"],
            ],
        )
    }

    fn config() -> EngineConfig {
        EngineConfig {
            valid_classifications: vec!["permanent".into(), "contract".into()],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_all_categories_with_full_input() {
        let config = config();
        let parser = StrictDateParser::default();
        let detector = CategorizedDetector::new(&config, &parser);

        let attendance = make_table(
            vec!["employee_id", "days_present", "days_scheduled"],
            vec![vec!["E001", "25", "20"], vec!["E002", "18", "20"]],
        );
        let groups: HashSet<String> = ["Finance".to_string(), "Ops".to_string()].into();
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let r = roster();

        let report = detector.detect(CategorizedInput {
            roster: &r,
            attendance: Some(&attendance),
            as_of: Some(as_of),
            valid_groups: Some(&groups),
        });

        assert_eq!(report.temporal.len(), 1); // entrance after stop
        assert_eq!(report.temporal[0].severity, "critical");
        assert_eq!(report.classification.len(), 1); // E002 blank
        assert_eq!(report.position.len(), 1); // E002 blank
        assert_eq!(report.group_assignment.len(), 1); // Ghost Team
        assert_eq!(report.attendance_logic.len(), 1); // 25 > 20
        assert_eq!(report.duplicate.len(), 1); // E001 twice
        assert_eq!(report.duplicate[0].row_key, "E001");

        assert_eq!(
            report.summary.total,
            report.summary.critical + report.summary.warning + report.summary.info
        );
        assert_eq!(report.summary.total, 6);
    }

    #[test]
    fn test_optional_inputs_skip_categories() {
        let config = config();
        let parser = StrictDateParser::default();
        let detector = CategorizedDetector::new(&config, &parser);
        let r = roster();

        let report = detector.detect(CategorizedInput {
            roster: &r,
            attendance: None,
            as_of: None,
            valid_groups: None,
        });

        assert!(report.attendance_logic.is_empty());
        assert!(report.group_assignment.is_empty());
        // Temporal ordering still runs without an as-of date.
        assert_eq!(report.temporal.len(), 1);
    }

    #[test]
    fn test_attendance_equality_not_flagged() {
        let config = config();
        let parser = StrictDateParser::default();
        let detector = CategorizedDetector::new(&config, &parser);

        let roster = make_table(vec!["employee_id"], vec![vec!["E001"]]);
        let attendance = make_table(
            vec!["employee_id", "days_present", "days_scheduled"],
            vec![vec!["E001", "20", "20"]],
        );

        let report = detector.detect(CategorizedInput {
            roster: &roster,
            attendance: Some(&attendance),
            as_of: None,
            valid_groups: None,
        });
        assert!(report.attendance_logic.is_empty());
    }

    #[test]
    fn test_report_serializes_plain() {
        let config = config();
        let parser = StrictDateParser::default();
        let detector = CategorizedDetector::new(&config, &parser);
        let r = roster();

        let report = detector.detect(CategorizedInput {
            roster: &r,
            attendance: None,
            as_of: None,
            valid_groups: None,
        });
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["temporal"].is_array());
        assert!(value["summary"]["total"].is_number());
    }
}
