//! Rostercheck: validation and anomaly-detection engine for tabular HR data.
//!
//! Periodically ingested HR datasets (employee roster, attendance logs) and
//! their derived summary metrics pass through a layered rule system that
//! decides whether the data is trustworthy enough to publish:
//!
//! - structural and per-field checks (columns, required fields, numbers)
//! - same-row and cross-dataset logical invariants
//! - categorized error detection for external reporting
//! - threshold and range validation of summary metrics
//! - statistical deviation from a historical baseline
//! - one aggregate quality score and letter grade
//!
//! # Core principles
//!
//! - **Read-only**: inputs are never mutated, corrected, or imputed
//! - **Issues, not exceptions**: malformed *data* becomes issues in the
//!   result; only misuse of the engine itself is an error
//! - **Injected configuration**: thresholds and column layouts are supplied
//!   by the caller, never embedded in check code
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use rostercheck::{EngineConfig, RecordTable, ValidationEngine};
//!
//! let engine = ValidationEngine::new(EngineConfig::default()).unwrap();
//! let roster = RecordTable::new(
//!     vec!["employee_id".into(), "entrance_date".into()],
//!     vec![vec!["E001".into(), "2024-01-01".into()]],
//! );
//! let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
//!
//! let result = engine.validate_roster(&roster, as_of).unwrap();
//! println!("passed: {}, issues: {}", result.passed, result.summary.total);
//! ```

pub mod checks;
pub mod config;
pub mod dates;
pub mod error;
pub mod issue;
pub mod score;
pub mod table;

mod engine;

pub use crate::checks::{
    CategorizedDetector, CategorizedEntry, CategorizedInput, CategorizedReport, MetricMap,
    ThresholdOutcome, ThresholdValidator,
};
pub use crate::config::{
    AnomalyBands, AttendanceColumns, EngineConfig, MetricRelationship, MetricThresholdRule,
    RelationshipKind, RosterColumns, ThresholdConfig,
};
pub use crate::dates::{DateParser, ParsedDate, StrictDateParser};
pub use crate::engine::{RunInput, ValidationEngine, ValidationReport};
pub use crate::error::{EngineError, Result};
pub use crate::issue::{IssueCategory, IssueSummary, Severity, ValidationIssue, ValidationResult};
pub use crate::score::{Grade, QualityScore, ScoreCard};
pub use crate::table::RecordTable;
