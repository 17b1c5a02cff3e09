//! The layered rule system: each checker is a pure function over immutable
//! inputs producing its own issue list; the engine merges the lists.

pub mod anomaly;
pub mod categorized;
pub mod consistency;
pub mod schema;
pub mod thresholds;

pub use categorized::{CategorizedDetector, CategorizedEntry, CategorizedInput, CategorizedReport};
pub use thresholds::{MetricMap, ThresholdOutcome, ThresholdValidator};
