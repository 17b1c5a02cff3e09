//! Date parsing interface.
//!
//! The consistency checks never interpret date strings themselves: they ask a
//! [`DateParser`] and treat [`ParsedDate::Unparsable`] as its own issue. The
//! ingestion layer can supply its own heuristic parser; [`StrictDateParser`]
//! covers the formats the upstream loaders normalize to.

use chrono::NaiveDate;

/// Outcome of parsing one date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// Successfully parsed calendar date.
    Date(NaiveDate),
    /// The cell holds a value the parser could not interpret as a date.
    Unparsable,
}

/// Parses a single cell value into a date or an explicit unparsable marker.
pub trait DateParser {
    fn parse(&self, value: &str) -> ParsedDate;
}

/// Default parser over a fixed list of unambiguous formats.
#[derive(Debug, Clone)]
pub struct StrictDateParser {
    formats: Vec<&'static str>,
}

impl Default for StrictDateParser {
    fn default() -> Self {
        Self {
            formats: vec!["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y"],
        }
    }
}

impl DateParser for StrictDateParser {
    fn parse(&self, value: &str) -> ParsedDate {
        let trimmed = value.trim();
        for format in &self.formats {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return ParsedDate::Date(date);
            }
        }
        ParsedDate::Unparsable
    }
}
