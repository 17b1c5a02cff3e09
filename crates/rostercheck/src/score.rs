//! Data quality scoring.

use serde::{Deserialize, Serialize};

/// Letter grade summarizing a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Map a 0-100 score to a letter grade. Fixed breakpoints, no
    /// interpolation.
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Grade::A
        } else if score >= 85.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

/// A 0-100 score and letter grade summarizing the fraction of validation
/// checks that passed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Percentage of checks that passed, one decimal.
    pub value: f64,
    /// Letter grade for `value`.
    pub grade: Grade,
    /// Checks that passed.
    #[serde(rename = "passed")]
    pub passed_checks: usize,
    /// Checks that ran.
    #[serde(rename = "total")]
    pub total_checks: usize,
}

impl QualityScore {
    /// Score from pass/total counts, rounded to one decimal.
    ///
    /// Zero configured checks means nothing failed: score 100.0.
    pub fn from_counts(passed_checks: usize, total_checks: usize) -> Self {
        debug_assert!(passed_checks <= total_checks);
        let value = if total_checks == 0 {
            100.0
        } else {
            (passed_checks as f64 / total_checks as f64 * 1000.0).round() / 10.0
        };
        Self {
            value,
            grade: Grade::from_score(value),
            passed_checks,
            total_checks,
        }
    }
}

/// Accumulator for pass/fail outcomes across one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCard {
    passed: usize,
    total: usize,
}

impl ScoreCard {
    /// Create an empty score card.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one passing check.
    pub fn record_pass(&mut self) {
        self.passed += 1;
        self.total += 1;
    }

    /// Record one failing check.
    pub fn record_fail(&mut self) {
        self.total += 1;
    }

    /// Record a check outcome.
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.record_pass();
        } else {
            self.record_fail();
        }
    }

    /// Fold another card into this one.
    pub fn merge(&mut self, other: ScoreCard) {
        self.passed += other.passed;
        self.total += other.total;
    }

    /// Fold pre-tallied counts into this card.
    pub fn add_counts(&mut self, passed: usize, total: usize) {
        debug_assert!(passed <= total);
        self.passed += passed;
        self.total += total;
    }

    /// Finalize into a score.
    pub fn score(&self) -> QualityScore {
        QualityScore::from_counts(self.passed, self.total)
    }
}
