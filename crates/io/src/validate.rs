//! Accumulated validation utilities.
//!
//! Provides [`ValidationCollector`] for gathering multiple validation errors
//! into a single [`IoError::Validation`], plus standalone helpers that check
//! the invariants of a daily case-count series.

use chrono::NaiveDate;

use crate::error::IoError;

// ---------------------------------------------------------------------------
// ValidationCollector
// ---------------------------------------------------------------------------

/// Accumulates validation errors and converts them into a single
/// [`IoError::Validation`].
///
/// Create a collector, push zero or more error messages, then call
/// [`finish`](Self::finish) to obtain `Ok(())` when everything is valid or a
/// single `Err` that summarises every violation.
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Moves every error recorded by `other` into this collector.
    pub(crate) fn extend(&mut self, other: ValidationCollector) {
        self.errors.extend(other.errors);
    }

    /// Returns `true` when no errors have been recorded.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or `Err(IoError::Validation { count, details })` otherwise.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), IoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Standalone validation helpers
// ---------------------------------------------------------------------------

/// Check that the value column has one entry per date.
pub(crate) fn validate_lengths(dates_len: usize, values_len: usize) -> ValidationCollector {
    let mut c = ValidationCollector::new();
    if dates_len != values_len {
        c.push(format!(
            "dates length {dates_len} != values length {values_len}"
        ));
    }
    c
}

/// Check that sorted `dates` step by exactly one day.
///
/// Records one message per duplicate and one per gap.
pub(crate) fn validate_daily_dates(dates: &[NaiveDate]) -> ValidationCollector {
    let mut c = ValidationCollector::new();

    for pair in dates.windows(2) {
        let step = (pair[1] - pair[0]).num_days();
        if step == 0 {
            c.push(format!("duplicate date {}", pair[1]));
        } else if step > 1 {
            c.push(format!(
                "gap of {} day(s) between {} and {}",
                step - 1,
                pair[0],
                pair[1]
            ));
        } else if step < 0 {
            c.push(format!("date {} precedes {}", pair[1], pair[0]));
        }
    }

    c
}

/// Check that every count is finite and non-negative.
///
/// Records one message per offending date.
pub(crate) fn validate_counts(dates: &[NaiveDate], counts: &[f64]) -> ValidationCollector {
    let mut c = ValidationCollector::new();

    for (date, &val) in dates.iter().zip(counts) {
        if !val.is_finite() {
            c.push(format!("non-finite count at {date}: {val}"));
        } else if val < 0.0 {
            c.push(format!("negative count at {date}: {val}"));
        }
    }

    c
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
