//! Date-indexed case-count series.

use chrono::NaiveDate;

use crate::error::IoError;
use crate::validate;

/// Cumulative case counts for one region, one value per consecutive day.
///
/// Construction validates the series: lengths match, dates step by exactly
/// one day, and counts are finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSeries {
    region: String,
    dates: Vec<NaiveDate>,
    cumulative: Vec<f64>,
}

impl CaseSeries {
    /// Creates a validated series. `dates` must already be sorted.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every violated check.
    pub fn new(
        region: impl Into<String>,
        dates: Vec<NaiveDate>,
        cumulative: Vec<f64>,
    ) -> Result<Self, IoError> {
        validate::validate_lengths(dates.len(), cumulative.len()).finish()?;

        let mut c = validate::validate_daily_dates(&dates);
        c.extend(validate::validate_counts(&dates, &cumulative));
        c.finish()?;

        Ok(Self {
            region: region.into(),
            dates,
            cumulative,
        })
    }

    /// Region identifier.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// One date per observation, consecutive days.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Cumulative counts.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when the series holds no days.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Daily new cases: first differences of the cumulative counts, dated
    /// by the later day of each pair.
    ///
    /// Reporting corrections can make individual values negative; they are
    /// kept as is.
    pub fn daily_new_cases(&self) -> DailySeries {
        let values = self.cumulative.windows(2).map(|w| w[1] - w[0]).collect();
        let dates = self.dates.iter().skip(1).copied().collect();
        DailySeries { dates, values }
    }
}

/// A dated daily series of new cases, possibly smoothed.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Dates, one per value.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no days.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last date of the series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Trailing rolling mean over `window` days; the window is clamped at
    /// the start of the series so the output keeps every date.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] when `window` is zero.
    pub fn smoothed(&self, window: usize) -> Result<DailySeries, IoError> {
        if window == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "smoothing window must be greater than 0".to_string(),
            });
        }
        Ok(DailySeries {
            dates: self.dates.clone(),
            values: epicast_stats::rolling_mean(&self.values, window),
        })
    }
}
