//! Case-count CSV reader configuration and orchestration.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cases::CaseSeries;
use crate::error::IoError;

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading one region's cumulative case counts.
///
/// The input CSV has a header row with the columns `date` (ISO
/// `YYYY-MM-DD`), `region` and `cumulative`. Both ends of the date range
/// are inclusive; an unset end is open.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Region identifier to select.
    region: String,
    /// First date to keep.
    start: Option<NaiveDate>,
    /// Last date to keep.
    end: Option<NaiveDate>,
}

impl ReaderConfig {
    /// Selects every row for `region`.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            start: None,
            end: None,
        }
    }

    /// Set the first date to keep.
    pub fn with_start(mut self, start: Option<NaiveDate>) -> Self {
        self.start = start;
        self
    }

    /// Set the last date to keep.
    pub fn with_end(mut self, end: Option<NaiveDate>) -> Self {
        self.end = end;
        self
    }

    /// Returns the region identifier.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the first date kept, if bounded.
    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Returns the last date kept, if bounded.
    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the region is blank or the range
    /// is reversed.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.region.trim().is_empty() {
            return Err(IoError::Validation {
                count: 1,
                details: "region must not be empty".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(IoError::Validation {
                count: 1,
                details: format!("start date {start} is after end date {end}"),
            });
        }
        Ok(())
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    fn range_label(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        format!("{}..={}", fmt(self.start), fmt(self.end))
    }
}

/// One CSV row.
#[derive(Debug, Deserialize)]
struct CaseRow {
    date: NaiveDate,
    region: String,
    cumulative: f64,
}

// ---------------------------------------------------------------------------
// read_cases
// ---------------------------------------------------------------------------

/// Read one region's cumulative case counts from a CSV file.
///
/// Rows for other regions are ignored. Selected rows are sorted by date
/// and validated as a [`CaseSeries`].
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::Validation`] | invalid config, or duplicate/missing days or bad counts |
/// | [`IoError::FileNotFound`] | `path` does not exist |
/// | [`IoError::Csv`] | unreadable file or malformed row |
/// | [`IoError::UnknownRegion`] | no row carries the region |
/// | [`IoError::EmptyRange`] | the region has no row in the date range |
pub fn read_cases(path: &Path, config: &ReaderConfig) -> Result<CaseSeries, IoError> {
    config.validate()?;
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut region_seen = false;
    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    let mut total = 0usize;
    for record in reader.deserialize::<CaseRow>() {
        let row = record?;
        total += 1;
        if row.region != config.region {
            continue;
        }
        region_seen = true;
        if config.contains(row.date) {
            rows.push((row.date, row.cumulative));
        }
    }
    debug!(path = %path.display(), total, selected = rows.len(), "scanned case file");

    if !region_seen {
        return Err(IoError::UnknownRegion {
            region: config.region.clone(),
            path: path.to_path_buf(),
        });
    }
    if rows.is_empty() {
        return Err(IoError::EmptyRange {
            region: config.region.clone(),
            range: config.range_label(),
        });
    }

    rows.sort_by_key(|(date, _)| *date);
    let (dates, cumulative): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();
    let series = CaseSeries::new(config.region.clone(), dates, cumulative)?;

    info!(
        region = %config.region,
        days = series.len(),
        first = %series.dates()[0],
        last = %series.dates()[series.len() - 1],
        "read case series"
    );
    Ok(series)
}
