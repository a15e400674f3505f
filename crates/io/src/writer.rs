//! Forecast table CSV writer.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::IoError;
use crate::validate::ValidationCollector;

/// One forecast step.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    /// Calendar date of the step.
    pub date: NaiveDate,
    /// Step number, starting at 1.
    pub step: usize,
    /// Point forecast.
    pub point: f64,
    /// Forecast standard error.
    pub std_error: f64,
    /// `(lower, upper)` per level, in the table's level order.
    pub bounds: Vec<(f64, f64)>,
}

/// A forecast table: confidence levels plus one row per step.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    levels: Vec<f64>,
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Creates a table with the given interval levels.
    pub fn new(levels: Vec<f64>) -> Self {
        Self {
            levels,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: ForecastRow) {
        self.rows.push(row);
    }

    /// Interval levels.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Rows in step order.
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Header: `date,step,point,std_error` then `lower_L,upper_L` per level
    /// `L` in percent.
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["date", "step", "point", "std_error"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for &level in &self.levels {
            let label = level_label(level);
            header.push(format!("lower_{label}"));
            header.push(format!("upper_{label}"));
        }
        header
    }

    fn validate(&self) -> Result<(), IoError> {
        let mut c = ValidationCollector::new();
        for row in &self.rows {
            if row.bounds.len() != self.levels.len() {
                c.push(format!(
                    "step {} has {} bound pair(s), expected {}",
                    row.step,
                    row.bounds.len(),
                    self.levels.len()
                ));
            }
        }
        c.finish()
    }
}

/// Percent label for a level, e.g. `0.8 → "80"`, `0.975 → "97.5"`.
pub fn level_label(level: f64) -> String {
    let percent = (level * 100.0 * 1e6).round() / 1e6;
    format!("{percent}")
}

/// Write a forecast table to a CSV file.
///
/// # Errors
///
/// Returns [`IoError::Validation`] when a row's bound count does not match
/// the levels, or [`IoError::Csv`] when the file cannot be written.
pub fn write_forecast_csv(path: &Path, table: &ForecastTable) -> Result<(), IoError> {
    table.validate()?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.header())?;
    for row in &table.rows {
        let mut record = vec![
            row.date.to_string(),
            row.step.to_string(),
            row.point.to_string(),
            row.std_error.to_string(),
        ];
        for (lower, upper) in &row.bounds {
            record.push(lower.to_string());
            record.push(upper.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| IoError::Csv {
        reason: e.to_string(),
    })?;

    info!(path = %path.display(), rows = table.rows.len(), "wrote forecast table");
    Ok(())
}
