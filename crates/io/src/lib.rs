//! # epicast-io
//!
//! Read date-indexed cumulative case counts from CSV and write forecast
//! tables back out. Bridges external files into the `&[f64]` slices the
//! ARIMA kernel works on.

mod cases;
mod error;
mod reader;
mod validate;
mod writer;

pub use cases::{CaseSeries, DailySeries};
pub use error::IoError;
pub use reader::{ReaderConfig, read_cases};
pub use writer::{ForecastRow, ForecastTable, level_label, write_forecast_csv};
