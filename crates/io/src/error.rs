//! Error types for epicast-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the epicast-io crate.
///
/// Covers missing files, CSV parse and write failures, validation problems
/// in the case-count data, and region or date filters that select nothing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the csv crate (I/O, parsing or
    /// deserialisation).
    #[error("csv error: {reason}")]
    Csv {
        /// Description of the underlying CSV failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when the requested region never appears in the file.
    #[error("region '{region}' not found in {}", path.display())]
    UnknownRegion {
        /// Requested region identifier.
        region: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when the region exists but no row falls in the date range.
    #[error("no rows for region '{region}' in {range}")]
    EmptyRange {
        /// Requested region identifier.
        region: String,
        /// The requested date range, formatted.
        range: String,
    },
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv {
            reason: e.to_string(),
        }
    }
}
