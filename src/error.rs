use std::path::PathBuf;

use thiserror::Error;

/// Failures in a required source table. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source table not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required column {column}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{} has no data rows", path.display())]
    Empty { path: PathBuf },

    #[error("no airports survived filtering in {}", path.display())]
    NoAirports { path: PathBuf },
}
