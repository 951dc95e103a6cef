use thiserror::Error;

use deptseed_core::SeedError;

use crate::report::LoadReport;

/// Errors emitted while loading a run.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failure before any row was sent (arguments, connection, schema).
    #[error(transparent)]
    Seed(#[from] SeedError),
    /// Failure after loading started. The report accounts for every insert
    /// that was performed, and whether it survived.
    #[error("load failed after {} inserted rows: {source}", .report.inserted_total())]
    Failed {
        source: SeedError,
        report: Box<LoadReport>,
    },
}

impl LoadError {
    /// The underlying taxonomy entry.
    pub fn seed_error(&self) -> &SeedError {
        match self {
            LoadError::Seed(err) => err,
            LoadError::Failed { source, .. } => source,
        }
    }

    pub fn report(&self) -> Option<&LoadReport> {
        match self {
            LoadError::Seed(_) => None,
            LoadError::Failed { report, .. } => Some(report),
        }
    }
}
