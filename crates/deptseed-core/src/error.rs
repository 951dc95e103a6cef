use thiserror::Error;

/// Error taxonomy shared across deptseed crates.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A row count or option combination was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The driver could not reach or authenticate against the target.
    #[error("connection error: {0}")]
    Connection(String),
    /// The database rejected a row (foreign key, not null, unique).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// Any other statement failure.
    #[error("database error: {0}")]
    Database(String),
    /// The generator could not produce a value that satisfies its rules.
    #[error("generation error: {0}")]
    Generation(String),
    /// The connection string does not match a known backend.
    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),
}

impl SeedError {
    /// Stable identifier used in run reports and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SeedError::InvalidArgument(_) => "invalid_argument",
            SeedError::Connection(_) => "connection",
            SeedError::ConstraintViolation(_) => "constraint_violation",
            SeedError::Database(_) => "database",
            SeedError::Generation(_) => "generation",
            SeedError::UnsupportedTarget(_) => "unsupported_target",
        }
    }
}

/// Convenience alias for results returned by deptseed crates.
pub type Result<T> = std::result::Result<T, SeedError>;
