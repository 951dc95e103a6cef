use deptseed_core::{Result, SeedError};

use crate::backend::Backend;
use crate::memory::{MemoryBackend, MemoryHandle};
use crate::options::LoadOptions;
use crate::postgres::PostgresBackend;

/// Where a run's rows go, detected from the connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Odbc(String),
    Postgres(String),
    Memory,
}

impl Target {
    pub fn detect(conn: &str) -> Result<Self> {
        let trimmed = conn.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            Ok(Target::Postgres(trimmed.to_string()))
        } else if trimmed == "memory:" || trimmed == "memory" {
            Ok(Target::Memory)
        } else if trimmed.contains('=') {
            Ok(Target::Odbc(trimmed.to_string()))
        } else {
            Err(SeedError::UnsupportedTarget(
                deptseed_core::redact_connection_string(trimmed).redacted,
            ))
        }
    }

    pub fn engine(&self) -> &'static str {
        match self {
            Target::Odbc(_) => "odbc",
            Target::Postgres(_) => "postgres",
            Target::Memory => "memory",
        }
    }
}

/// Open the single connection a run uses. Failure here is fatal.
pub async fn connect(target: &Target, options: &LoadOptions) -> Result<Box<dyn Backend>> {
    match target {
        #[cfg(feature = "odbc")]
        Target::Odbc(conn) => Ok(Box::new(crate::odbc::OdbcBackend::connect(
            conn,
            options.connect_timeout_secs,
        )?)),
        #[cfg(not(feature = "odbc"))]
        Target::Odbc(_) => Err(SeedError::UnsupportedTarget(
            "odbc support was not compiled in (enable the `odbc` feature)".to_string(),
        )),
        Target::Postgres(url) => Ok(Box::new(
            PostgresBackend::connect(url, options.connect_timeout_secs).await?,
        )),
        Target::Memory => Ok(Box::new(MemoryBackend::new(MemoryHandle::new()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_targets() {
        assert_eq!(
            Target::detect("postgres://user@localhost/db").expect("postgres"),
            Target::Postgres("postgres://user@localhost/db".to_string())
        );
        assert_eq!(Target::detect("memory:").expect("memory"), Target::Memory);
        let odbc = Target::detect(r"Driver={ODBC Driver 18 for SQL Server};Server=(localdb)\MSSQLLocalDB")
            .expect("odbc");
        assert_eq!(odbc.engine(), "odbc");
    }

    #[test]
    fn rejects_unknown_targets() {
        assert!(matches!(
            Target::detect("mysql:/nowhere"),
            Err(SeedError::UnsupportedTarget(_))
        ));
    }
}
