//! Core contracts and helpers for deptseed.
//!
//! This crate defines the seeded record shapes, row-count validation, the
//! shared error taxonomy and connection-string redaction used by the
//! generator, the loader and the CLI.

pub mod counts;
pub mod error;
pub mod records;
pub mod redaction;

pub use counts::{
    DEFAULT_DEPARTMENT_RANGE, DEFAULT_EMPLOYEE_RANGE, MAX_ROW_COUNT, RowCount, SeedCounts,
};
pub use error::{Result, SeedError};
pub use records::{
    Department, Employee, MAX_SALARY, MAX_TEXT_LEN, MIN_SALARY, SeedData, Table,
};
pub use redaction::{RedactedConnection, redact_connection_string};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 73;
