//! Database loading for deptseed.
//!
//! A [`Backend`] owns exactly one connection. The [`Loader`] drives it
//! sequentially: schema preparation, departments, then employees.

pub mod backend;
pub mod dialect;
pub mod errors;
pub mod loader;
pub mod memory;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod options;
pub mod postgres;
pub mod report;
pub mod target;

pub use backend::{Backend, EmployeeInsert};
pub use dialect::Dialect;
pub use errors::LoadError;
pub use loader::{Loader, seed};
pub use memory::{MemoryBackend, MemoryHandle};
#[cfg(feature = "odbc")]
pub use odbc::OdbcBackend;
pub use options::{CommitMode, LoadOptions, OnRowError, SchemaMode};
pub use postgres::PostgresBackend;
pub use report::{LoadIssue, LoadReport, LoadStatus, TableLoad};
pub use target::{Target, connect};
