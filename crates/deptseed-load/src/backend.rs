use async_trait::async_trait;
use chrono::NaiveDate;

use deptseed_core::{Department, Result, Table};

use crate::options::SchemaMode;

/// Employee row with positional references already swapped for database ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInsert<'a> {
    pub department_id: i64,
    pub chief_id: Option<i64>,
    pub name: &'a str,
    pub email: &'a str,
    pub salary: i64,
    pub hire_date: NaiveDate,
}

/// A single open connection to a seed target.
///
/// Calls are issued one at a time; each completes or fails before the next
/// statement is sent.
#[async_trait(?Send)]
pub trait Backend {
    /// Returns the engine identifier (e.g. `odbc`, `postgres`).
    fn engine(&self) -> &'static str;

    /// Create, recreate or check the department and employee tables.
    async fn prepare_schema(&mut self, mode: SchemaMode) -> Result<()>;

    /// Switch off autocommit until [`Backend::commit`] or [`Backend::rollback`].
    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    /// Insert a department and return the id assigned by the database.
    async fn insert_department(&mut self, department: &Department) -> Result<i64>;

    /// Insert an employee and return the id assigned by the database.
    async fn insert_employee(&mut self, employee: &EmployeeInsert<'_>) -> Result<i64>;

    async fn count_rows(&mut self, table: Table) -> Result<u64>;

    /// Release the connection. Further calls fail with a connection error.
    async fn close(&mut self) -> Result<()>;
}
