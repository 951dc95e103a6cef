use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Datelike;
use odbc_api::sys::Date;
use odbc_api::{
    Connection, ConnectionOptions, Cursor, Environment, IntoParameter, Nullable,
    ParameterCollectionRef,
};
use tracing::warn;

use deptseed_core::{Department, Result, SeedError, Table};

use crate::backend::{Backend, EmployeeInsert};
use crate::dialect::Dialect;
use crate::options::SchemaMode;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|err| SeedError::Connection(err.to_string()))?;
    // a concurrent initializer may have won; either environment is usable
    let _ = ENVIRONMENT.set(env);
    ENVIRONMENT
        .get()
        .ok_or_else(|| SeedError::Connection("odbc environment unavailable".to_string()))
}

/// Backend for SQL Server (or any T-SQL speaking driver) over ODBC.
pub struct OdbcBackend {
    conn: Option<Connection<'static>>,
    dialect: Dialect,
    in_transaction: bool,
}

impl OdbcBackend {
    /// Open a connection from an ODBC connection string.
    pub fn connect(connection_string: &str, login_timeout_sec: Option<u32>) -> Result<Self> {
        let env = environment()?;
        let options = ConnectionOptions {
            login_timeout_sec,
            ..ConnectionOptions::default()
        };
        let conn = env
            .connect_with_connection_string(connection_string, options)
            .map_err(|err| SeedError::Connection(err.to_string()))?;
        Ok(Self {
            conn: Some(conn),
            dialect: Dialect::TSql,
            in_transaction: false,
        })
    }

    fn conn(&self) -> Result<&Connection<'static>> {
        self.conn
            .as_ref()
            .ok_or_else(|| SeedError::Connection("connection is closed".to_string()))
    }

    fn execute(&self, sql: &str) -> Result<()> {
        self.conn()?
            .execute(sql, ())
            .map(|_| ())
            .map_err(classify)
    }

    fn query_i64(&self, sql: &str, params: impl ParameterCollectionRef) -> Result<i64> {
        let conn = self.conn()?;
        let mut cursor = conn
            .execute(sql, params)
            .map_err(classify)?
            .ok_or_else(|| SeedError::Database(format!("statement returned no result set: {sql}")))?;
        let mut row = cursor
            .next_row()
            .map_err(classify)?
            .ok_or_else(|| SeedError::Database(format!("statement returned no rows: {sql}")))?;
        let mut value = Nullable::<i64>::null();
        row.get_data(1, &mut value).map_err(classify)?;
        value
            .into_opt()
            .ok_or_else(|| SeedError::Database(format!("statement returned NULL: {sql}")))
    }
}

#[async_trait(?Send)]
impl Backend for OdbcBackend {
    fn engine(&self) -> &'static str {
        "odbc"
    }

    async fn prepare_schema(&mut self, mode: SchemaMode) -> Result<()> {
        match mode {
            SchemaMode::Keep => {
                for table in Table::ALL {
                    self.query_i64(&self.dialect.count_rows(table), ())?;
                }
            }
            SchemaMode::Create => {
                for table in Table::ALL {
                    self.execute(&self.dialect.create_table_if_missing(table))?;
                }
            }
            SchemaMode::Recreate => {
                for table in Table::ALL.iter().rev() {
                    if let Err(err) = self.execute(&self.dialect.drop_table(*table)) {
                        warn!(event = "drop_table_failed", table = %table, error = %err);
                    }
                }
                for table in Table::ALL {
                    self.execute(&self.dialect.create_table(table))?;
                }
            }
        }
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        self.conn()?.set_autocommit(false).map_err(classify)?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let conn = self.conn()?;
        conn.commit().map_err(classify)?;
        conn.set_autocommit(true).map_err(classify)?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let conn = self.conn()?;
        conn.rollback().map_err(classify)?;
        conn.set_autocommit(true).map_err(classify)?;
        self.in_transaction = false;
        Ok(())
    }

    async fn insert_department(&mut self, department: &Department) -> Result<i64> {
        let name = department.name.as_str().into_parameter();
        self.query_i64(self.dialect.insert(Table::Department), &name)
    }

    async fn insert_employee(&mut self, employee: &EmployeeInsert<'_>) -> Result<i64> {
        let chief_id = match employee.chief_id {
            Some(id) => Nullable::new(id),
            None => Nullable::null(),
        };
        let name = employee.name.into_parameter();
        let email = employee.email.into_parameter();
        let hire_date = Date {
            year: employee.hire_date.year() as i16,
            month: employee.hire_date.month() as u16,
            day: employee.hire_date.day() as u16,
        };
        self.query_i64(
            self.dialect.insert(Table::Employee),
            (
                &employee.department_id,
                &chief_id,
                &name,
                &email,
                &employee.salary,
                &hire_date,
            ),
        )
    }

    async fn count_rows(&mut self, table: Table) -> Result<u64> {
        let count = self.query_i64(&self.dialect.count_rows(table), ())?;
        Ok(count.max(0) as u64)
    }

    async fn close(&mut self) -> Result<()> {
        // dropping the connection disconnects; an open transaction is rolled back first
        let outcome = if self.in_transaction {
            self.rollback().await
        } else {
            Ok(())
        };
        self.conn = None;
        outcome
    }
}

fn classify(err: odbc_api::Error) -> SeedError {
    let message = err.to_string();
    let state = match &err {
        odbc_api::Error::Diagnostics { record, .. } => Some(record.state.as_str().to_string()),
        _ => None,
    };
    match state.as_deref() {
        Some(state) if state.starts_with("23") => SeedError::ConstraintViolation(message),
        Some(state) if state.starts_with("08") => SeedError::Connection(message),
        _ => SeedError::Database(message),
    }
}
