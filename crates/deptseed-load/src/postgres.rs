use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Connection, Executor, PgConnection};
use tracing::warn;

use deptseed_core::{Department, Result, SeedError, Table};

use crate::backend::{Backend, EmployeeInsert};
use crate::dialect::Dialect;
use crate::options::SchemaMode;

/// Backend for PostgreSQL databases.
#[derive(Debug)]
pub struct PostgresBackend {
    conn: Option<PgConnection>,
    dialect: Dialect,
    in_transaction: bool,
}

impl PostgresBackend {
    /// Open a single connection from a `postgres://` URL.
    pub async fn connect(url: &str, timeout_secs: Option<u32>) -> Result<Self> {
        let connecting = PgConnection::connect(url);
        let conn = match timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs.into()), connecting)
                .await
                .map_err(|_| SeedError::Connection(format!("timed out after {secs}s")))?,
            None => connecting.await,
        }
        .map_err(|err| SeedError::Connection(err.to_string()))?;

        Ok(Self {
            conn: Some(conn),
            dialect: Dialect::Postgres,
            in_transaction: false,
        })
    }

    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| SeedError::Connection("connection is closed".to_string()))
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn()?.execute(sql).await.map_err(classify)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl Backend for PostgresBackend {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn prepare_schema(&mut self, mode: SchemaMode) -> Result<()> {
        let dialect = self.dialect;
        match mode {
            SchemaMode::Keep => {
                for table in Table::ALL {
                    self.count_rows(table).await?;
                }
            }
            SchemaMode::Create => {
                for table in Table::ALL {
                    self.execute(&dialect.create_table_if_missing(table)).await?;
                }
            }
            SchemaMode::Recreate => {
                for table in Table::ALL.iter().rev() {
                    if let Err(err) = self.execute(&dialect.drop_table(*table)).await {
                        warn!(event = "drop_table_failed", table = %table, error = %err);
                    }
                }
                for table in Table::ALL {
                    self.execute(&dialect.create_table(table)).await?;
                }
            }
        }
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        self.execute("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.execute("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.execute("ROLLBACK").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn insert_department(&mut self, department: &Department) -> Result<i64> {
        let sql = self.dialect.insert(Table::Department);
        sqlx::query_scalar::<_, i64>(sql)
            .bind(&department.name)
            .fetch_one(self.conn()?)
            .await
            .map_err(classify)
    }

    async fn insert_employee(&mut self, employee: &EmployeeInsert<'_>) -> Result<i64> {
        let sql = self.dialect.insert(Table::Employee);
        let salary = i32::try_from(employee.salary).map_err(|_| {
            SeedError::InvalidArgument(format!("salary {} does not fit INTEGER", employee.salary))
        })?;
        sqlx::query_scalar::<_, i64>(sql)
            .bind(employee.department_id)
            .bind(employee.chief_id)
            .bind(employee.name)
            .bind(employee.email)
            .bind(salary)
            .bind(employee.hire_date)
            .fetch_one(self.conn()?)
            .await
            .map_err(classify)
    }

    async fn count_rows(&mut self, table: Table) -> Result<u64> {
        let sql = self.dialect.count_rows(table);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(self.conn()?)
            .await
            .map_err(classify)?;
        Ok(count.max(0) as u64)
    }

    async fn close(&mut self) -> Result<()> {
        let outcome = if self.in_transaction {
            self.rollback().await
        } else {
            Ok(())
        };
        if let Some(conn) = self.conn.take() {
            conn.close().await.map_err(classify)?;
        }
        outcome
    }
}

fn classify(err: sqlx::Error) -> SeedError {
    match err {
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            match db.code() {
                Some(code) if code.starts_with("23") => SeedError::ConstraintViolation(message),
                Some(code) if code.starts_with("08") => SeedError::Connection(message),
                _ => SeedError::Database(message),
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => SeedError::Connection(err.to_string()),
        other => SeedError::Database(other.to_string()),
    }
}
