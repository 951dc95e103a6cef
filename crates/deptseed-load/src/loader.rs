use std::time::Instant;

use tracing::{info, warn};

use deptseed_core::{SeedData, SeedError, Table};

use crate::backend::{Backend, EmployeeInsert};
use crate::errors::LoadError;
use crate::options::{CommitMode, LoadOptions, OnRowError};
use crate::report::{LoadReport, LoadStatus};
use crate::target::{Target, connect};

/// Drives one backend through a load, strictly in order.
pub struct Loader<'a> {
    backend: &'a mut dyn Backend,
    options: LoadOptions,
}

impl<'a> Loader<'a> {
    pub fn new(backend: &'a mut dyn Backend, options: LoadOptions) -> Self {
        Self { backend, options }
    }

    pub async fn load(&mut self, data: &SeedData) -> Result<LoadReport, LoadError> {
        self.options.validate()?;
        data.validate_references()?;

        let start = Instant::now();
        let mut report = LoadReport::new(
            self.backend.engine(),
            self.options.schema_mode,
            self.options.commit,
        );
        for table in Table::ALL {
            report.table_mut(table).requested = data.rows(table) as u64;
        }

        info!(
            event = "load_started",
            engine = self.backend.engine(),
            schema_mode = %self.options.schema_mode,
            commit = %self.options.commit,
            departments = data.departments.len(),
            employees = data.employees.len()
        );

        self.backend.prepare_schema(self.options.schema_mode).await?;
        info!(event = "schema_prepared", mode = %self.options.schema_mode);

        if self.options.verify {
            for table in Table::ALL {
                report.table_mut(table).rows_before = Some(self.backend.count_rows(table).await?);
            }
        }

        if data.is_empty() {
            info!(event = "load_skipped", reason = "no rows requested");
        } else if let Err(err) = self.insert_all(data, &mut report).await {
            return Err(self.fail(err, report, start).await);
        }

        if self.options.verify {
            self.count_rows_after(&mut report).await;
        }

        report.status = LoadStatus::Completed;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            event = "load_finished",
            status = "success",
            inserted = report.inserted_total(),
            skipped = report.skipped_total(),
            duration_ms = report.duration_ms
        );
        Ok(report)
    }

    /// Rows are already in place at this point, so a failing count only
    /// leaves the load unverified.
    async fn count_rows_after(&mut self, report: &mut LoadReport) {
        for table in Table::ALL {
            match self.backend.count_rows(table).await {
                Ok(rows) => report.table_mut(table).rows_after = Some(rows),
                Err(err) => {
                    warn!(event = "verification_skipped", table = %table, error = %err);
                    for table in Table::ALL {
                        report.table_mut(table).rows_after = None;
                    }
                    return;
                }
            }
        }
        if report.verified() == Some(false) {
            warn!(event = "verification_mismatch", tables = ?report.tables);
        }
    }

    async fn insert_all(&mut self, data: &SeedData, report: &mut LoadReport) -> Result<(), SeedError> {
        if self.options.commit == CommitMode::Batch {
            self.backend.begin().await?;
        }

        let mut department_ids = Vec::with_capacity(data.departments.len());
        for (row, department) in data.departments.iter().enumerate() {
            match self.backend.insert_department(department).await {
                Ok(id) => {
                    report.table_mut(Table::Department).record_insert(id);
                    department_ids.push(Some(id));
                }
                Err(err) => {
                    self.skip_or_abort(report, Table::Department, row, err)?;
                    department_ids.push(None);
                }
            }
        }

        let mut employee_ids: Vec<Option<i64>> = Vec::with_capacity(data.employees.len());
        for (row, employee) in data.employees.iter().enumerate() {
            let department_id = department_ids.get(employee.department).copied().flatten();
            let chief_id = match employee.chief {
                None => Some(None),
                Some(chief) => employee_ids.get(chief).copied().flatten().map(Some),
            };

            let (Some(department_id), Some(chief_id)) = (department_id, chief_id) else {
                // only reachable after an earlier skip
                report.record_issue(
                    Table::Employee,
                    row,
                    "parent_skipped",
                    "department or chief was not inserted".to_string(),
                );
                employee_ids.push(None);
                continue;
            };

            let insert = EmployeeInsert {
                department_id,
                chief_id,
                name: &employee.name,
                email: &employee.email,
                salary: employee.salary,
                hire_date: employee.hire_date,
            };
            match self.backend.insert_employee(&insert).await {
                Ok(id) => {
                    report.table_mut(Table::Employee).record_insert(id);
                    employee_ids.push(Some(id));
                }
                Err(err) => {
                    self.skip_or_abort(report, Table::Employee, row, err)?;
                    employee_ids.push(None);
                }
            }
        }

        if self.options.commit == CommitMode::Batch {
            self.backend.commit().await?;
            info!(event = "batch_committed", rows = report.inserted_total());
        }
        Ok(())
    }

    fn skip_or_abort(
        &self,
        report: &mut LoadReport,
        table: Table,
        row: usize,
        err: SeedError,
    ) -> Result<(), SeedError> {
        let skippable = matches!(
            err,
            SeedError::ConstraintViolation(_) | SeedError::Database(_)
        );
        if self.options.on_error == OnRowError::Skip && skippable {
            warn!(event = "row_skipped", table = %table, row, kind = err.kind(), error = %err);
            report.record_issue(table, row, err.kind(), err.to_string());
            return Ok(());
        }
        Err(err)
    }

    async fn fail(&mut self, err: SeedError, mut report: LoadReport, start: Instant) -> LoadError {
        report.status = LoadStatus::Failed;
        if self.options.commit == CommitMode::Batch {
            // uncommitted rows are discarded with the connection even when
            // the rollback itself fails
            if let Err(rollback_err) = self.backend.rollback().await {
                warn!(event = "rollback_failed", error = %rollback_err);
            }
            report.status = LoadStatus::RolledBack;
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        warn!(
            event = "load_finished",
            status = ?report.status,
            kind = err.kind(),
            error = %err,
            inserted = report.inserted_total(),
            departments_kept = report.persisted_rows(Table::Department),
            employees_kept = report.persisted_rows(Table::Employee)
        );

        LoadError::Failed {
            source: err,
            report: Box::new(report),
        }
    }
}

/// Connect to `target`, load `data`, and release the connection on every path.
pub async fn seed(
    target: &Target,
    options: &LoadOptions,
    data: &SeedData,
) -> Result<LoadReport, LoadError> {
    options.validate()?;
    data.validate_references()?;

    let mut backend = connect(target, options).await?;
    info!(event = "connected", engine = backend.engine());

    let outcome = Loader::new(backend.as_mut(), options.clone()).load(data).await;

    if let Err(err) = backend.close().await {
        warn!(event = "close_failed", error = %err);
    } else {
        info!(event = "connection_closed");
    }
    outcome
}
