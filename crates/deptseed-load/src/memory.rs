//! In-process target with identity columns and foreign key checks.
//!
//! Backs `--dry-run` and the loader tests. The tables live behind a shared
//! [`MemoryHandle`] so they can be inspected after the backend is closed.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use deptseed_core::{Department, Result, SeedError, Table};

use crate::backend::{Backend, EmployeeInsert};
use crate::options::SchemaMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDepartment {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEmployee {
    pub id: i64,
    pub department_id: i64,
    pub chief_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub salary: i64,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
struct MemoryDatabase {
    tables_exist: bool,
    departments: Vec<StoredDepartment>,
    employees: Vec<StoredEmployee>,
    department_identity: i64,
    employee_identity: i64,
    insert_statements: u64,
}

impl MemoryDatabase {
    fn require_tables(&self) -> Result<()> {
        if self.tables_exist {
            Ok(())
        } else {
            Err(SeedError::Database(
                "invalid object name 'department'".to_string(),
            ))
        }
    }
}

/// Shared view of an in-memory database.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle {
    db: Arc<Mutex<MemoryDatabase>>,
}

impl MemoryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle whose tables already exist and are empty.
    pub fn with_tables() -> Self {
        let handle = Self::new();
        if let Ok(mut db) = handle.db.lock() {
            db.tables_exist = true;
        }
        handle
    }

    pub fn departments(&self) -> Vec<StoredDepartment> {
        self.lock().map(|db| db.departments.clone()).unwrap_or_default()
    }

    pub fn employees(&self) -> Vec<StoredEmployee> {
        self.lock().map(|db| db.employees.clone()).unwrap_or_default()
    }

    pub fn tables_exist(&self) -> bool {
        self.lock().map(|db| db.tables_exist).unwrap_or(false)
    }

    /// Number of INSERT statements received, including rejected ones.
    pub fn insert_statements(&self) -> u64 {
        self.lock().map(|db| db.insert_statements).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryDatabase>> {
        self.db
            .lock()
            .map_err(|_| SeedError::Database("memory database lock poisoned".to_string()))
    }
}

/// [`Backend`] over a [`MemoryHandle`].
#[derive(Debug)]
pub struct MemoryBackend {
    handle: MemoryHandle,
    snapshot: Option<MemoryDatabase>,
    open: bool,
}

impl MemoryBackend {
    pub fn new(handle: MemoryHandle) -> Self {
        Self {
            handle,
            snapshot: None,
            open: true,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(SeedError::Connection("connection is closed".to_string()))
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, MemoryDatabase>> {
        self.ensure_open()?;
        self.handle.lock()
    }
}

#[async_trait(?Send)]
impl Backend for MemoryBackend {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn prepare_schema(&mut self, mode: SchemaMode) -> Result<()> {
        let mut db = self.db()?;
        match mode {
            SchemaMode::Keep => db.require_tables(),
            SchemaMode::Create => {
                db.tables_exist = true;
                Ok(())
            }
            SchemaMode::Recreate => {
                db.departments.clear();
                db.employees.clear();
                db.department_identity = 0;
                db.employee_identity = 0;
                db.tables_exist = true;
                Ok(())
            }
        }
    }

    async fn begin(&mut self) -> Result<()> {
        let snapshot = self.db()?.clone();
        self.snapshot = Some(snapshot);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let Some(mut snapshot) = self.snapshot.take() else {
            return Ok(());
        };
        let mut db = self.db()?;
        // identity values are not reused after a rollback
        snapshot.department_identity = db.department_identity;
        snapshot.employee_identity = db.employee_identity;
        snapshot.insert_statements = db.insert_statements;
        *db = snapshot;
        Ok(())
    }

    async fn insert_department(&mut self, department: &Department) -> Result<i64> {
        let mut db = self.db()?;
        db.insert_statements += 1;
        db.require_tables()?;

        if department.name.is_empty() || department.name.chars().count() > 100 {
            return Err(SeedError::ConstraintViolation(format!(
                "department name '{}' does not fit NVARCHAR(100) NOT NULL",
                department.name
            )));
        }

        db.department_identity += 1;
        let id = db.department_identity;
        db.departments.push(StoredDepartment {
            id,
            name: department.name.clone(),
        });
        Ok(id)
    }

    async fn insert_employee(&mut self, employee: &EmployeeInsert<'_>) -> Result<i64> {
        let mut db = self.db()?;
        db.insert_statements += 1;
        db.require_tables()?;

        if !db.departments.iter().any(|d| d.id == employee.department_id) {
            return Err(SeedError::ConstraintViolation(format!(
                "FOREIGN KEY employee.department_id: department {} does not exist",
                employee.department_id
            )));
        }
        if let Some(chief_id) = employee.chief_id
            && !db.employees.iter().any(|e| e.id == chief_id)
        {
            return Err(SeedError::ConstraintViolation(format!(
                "FOREIGN KEY employee.chief_id: employee {chief_id} does not exist"
            )));
        }

        db.employee_identity += 1;
        let id = db.employee_identity;
        db.employees.push(StoredEmployee {
            id,
            department_id: employee.department_id,
            chief_id: employee.chief_id,
            name: employee.name.to_string(),
            email: employee.email.to_string(),
            salary: employee.salary,
            hire_date: employee.hire_date,
        });
        Ok(id)
    }

    async fn count_rows(&mut self, table: Table) -> Result<u64> {
        let db = self.db()?;
        db.require_tables()?;
        Ok(match table {
            Table::Department => db.departments.len() as u64,
            Table::Employee => db.employees.len() as u64,
        })
    }

    async fn close(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            self.rollback().await?;
        }
        self.open = false;
        Ok(())
    }
}
