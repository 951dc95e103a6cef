use serde::{Deserialize, Serialize};

use deptseed_core::Table;

use crate::options::{CommitMode, SchemaMode};

/// Outcome of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Running,
    Completed,
    /// Stopped early; rows inserted so far were committed one by one.
    Failed,
    /// Stopped early inside a batch transaction. Nothing was kept, whether
    /// the rollback succeeded or the open transaction died with the
    /// connection.
    RolledBack,
}

/// Per-table counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoad {
    pub table: Table,
    pub requested: u64,
    pub inserted: u64,
    pub skipped: u64,
    pub first_id: Option<i64>,
    pub last_id: Option<i64>,
    pub rows_before: Option<u64>,
    pub rows_after: Option<u64>,
}

impl TableLoad {
    pub fn new(table: Table, requested: u64) -> Self {
        Self {
            table,
            requested,
            inserted: 0,
            skipped: 0,
            first_id: None,
            last_id: None,
            rows_before: None,
            rows_after: None,
        }
    }

    pub fn record_insert(&mut self, id: i64) {
        self.inserted += 1;
        self.first_id.get_or_insert(id);
        self.last_id = Some(id);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Whether the table grew by exactly the number of kept inserts. `None`
    /// when counts were not collected.
    pub fn verified(&self, persisted: u64) -> Option<bool> {
        match (self.rows_before, self.rows_after) {
            (Some(before), Some(after)) => Some(after.checked_sub(before) == Some(persisted)),
            _ => None,
        }
    }
}

/// A row that was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadIssue {
    pub table: Table,
    pub row: usize,
    pub code: String,
    pub message: String,
}

/// Report for a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub engine: String,
    pub schema_mode: SchemaMode,
    pub commit: CommitMode,
    pub status: LoadStatus,
    pub tables: Vec<TableLoad>,
    pub issues: Vec<LoadIssue>,
    pub duration_ms: u64,
}

impl LoadReport {
    pub fn new(engine: &str, schema_mode: SchemaMode, commit: CommitMode) -> Self {
        Self {
            engine: engine.to_string(),
            schema_mode,
            commit,
            status: LoadStatus::Running,
            tables: Table::ALL.iter().map(|t| TableLoad::new(*t, 0)).collect(),
            issues: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn table(&self, table: Table) -> &TableLoad {
        let idx = Table::ALL.iter().position(|t| *t == table).unwrap_or(0);
        &self.tables[idx]
    }

    pub fn table_mut(&mut self, table: Table) -> &mut TableLoad {
        let idx = Table::ALL.iter().position(|t| *t == table).unwrap_or(0);
        &mut self.tables[idx]
    }

    pub fn inserted_total(&self) -> u64 {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn skipped_total(&self) -> u64 {
        self.tables.iter().map(|t| t.skipped).sum()
    }

    /// Rows of `table` that remain in the database after this load.
    pub fn persisted_rows(&self, table: Table) -> u64 {
        match self.status {
            LoadStatus::RolledBack => 0,
            _ => self.table(table).inserted,
        }
    }

    /// `Some(false)` as soon as one table's row delta disagrees with the report.
    pub fn verified(&self) -> Option<bool> {
        let mut outcome = None;
        for table in &self.tables {
            match table.verified(self.persisted_rows(table.table)) {
                Some(false) => return Some(false),
                Some(true) => outcome = Some(true),
                None => {}
            }
        }
        outcome
    }

    pub fn record_issue(&mut self, table: Table, row: usize, code: &str, message: String) {
        self.table_mut(table).record_skip();
        self.issues.push(LoadIssue {
            table,
            row,
            code: code.to_string(),
            message,
        });
    }
}
