use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};

/// Column width for every text column.
pub const MAX_TEXT_LEN: usize = 100;
/// Lowest generated salary (inclusive).
pub const MIN_SALARY: i64 = 20_000;
/// Highest generated salary (inclusive).
pub const MAX_SALARY: i64 = 100_001;

/// Target tables, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Department,
    Employee,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Department, Table::Employee];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Department => "department",
            Table::Employee => "employee",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A department row before insertion. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
}

/// An employee row before insertion.
///
/// `department` indexes into [`SeedData::departments`] and `chief` indexes an
/// earlier entry of [`SeedData::employees`]; the loader swaps both for the
/// ids the database hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub email: String,
    pub salary: i64,
    pub hire_date: NaiveDate,
    pub department: usize,
    pub chief: Option<usize>,
}

/// Everything generated for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    pub departments: Vec<Department>,
    pub employees: Vec<Employee>,
}

impl SeedData {
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() && self.employees.is_empty()
    }

    pub fn rows(&self, table: Table) -> usize {
        match table {
            Table::Department => self.departments.len(),
            Table::Employee => self.employees.len(),
        }
    }

    /// Check that every positional reference resolves inside this data set.
    pub fn validate_references(&self) -> Result<()> {
        for (idx, employee) in self.employees.iter().enumerate() {
            if employee.department >= self.departments.len() {
                return Err(SeedError::InvalidArgument(format!(
                    "employee {idx} references department {} of {}",
                    employee.department,
                    self.departments.len()
                )));
            }
            if let Some(chief) = employee.chief
                && chief >= idx
            {
                return Err(SeedError::InvalidArgument(format!(
                    "employee {idx} references chief {chief} that is not inserted before it"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(department: usize, chief: Option<usize>) -> Employee {
        Employee {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            salary: MIN_SALARY,
            hire_date: NaiveDate::from_ymd_opt(2020, 5, 1).expect("valid date"),
            department,
            chief,
        }
    }

    #[test]
    fn accepts_backward_references() {
        let data = SeedData {
            departments: vec![Department {
                name: "Ops".to_string(),
            }],
            employees: vec![employee(0, None), employee(0, Some(0))],
        };
        assert!(data.validate_references().is_ok());
    }

    #[test]
    fn rejects_forward_chief_reference() {
        let data = SeedData {
            departments: vec![Department {
                name: "Ops".to_string(),
            }],
            employees: vec![employee(0, Some(1)), employee(0, None)],
        };
        assert!(matches!(
            data.validate_references(),
            Err(SeedError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_dangling_department() {
        let data = SeedData {
            departments: Vec::new(),
            employees: vec![employee(0, None)],
        };
        assert!(data.validate_references().is_err());
    }
}
