use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};

/// Upper bound accepted for a single table.
pub const MAX_ROW_COUNT: i64 = 1_000_000;
/// Department count drawn when none is requested.
pub const DEFAULT_DEPARTMENT_RANGE: RangeInclusive<u64> = 3..=10;
/// Employee count drawn when none is requested.
pub const DEFAULT_EMPLOYEE_RANGE: RangeInclusive<u64> = 10..=50;

/// A validated, non-negative number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct RowCount(u64);

impl RowCount {
    pub const ZERO: RowCount = RowCount(0);

    pub fn new(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(SeedError::InvalidArgument(format!(
                "row count must not be negative (got {value})"
            )));
        }
        if value > MAX_ROW_COUNT {
            return Err(SeedError::InvalidArgument(format!(
                "row count {value} exceeds the limit of {MAX_ROW_COUNT}"
            )));
        }
        Ok(Self(value as u64))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for RowCount {
    type Error = SeedError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RowCount> for u64 {
    fn from(value: RowCount) -> Self {
        value.0
    }
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many rows of each kind a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeedCounts {
    pub departments: RowCount,
    pub employees: RowCount,
}

impl SeedCounts {
    pub fn new(departments: RowCount, employees: RowCount) -> Result<Self> {
        if departments.is_zero() && !employees.is_zero() {
            return Err(SeedError::InvalidArgument(format!(
                "{employees} employees requested but no departments to assign them to"
            )));
        }
        Ok(Self {
            departments,
            employees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_counts() {
        let err = RowCount::new(-1).expect_err("negative count");
        assert!(matches!(err, SeedError::InvalidArgument(_)));
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn rejects_counts_above_limit() {
        assert!(RowCount::new(MAX_ROW_COUNT).is_ok());
        assert!(RowCount::new(MAX_ROW_COUNT + 1).is_err());
    }

    #[test]
    fn zero_is_a_valid_count() {
        let count = RowCount::new(0).expect("zero");
        assert!(count.is_zero());
        let counts = SeedCounts::new(count, count).expect("empty run");
        assert!(counts.departments.is_zero() && counts.employees.is_zero());
    }

    #[test]
    fn employees_need_departments() {
        let result = SeedCounts::new(RowCount::ZERO, RowCount::new(3).expect("count"));
        assert!(matches!(result, Err(SeedError::InvalidArgument(_))));
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: RowCount = serde_json::from_str("5").expect("parse");
        assert_eq!(ok.get(), 5);
        assert!(serde_json::from_str::<RowCount>("-5").is_err());
    }
}
