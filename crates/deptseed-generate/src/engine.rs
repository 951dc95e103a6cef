use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use deptseed_core::{
    DEFAULT_DEPARTMENT_RANGE, DEFAULT_EMPLOYEE_RANGE, Department, Employee, Result, RowCount,
    SeedCounts, SeedData, SeedError, Table,
};

use crate::faker::{department_name, employee_profile};
use crate::model::GenerateOptions;

/// Entry point for producing a run's records from a seed.
#[derive(Debug, Clone)]
pub struct SeedGenerator {
    options: GenerateOptions,
}

impl SeedGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Fill in counts that were not requested by drawing from the default
    /// ranges with the run seed.
    pub fn resolve_counts(
        &self,
        departments: Option<RowCount>,
        employees: Option<RowCount>,
    ) -> Result<SeedCounts> {
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.options.seed, "counts"));
        let departments = match departments {
            Some(count) => count,
            None => draw_count(&mut rng, DEFAULT_DEPARTMENT_RANGE)?,
        };
        let employees = match employees {
            Some(count) => count,
            None => draw_count(&mut rng, DEFAULT_EMPLOYEE_RANGE)?,
        };
        SeedCounts::new(departments, employees)
    }

    pub fn generate(&self, counts: SeedCounts) -> Result<SeedData> {
        info!(
            seed = self.options.seed,
            departments = counts.departments.get(),
            employees = counts.employees.get(),
            "generation started"
        );

        let mut rng = table_rng(self.options.seed, Table::Department);
        let departments = generate_departments(counts.departments, &self.options, &mut rng)?;

        let mut rng = table_rng(self.options.seed, Table::Employee);
        let employees = generate_employees(
            counts.employees,
            departments.len(),
            &self.options,
            &mut rng,
        )?;

        let data = SeedData {
            departments,
            employees,
        };
        data.validate_references()?;

        info!(
            departments = data.departments.len(),
            employees = data.employees.len(),
            "generation finished"
        );
        Ok(data)
    }
}

/// Generate `count` departments with unique catch phrase names.
pub fn generate_departments<R: Rng + ?Sized>(
    count: RowCount,
    options: &GenerateOptions,
    rng: &mut R,
) -> Result<Vec<Department>> {
    let mut seen = HashSet::new();
    let mut departments = Vec::with_capacity(count.as_usize());

    for idx in 0..count.as_usize() {
        let name = draw_unique(&mut seen, options.max_unique_attempts, || department_name(rng))
            .ok_or_else(|| {
                SeedError::Generation(format!(
                    "could not find a unique department name for row {idx} after {} attempts",
                    options.max_unique_attempts
                ))
            })?;
        departments.push(Department { name });
    }

    debug!(table = %Table::Department, rows = departments.len(), "table generated");
    Ok(departments)
}

/// Generate `count` employees spread over `department_count` departments.
///
/// Each employee after the first may report to one of the employees generated
/// before it, so inserting in order always finds the chief already present.
pub fn generate_employees<R: Rng + ?Sized>(
    count: RowCount,
    department_count: usize,
    options: &GenerateOptions,
    rng: &mut R,
) -> Result<Vec<Employee>> {
    if count.is_zero() {
        return Ok(Vec::new());
    }
    if department_count == 0 {
        return Err(SeedError::InvalidArgument(format!(
            "{count} employees requested but no departments to assign them to"
        )));
    }

    let mut seen = HashSet::new();
    let mut employees: Vec<Employee> = Vec::with_capacity(count.as_usize());

    for idx in 0..count.as_usize() {
        let mut attempts = 0;
        let profile = loop {
            if attempts >= options.max_unique_attempts {
                return Err(SeedError::Generation(format!(
                    "could not find a unique employee name for row {idx} after {attempts} attempts"
                )));
            }
            attempts += 1;
            let profile = employee_profile(rng);
            if !profile.name.is_empty() && seen.insert(profile.name.clone()) {
                break profile;
            }
        };

        let department = rng.random_range(0..department_count);
        let chief = pick_chief(rng, idx);
        let hire_date = hire_date(rng, options.base_date, options.hire_window_days);

        employees.push(Employee {
            name: profile.name,
            email: profile.email,
            salary: profile.salary,
            hire_date,
            department,
            chief,
        });
    }

    debug!(table = %Table::Employee, rows = employees.len(), "table generated");
    Ok(employees)
}

/// Uniform over "no chief" and every earlier employee.
fn pick_chief<R: Rng + ?Sized>(rng: &mut R, idx: usize) -> Option<usize> {
    if idx == 0 {
        return None;
    }
    let pick = rng.random_range(0..=idx);
    if pick == idx { None } else { Some(pick) }
}

fn hire_date<R: Rng + ?Sized>(rng: &mut R, base: NaiveDate, window_days: u64) -> NaiveDate {
    if window_days == 0 {
        return base;
    }
    let offset = rng.random_range(0..window_days);
    base.checked_sub_days(Days::new(offset)).unwrap_or(base)
}

fn draw_unique(
    seen: &mut HashSet<String>,
    max_attempts: u32,
    mut draw: impl FnMut() -> String,
) -> Option<String> {
    for _ in 0..max_attempts {
        let value = draw();
        if !value.is_empty() && seen.insert(value.clone()) {
            return Some(value);
        }
    }
    None
}

fn draw_count(rng: &mut ChaCha8Rng, range: std::ops::RangeInclusive<u64>) -> Result<RowCount> {
    let value = rng.random_range(range);
    RowCount::new(value as i64)
}

fn table_rng(seed: u64, table: Table) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, table.as_str()))
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_employee_has_no_chief() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..32 {
            assert_eq!(pick_chief(&mut rng, 0), None);
        }
    }

    #[test]
    fn chief_always_precedes_employee() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for idx in 1..64 {
            if let Some(chief) = pick_chief(&mut rng, idx) {
                assert!(chief < idx);
            }
        }
    }

    #[test]
    fn hire_dates_stay_inside_window() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("base");
        let floor = NaiveDate::from_ymd_opt(2004, 1, 6).expect("floor");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..256 {
            let date = hire_date(&mut rng, base, 20 * 365);
            assert!(date <= base && date >= floor, "{date} outside window");
        }
    }

    #[test]
    fn draw_unique_gives_up() {
        let mut seen = HashSet::new();
        assert_eq!(
            draw_unique(&mut seen, 3, || "same".to_string()),
            Some("same".to_string())
        );
        assert_eq!(draw_unique(&mut seen, 3, || "same".to_string()), None);
    }

    #[test]
    fn hash_seed_separates_tables() {
        assert_ne!(hash_seed(73, "department"), hash_seed(73, "employee"));
        assert_eq!(hash_seed(73, "department"), hash_seed(73, "department"));
    }
}
