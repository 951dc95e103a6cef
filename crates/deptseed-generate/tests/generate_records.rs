use std::collections::HashSet;

use deptseed_core::{
    DEFAULT_DEPARTMENT_RANGE, DEFAULT_EMPLOYEE_RANGE, MAX_SALARY, MAX_TEXT_LEN, MIN_SALARY,
    RowCount, SeedCounts, SeedError,
};
use deptseed_generate::{GenerateOptions, SeedGenerator};

fn counts(departments: i64, employees: i64) -> SeedCounts {
    SeedCounts::new(
        RowCount::new(departments).expect("departments"),
        RowCount::new(employees).expect("employees"),
    )
    .expect("counts")
}

#[test]
fn generate_is_deterministic() {
    let generator_a = SeedGenerator::new(GenerateOptions::with_seed(73));
    let generator_b = SeedGenerator::new(GenerateOptions::with_seed(73));

    let data_a = generator_a.generate(counts(5, 20)).expect("run A");
    let data_b = generator_b.generate(counts(5, 20)).expect("run B");

    assert_eq!(data_a, data_b, "same seed should produce the same rows");

    let other = SeedGenerator::new(GenerateOptions::with_seed(74))
        .generate(counts(5, 20))
        .expect("run C");
    assert_ne!(data_a, other, "different seeds should diverge");
}

#[test]
fn generate_respects_row_counts() {
    let generator = SeedGenerator::new(GenerateOptions::default());
    for (departments, employees) in [(0, 0), (1, 0), (1, 1), (3, 17), (10, 50)] {
        let data = generator
            .generate(counts(departments, employees))
            .expect("generate");
        assert_eq!(data.departments.len(), departments as usize);
        assert_eq!(data.employees.len(), employees as usize);
    }
}

#[test]
fn generated_fields_are_populated() {
    let data = SeedGenerator::new(GenerateOptions::default())
        .generate(counts(8, 40))
        .expect("generate");

    for department in &data.departments {
        assert!(!department.name.is_empty());
        assert!(department.name.chars().count() <= MAX_TEXT_LEN);
    }

    let base_date = GenerateOptions::default().base_date;
    for employee in &data.employees {
        assert!(!employee.name.is_empty());
        assert!(employee.name.chars().count() <= MAX_TEXT_LEN);
        assert!(employee.email.contains('@'), "email {}", employee.email);
        assert!((MIN_SALARY..=MAX_SALARY).contains(&employee.salary));
        assert!(employee.hire_date <= base_date);
    }
}

#[test]
fn names_are_unique_within_a_run() {
    let data = SeedGenerator::new(GenerateOptions::default())
        .generate(counts(10, 50))
        .expect("generate");

    let departments: HashSet<_> = data.departments.iter().map(|d| &d.name).collect();
    assert_eq!(departments.len(), data.departments.len());

    let employees: HashSet<_> = data.employees.iter().map(|e| &e.name).collect();
    assert_eq!(employees.len(), data.employees.len());
}

#[test]
fn references_resolve_within_the_run() {
    let data = SeedGenerator::new(GenerateOptions::with_seed(9))
        .generate(counts(3, 45))
        .expect("generate");

    for (idx, employee) in data.employees.iter().enumerate() {
        assert!(employee.department < data.departments.len());
        if let Some(chief) = employee.chief {
            assert!(chief < idx, "chief {chief} of employee {idx} is not earlier");
        }
    }
    assert_eq!(data.employees[0].chief, None);
    assert!(data.validate_references().is_ok());
}

#[test]
fn resolve_counts_draws_default_ranges() {
    let generator = SeedGenerator::new(GenerateOptions::default());
    let resolved = generator.resolve_counts(None, None).expect("resolve");
    assert!(DEFAULT_DEPARTMENT_RANGE.contains(&resolved.departments.get()));
    assert!(DEFAULT_EMPLOYEE_RANGE.contains(&resolved.employees.get()));

    let again = generator.resolve_counts(None, None).expect("resolve again");
    assert_eq!(resolved, again);
}

#[test]
fn resolve_counts_keeps_explicit_values() {
    let generator = SeedGenerator::new(GenerateOptions::default());
    let resolved = generator
        .resolve_counts(Some(RowCount::new(5).expect("5")), Some(RowCount::ZERO))
        .expect("resolve");
    assert_eq!(resolved.departments.get(), 5);
    assert_eq!(resolved.employees.get(), 0);
}

#[test]
fn resolve_counts_rejects_orphan_employees() {
    let generator = SeedGenerator::new(GenerateOptions::default());
    let result = generator.resolve_counts(Some(RowCount::ZERO), None);
    assert!(matches!(result, Err(SeedError::InvalidArgument(_))));
}
