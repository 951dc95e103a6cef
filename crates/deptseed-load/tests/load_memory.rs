use std::collections::HashSet;

use deptseed_core::{RowCount, SeedCounts, SeedData, SeedError, Table};
use deptseed_generate::{GenerateOptions, SeedGenerator};
use deptseed_load::{
    Backend, CommitMode, LoadError, LoadOptions, LoadStatus, Loader, MemoryBackend, MemoryHandle,
    OnRowError, SchemaMode, Target, seed,
};

fn generate(departments: i64, employees: i64) -> SeedData {
    let counts = SeedCounts::new(
        RowCount::new(departments).expect("departments"),
        RowCount::new(employees).expect("employees"),
    )
    .expect("counts");
    SeedGenerator::new(GenerateOptions::default())
        .generate(counts)
        .expect("generate")
}

fn options(schema_mode: SchemaMode, commit: CommitMode, on_error: OnRowError) -> LoadOptions {
    LoadOptions {
        schema_mode,
        commit,
        on_error,
        ..LoadOptions::default()
    }
}

async fn load_into(
    handle: &MemoryHandle,
    options: LoadOptions,
    data: &SeedData,
) -> Result<deptseed_load::LoadReport, LoadError> {
    let mut backend = MemoryBackend::new(handle.clone());
    let outcome = Loader::new(&mut backend, options).load(data).await;
    backend.close().await.expect("close");
    outcome
}

#[tokio::test]
async fn loads_five_departments_and_twenty_employees() {
    let handle = MemoryHandle::with_tables();
    let data = generate(5, 20);

    let report = load_into(
        &handle,
        options(SchemaMode::Keep, CommitMode::Row, OnRowError::Abort),
        &data,
    )
    .await
    .expect("load");

    let departments = handle.departments();
    let employees = handle.employees();
    assert_eq!(departments.len(), 5);
    assert_eq!(employees.len(), 20);

    let department_ids: HashSet<i64> = departments.iter().map(|d| d.id).collect();
    let employee_ids: HashSet<i64> = employees.iter().map(|e| e.id).collect();
    for employee in &employees {
        assert!(department_ids.contains(&employee.department_id));
        if let Some(chief_id) = employee.chief_id {
            assert!(employee_ids.contains(&chief_id));
            assert!(chief_id < employee.id);
        }
    }

    assert_eq!(report.status, LoadStatus::Completed);
    assert_eq!(report.table(Table::Department).inserted, 5);
    assert_eq!(report.table(Table::Employee).inserted, 20);
    assert_eq!(report.verified(), Some(true));
}

#[tokio::test]
async fn stored_rows_follow_generated_references() {
    let handle = MemoryHandle::new();
    let data = generate(4, 12);

    load_into(&handle, LoadOptions::default(), &data)
        .await
        .expect("load");

    let departments = handle.departments();
    let employees = handle.employees();
    for (generated, stored) in data.employees.iter().zip(&employees) {
        assert_eq!(generated.name, stored.name);
        assert_eq!(departments[generated.department].id, stored.department_id);
        let expected_chief = generated.chief.map(|idx| employees[idx].id);
        assert_eq!(expected_chief, stored.chief_id);
    }
}

#[tokio::test]
async fn zero_rows_issue_no_inserts() {
    let handle = MemoryHandle::new();
    let data = generate(0, 0);

    let report = load_into(&handle, LoadOptions::default(), &data)
        .await
        .expect("empty load");

    assert_eq!(report.status, LoadStatus::Completed);
    assert_eq!(report.inserted_total(), 0);
    assert_eq!(handle.insert_statements(), 0);
    assert!(handle.tables_exist());
}

#[tokio::test]
async fn unreachable_target_fails_before_inserting() {
    let target = Target::detect("postgres://deptseed@127.0.0.1:1/deptseed").expect("target");
    let options = LoadOptions {
        connect_timeout_secs: Some(5),
        ..LoadOptions::default()
    };

    let err = seed(&target, &options, &generate(2, 3))
        .await
        .expect_err("connection must fail");

    assert!(matches!(err, LoadError::Seed(SeedError::Connection(_))), "{err}");
    assert!(err.report().is_none());
}

#[tokio::test]
async fn invalid_options_fail_before_connecting() {
    let target = Target::detect("postgres://deptseed@127.0.0.1:1/deptseed").expect("target");
    let options = options(SchemaMode::Recreate, CommitMode::Batch, OnRowError::Skip);

    let err = seed(&target, &options, &generate(1, 1))
        .await
        .expect_err("invalid options");

    assert!(matches!(err.seed_error(), SeedError::InvalidArgument(_)));
}

#[tokio::test]
async fn keep_mode_requires_existing_tables() {
    let handle = MemoryHandle::new();

    let err = load_into(
        &handle,
        options(SchemaMode::Keep, CommitMode::Row, OnRowError::Abort),
        &generate(1, 1),
    )
    .await
    .expect_err("missing tables");

    assert!(matches!(err, LoadError::Seed(SeedError::Database(_))));
    assert_eq!(handle.insert_statements(), 0);
}

#[tokio::test]
async fn closed_backend_rejects_statements() {
    let mut backend = MemoryBackend::new(MemoryHandle::with_tables());
    backend.close().await.expect("close");

    let err = backend
        .count_rows(Table::Department)
        .await
        .expect_err("closed");
    assert!(matches!(err, SeedError::Connection(_)));
}
