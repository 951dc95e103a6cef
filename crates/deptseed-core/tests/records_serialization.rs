use chrono::NaiveDate;
use deptseed_core::{Department, Employee, RowCount, SeedCounts, SeedData};

#[test]
fn serializes_seed_data_deterministically() {
    let data = SeedData {
        departments: vec![Department {
            name: "Synergized zero tolerance firmware".to_string(),
        }],
        employees: vec![Employee {
            name: "Grace Hopper".to_string(),
            email: "grace@example.org".to_string(),
            salary: 54_321,
            hire_date: NaiveDate::from_ymd_opt(2011, 3, 9).expect("valid date"),
            department: 0,
            chief: None,
        }],
    };

    let json = serde_json::to_string_pretty(&data).expect("serialize seed data");
    let expected = r#"{
  "departments": [
    {
      "name": "Synergized zero tolerance firmware"
    }
  ],
  "employees": [
    {
      "name": "Grace Hopper",
      "email": "grace@example.org",
      "salary": 54321,
      "hire_date": "2011-03-09",
      "department": 0,
      "chief": null
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn counts_round_trip_through_json() {
    let counts = SeedCounts::new(
        RowCount::new(5).expect("departments"),
        RowCount::new(20).expect("employees"),
    )
    .expect("counts");

    let json = serde_json::to_value(counts).expect("serialize counts");
    assert_eq!(json, serde_json::json!({ "departments": 5, "employees": 20 }));

    let parsed: SeedCounts = serde_json::from_value(json).expect("parse counts");
    assert_eq!(parsed, counts);
}
