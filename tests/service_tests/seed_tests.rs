//! Tests for seed data loading

use std::fs;

use patientdb::seed::{load_seed_file, parse_seed};
use patientdb::{PatientDbError, PatientService};
use tempfile::TempDir;

const SEED: &str = r#"[
  { "name": "John Doe", "email": "john@test.com", "phone": "555-1234", "birth_date": "1990-05-15" },
  { "name": "Jane Smith", "email": "jane@test.com", "birth_date": "1985-08-22" }
]"#;

#[test]
fn test_parse_seed() {
    let records = parse_seed(SEED).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "John Doe");
    assert_eq!(records[0].phone.as_deref(), Some("555-1234"));
    assert_eq!(records[1].phone, None);
    assert_eq!(records[1].birth_date.to_string(), "1985-08-22");
}

#[test]
fn test_parse_seed_rejects_bad_json() {
    assert!(matches!(parse_seed("not json"), Err(PatientDbError::Seed(_))));
    assert!(matches!(
        parse_seed(r#"[{ "name": "X", "email": "x@test.com", "birth_date": "15/05/1990" }]"#),
        Err(PatientDbError::Seed(_))
    ));
}

#[test]
fn test_load_seed_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("seed.json");
    fs::write(&path, SEED).unwrap();

    let records = load_seed_file(&path).unwrap();
    let service = PatientService::in_memory();
    let report = service.seed(records);

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(service.count().unwrap(), 2);
}

#[test]
fn test_load_missing_seed_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_seed_file(&temp_dir.path().join("missing.json"));
    assert!(matches!(result, Err(PatientDbError::Seed(_))));
}
