use super::*;
use crate::state::test_helpers;
use canvas::camera::Point;
use canvas::doc::EntityRef;
use canvas::position::PositionScope;

fn record(scope: PositionScope, kind: EntityKind, id: Uuid, x: f64, y: f64) -> PositionRecord {
    PositionRecord::new(scope, EntityRef::new(kind, id), Point::new(x, y))
}

fn stored(entity_type: &str, view_context: &str) -> StoredRow {
    (entity_type.into(), Uuid::new_v4(), 10.0, 20.0, view_context.into(), None, None, None)
}

// =============================================================================
// validate_records
// =============================================================================

#[test]
fn validate_accepts_empty_and_distinct_records() {
    assert!(validate_records(&[], 0).is_ok());

    let module = Uuid::new_v4();
    let task = Uuid::new_v4();
    let records = vec![
        record(PositionScope::SolarSystem, EntityKind::Module, module, 1.0, 2.0),
        record(PositionScope::Module { module_id: module, minitask_id: None }, EntityKind::Task, task, 3.0, 4.0),
        // Same entity under another scope is a different key.
        record(PositionScope::SolarSystem, EntityKind::Task, task, 5.0, 6.0),
    ];
    assert!(validate_records(&records, 3).is_ok());
}

#[test]
fn validate_rejects_duplicate_natural_key() {
    let id = Uuid::new_v4();
    let records = vec![
        record(PositionScope::SolarSystem, EntityKind::Module, id, 1.0, 2.0),
        record(PositionScope::SolarSystem, EntityKind::Module, id, 9.0, 9.0),
    ];
    let err = validate_records(&records, 10).unwrap_err();
    assert!(matches!(err, PositionError::DuplicateKey { kind: EntityKind::Module, id: dup } if dup == id));
    assert!(err.is_validation());
}

#[test]
fn validate_rejects_non_finite_coordinates() {
    let id = Uuid::new_v4();
    let records = vec![record(PositionScope::SolarSystem, EntityKind::Portal, id, f64::NAN, 0.0)];
    assert!(matches!(validate_records(&records, 10), Err(PositionError::NonFinite { .. })));

    let records = vec![record(PositionScope::SolarSystem, EntityKind::Portal, id, 0.0, f64::INFINITY)];
    assert!(matches!(validate_records(&records, 10), Err(PositionError::NonFinite { .. })));
}

#[test]
fn validate_rejects_oversized_payload() {
    let records: Vec<_> = (0..3)
        .map(|i| record(PositionScope::SolarSystem, EntityKind::Module, Uuid::new_v4(), f64::from(i), 0.0))
        .collect();
    let err = validate_records(&records, 2).unwrap_err();
    assert!(matches!(err, PositionError::TooManyRecords { count: 3, max: 2 }));
}

#[test]
fn database_errors_are_not_validation_errors() {
    assert!(!PositionError::Database(sqlx::Error::RowNotFound).is_validation());
    assert!(!PositionError::Corrupt("x".into()).is_validation());
}

// =============================================================================
// stored_row_to_record
// =============================================================================

#[test]
fn stored_row_converts_to_record() {
    let module = Uuid::new_v4();
    let minitask = Uuid::new_v4();
    let id = Uuid::new_v4();
    let row: StoredRow = ("subtask".into(), id, 942.5, 900.0, "module".into(), Some(module), None, Some(minitask));

    let rec = stored_row_to_record(row).unwrap();
    assert_eq!(rec.scope, PositionScope::Module { module_id: module, minitask_id: Some(minitask) });
    assert_eq!(rec.entity, EntityRef::new(EntityKind::Subtask, id));
    assert_eq!(rec.position, Point::new(942.5, 900.0));
}

#[test]
fn stored_row_with_unknown_names_is_corrupt() {
    assert!(matches!(stored_row_to_record(stored("comet", "solar_system")), Err(PositionError::Corrupt(_))));
    assert!(matches!(stored_row_to_record(stored("module", "galaxy")), Err(PositionError::Corrupt(_))));
}

#[test]
fn stored_row_with_missing_qualifier_is_corrupt() {
    // A task-context row needs moduleId and taskId.
    let err = stored_row_to_record(stored("minitask", "task")).unwrap_err();
    let PositionError::Corrupt(msg) = err else {
        panic!("expected corrupt row error");
    };
    assert!(msg.contains("moduleId"), "{msg}");
}

// =============================================================================
// insert_builder / replace_positions
// =============================================================================

#[test]
fn insert_builder_emits_one_tuple_per_record() {
    let records: Vec<_> = (0..2)
        .map(|_| record(PositionScope::SolarSystem, EntityKind::Module, Uuid::new_v4(), 0.0, 0.0))
        .collect();
    let sql = insert_builder(Uuid::new_v4(), &records).into_sql();
    assert!(sql.starts_with("INSERT INTO entity_positions"));
    assert_eq!(sql.matches("($").count(), 2);
    assert!(sql.contains("$18"));
    assert!(!sql.contains("$19"));
}

#[tokio::test]
async fn replace_rejects_invalid_payload_before_database_access() {
    // The lazy pool points at no live database; validation must fail first.
    let state = test_helpers::test_app_state();
    let id = Uuid::new_v4();
    let records = vec![
        record(PositionScope::SolarSystem, EntityKind::Module, id, 1.0, 2.0),
        record(PositionScope::SolarSystem, EntityKind::Module, id, 3.0, 4.0),
    ];
    let err = replace_positions(&state, Uuid::new_v4(), &records).await.unwrap_err();
    assert!(matches!(err, PositionError::DuplicateKey { .. }));
}

#[tokio::test]
async fn replace_enforces_configured_record_limit() {
    let state = test_helpers::test_app_state();
    let max = state.config.save_max_records;
    let records: Vec<_> = (0..=max)
        .map(|_| record(PositionScope::SolarSystem, EntityKind::Task, Uuid::new_v4(), 0.0, 0.0))
        .collect();
    let err = replace_positions(&state, Uuid::new_v4(), &records).await.unwrap_err();
    assert!(matches!(err, PositionError::TooManyRecords { count, max: m } if count == max + 1 && m == max));
}
