use serde_json::json;
use uuid::Uuid;

use super::*;

fn subtask(id: ObjectId) -> EntityRef {
    EntityRef::new(EntityKind::Subtask, id)
}

// --- from_parts ---

#[test]
fn solar_system_rejects_qualifiers() {
    let id = Uuid::new_v4();
    assert_eq!(PositionScope::from_parts(ViewContext::SolarSystem, None, None, None), Ok(PositionScope::SolarSystem));
    assert_eq!(
        PositionScope::from_parts(ViewContext::SolarSystem, Some(id), None, None),
        Err(RecordError::UnexpectedQualifier { context: ViewContext::SolarSystem, field: "moduleId" })
    );
    assert!(PositionScope::from_parts(ViewContext::SolarSystem, None, None, Some(id)).is_err());
}

#[test]
fn module_requires_module_id_and_allows_minitask() {
    let (module_id, minitask_id) = (Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(
        PositionScope::from_parts(ViewContext::Module, None, None, None),
        Err(RecordError::MissingQualifier { context: ViewContext::Module, field: "moduleId" })
    );
    assert_eq!(
        PositionScope::from_parts(ViewContext::Module, Some(module_id), None, Some(minitask_id)),
        Ok(PositionScope::Module { module_id, minitask_id: Some(minitask_id) })
    );
    assert!(PositionScope::from_parts(ViewContext::Module, Some(module_id), Some(Uuid::new_v4()), None).is_err());
}

#[test]
fn task_and_minitask_require_parents() {
    let (m, t, mt) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(
        PositionScope::from_parts(ViewContext::Task, Some(m), None, None),
        Err(RecordError::MissingQualifier { context: ViewContext::Task, field: "taskId" })
    );
    assert_eq!(
        PositionScope::from_parts(ViewContext::Minitask, Some(m), Some(t), None),
        Err(RecordError::MissingQualifier { context: ViewContext::Minitask, field: "minitaskId" })
    );
    assert_eq!(
        PositionScope::from_parts(ViewContext::Minitask, Some(m), Some(t), Some(mt)),
        Ok(PositionScope::Minitask { module_id: m, task_id: t, minitask_id: mt })
    );
}

// --- accessors ---

#[test]
fn references_checks_every_qualifier() {
    let (m, t, mt) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let scope = PositionScope::Task { module_id: m, task_id: t, minitask_id: Some(mt) };
    assert!(scope.references(&m));
    assert!(scope.references(&t));
    assert!(scope.references(&mt));
    assert!(!scope.references(&Uuid::new_v4()));
    assert!(!PositionScope::SolarSystem.references(&m));
}

#[test]
fn key_differs_by_scope() {
    let id = Uuid::new_v4();
    let module_id = Uuid::new_v4();
    let a = PositionRecord::new(PositionScope::SolarSystem, subtask(id), Point::new(1.0, 1.0));
    let b = PositionRecord::new(
        PositionScope::Module { module_id, minitask_id: None },
        subtask(id),
        Point::new(1.0, 1.0),
    );
    assert_ne!(a.key(), b.key());
    assert_eq!(a.key(), PositionRecord::new(a.scope, a.entity, Point::new(9.0, 9.0)).key());
}

// --- wire shape ---

#[test]
fn serializes_flat_camel_case_row() {
    let (m, t, id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let record = PositionRecord::new(
        PositionScope::Task { module_id: m, task_id: t, minitask_id: None },
        subtask(id),
        Point::new(20.0, -4.5),
    );
    let value = serde_json::to_value(record).unwrap();
    assert_eq!(
        value,
        json!({
            "entityType": "subtask",
            "entityId": id,
            "x": 20.0,
            "y": -4.5,
            "viewContext": "task",
            "moduleId": m,
            "taskId": t,
        })
    );
}

#[test]
fn deserializes_valid_row() {
    let (m, mt, id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let value = json!({
        "entityType": "subtask",
        "entityId": id,
        "x": 942.5,
        "y": 900.0,
        "viewContext": "module",
        "moduleId": m,
        "minitaskId": mt,
    });
    let record: PositionRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.scope, PositionScope::Module { module_id: m, minitask_id: Some(mt) });
    assert_eq!(record.entity, subtask(id));
    assert_eq!(record.position, Point::new(942.5, 900.0));
}

#[test]
fn deserialize_rejects_inconsistent_row() {
    let value = json!({
        "entityType": "task",
        "entityId": Uuid::new_v4(),
        "x": 0.0,
        "y": 0.0,
        "viewContext": "task",
        "moduleId": Uuid::new_v4(),
    });
    let err = serde_json::from_value::<PositionRecord>(value).unwrap_err();
    assert!(err.to_string().contains("taskId"), "unexpected error: {err}");
}

#[test]
fn deserialize_rejects_unknown_context() {
    let value = json!({
        "entityType": "task",
        "entityId": Uuid::new_v4(),
        "x": 0.0,
        "y": 0.0,
        "viewContext": "galaxy",
    });
    assert!(serde_json::from_value::<PositionRecord>(value).is_err());
}
