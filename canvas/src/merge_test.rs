use uuid::Uuid;

use super::*;
use crate::doc::EntityKind;

fn module_ref(id: ObjectId) -> EntityRef {
    EntityRef::new(EntityKind::Module, id)
}

fn solar(entity: EntityRef, x: f64, y: f64) -> PositionRecord {
    PositionRecord::new(PositionScope::SolarSystem, entity, Point::new(x, y))
}

// =============================================================
// MergeTable
// =============================================================

#[test]
fn override_replaces_persisted_record() {
    let m1 = module_ref(Uuid::new_v4());
    let merged = merge_positions(&[solar(m1, 10.0, 10.0)], &[solar(m1, 20.0, 20.0)], &HashSet::new());
    assert_eq!(merged, vec![solar(m1, 20.0, 20.0)]);
}

#[test]
fn untouched_persisted_records_survive() {
    let m1 = module_ref(Uuid::new_v4());
    let m2 = module_ref(Uuid::new_v4());
    let merged = merge_positions(&[solar(m1, 1.0, 1.0), solar(m2, 2.0, 2.0)], &[solar(m1, 5.0, 5.0)], &HashSet::new());
    assert_eq!(merged.len(), 2);
    assert!(merged.contains(&solar(m2, 2.0, 2.0)));
    assert!(merged.contains(&solar(m1, 5.0, 5.0)));
}

#[test]
fn same_entity_in_other_scope_is_independent() {
    let id = Uuid::new_v4();
    let module_id = Uuid::new_v4();
    let entity = EntityRef::new(EntityKind::Task, id);
    let in_module = PositionRecord::new(
        PositionScope::Module { module_id, minitask_id: None },
        entity,
        Point::new(3.0, 3.0),
    );
    let merged = merge_positions(&[in_module], &[solar(entity, 9.0, 9.0)], &HashSet::new());
    assert_eq!(merged.len(), 2);
    assert!(merged.contains(&in_module));
}

#[test]
fn merge_is_idempotent() {
    let m1 = module_ref(Uuid::new_v4());
    let m2 = module_ref(Uuid::new_v4());
    let persisted = vec![solar(m1, 1.0, 1.0), solar(m2, 2.0, 2.0)];
    let current = vec![solar(m1, 7.0, 8.0)];
    let once = merge_positions(&persisted, &current, &HashSet::new());
    let twice = merge_positions(&once, &current, &HashSet::new());
    assert_eq!(once, twice);
}

#[test]
fn output_order_is_deterministic() {
    let records: Vec<PositionRecord> = (0..8).map(|i| solar(module_ref(Uuid::new_v4()), f64::from(i), 0.0)).collect();
    let mut reversed = records.clone();
    reversed.reverse();
    assert_eq!(
        merge_positions(&records, &[], &HashSet::new()),
        merge_positions(&reversed, &[], &HashSet::new())
    );
}

// =============================================================
// Deletion cascade
// =============================================================

#[test]
fn deleting_entity_drops_its_records_everywhere() {
    let id = Uuid::new_v4();
    let module_id = Uuid::new_v4();
    let entity = EntityRef::new(EntityKind::Task, id);
    let persisted = vec![
        solar(entity, 1.0, 1.0),
        PositionRecord::new(PositionScope::Module { module_id, minitask_id: None }, entity, Point::new(2.0, 2.0)),
    ];
    let merged = merge_positions(&persisted, &[], &HashSet::from([id]));
    assert!(merged.is_empty());
}

#[test]
fn deleting_parent_drops_records_scoped_under_it() {
    let module_id = Uuid::new_v4();
    let task_id = Uuid::new_v4();
    let minitask_id = Uuid::new_v4();
    let other = module_ref(Uuid::new_v4());
    let sub = EntityRef::new(EntityKind::Subtask, Uuid::new_v4());

    let mut table = MergeTable::new();
    table.seed(&[solar(other, 0.0, 0.0)]);
    table.upsert(PositionScope::Module { module_id, minitask_id: None }, sub, Point::new(1.0, 1.0));
    table.upsert(PositionScope::Task { module_id, task_id, minitask_id: Some(minitask_id) }, sub, Point::new(2.0, 2.0));
    table.upsert(PositionScope::Minitask { module_id, task_id, minitask_id }, sub, Point::new(3.0, 3.0));
    assert_eq!(table.len(), 4);

    assert_eq!(table.drop_deleted(&HashSet::from([minitask_id])), 2);
    assert_eq!(table.len(), 2);
    assert_eq!(table.drop_deleted(&HashSet::from([module_id])), 1);
    assert_eq!(table.into_records(), vec![solar(other, 0.0, 0.0)]);
}

#[test]
fn empty_deletion_set_removes_nothing() {
    let mut table = MergeTable::new();
    table.seed(&[solar(module_ref(Uuid::new_v4()), 0.0, 0.0)]);
    assert_eq!(table.drop_deleted(&HashSet::new()), 0);
    assert!(!table.is_empty());
}

#[test]
fn get_reads_upserted_entry() {
    let m1 = module_ref(Uuid::new_v4());
    let mut table = MergeTable::new();
    table.upsert(PositionScope::SolarSystem, m1, Point::new(4.0, 5.0));
    let key = PositionKey { scope: PositionScope::SolarSystem, entity: m1 };
    assert_eq!(table.get(&key), Some(Point::new(4.0, 5.0)));
}
