//! Merge table: reconciles persisted positions with the current edit session.
//!
//! Entries are keyed by [`PositionKey`], so a later upsert for the same
//! `(scope, entity)` replaces the earlier one. Deletions cascade: removing an
//! entity also removes every record whose scope is qualified by it (its
//! satellites, its children's positions inside its own view).

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use std::collections::{BTreeMap, HashSet};

use crate::camera::Point;
use crate::doc::{EntityRef, ObjectId};
use crate::position::{PositionKey, PositionRecord, PositionScope};

/// Position records keyed by natural key, in deterministic order.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    entries: BTreeMap<PositionKey, Point>,
}

impl MergeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add persisted records. Later duplicates of a key win.
    pub fn seed(&mut self, records: &[PositionRecord]) {
        for record in records {
            self.entries.insert(record.key(), record.position);
        }
    }

    /// Insert or overwrite one entry.
    pub fn upsert(&mut self, scope: PositionScope, entity: EntityRef, position: Point) {
        self.entries.insert(PositionKey { scope, entity }, position);
    }

    /// Drop entries for deleted entities and entries scoped under them.
    ///
    /// Returns how many entries were removed.
    pub fn drop_deleted(&mut self, deleted: &HashSet<ObjectId>) -> usize {
        if deleted.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !deleted.contains(&key.entity.id) && !deleted.iter().any(|id| key.scope.references(id)));
        before - self.entries.len()
    }

    #[must_use]
    pub fn get(&self, key: &PositionKey) -> Option<Point> {
        self.entries.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit the records in key order.
    #[must_use]
    pub fn into_records(self) -> Vec<PositionRecord> {
        self.entries
            .into_iter()
            .map(|(key, position)| PositionRecord::new(key.scope, key.entity, position))
            .collect()
    }
}

/// One-shot merge: persisted records, overwritten by `current`, minus `deleted`.
#[must_use]
pub fn merge_positions(
    persisted: &[PositionRecord],
    current: &[PositionRecord],
    deleted: &HashSet<ObjectId>,
) -> Vec<PositionRecord> {
    let mut table = MergeTable::new();
    table.seed(persisted);
    for record in current {
        table.upsert(record.scope, record.entity, record.position);
    }
    table.drop_deleted(deleted);
    table.into_records()
}
