//! External collaborators: the position store and the entity data provider.
//!
//! The engine is single-threaded (it runs on the browser's event loop), so
//! the traits are `?Send`. In-memory implementations back the tests and
//! offline demos; the persistent store is the `starchart` HTTP service.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::context::ViewSelector;
use crate::doc::{ObjectId, ViewSnapshot};
use crate::error::{ProviderError, StoreError};
use crate::position::PositionRecord;

/// Loads and atomically replaces a project's persisted positions.
#[async_trait::async_trait(?Send)]
pub trait PositionStore {
    /// All persisted records for `project_id`.
    async fn load_positions(&self, project_id: ObjectId) -> Result<Vec<PositionRecord>, StoreError>;

    /// Replace every record of `project_id` with `records`. Idempotent.
    async fn save_positions(&self, project_id: ObjectId, records: &[PositionRecord]) -> Result<(), StoreError>;
}

/// Supplies the objects and edges of one view.
#[async_trait::async_trait(?Send)]
pub trait EntityProvider {
    async fn fetch_view(&self, selector: &ViewSelector) -> Result<ViewSnapshot, ProviderError>;
}

// =============================================================
// In-memory implementations
// =============================================================

/// Position store held in memory.
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    projects: RefCell<HashMap<ObjectId, Vec<PositionRecord>>>,
    fail_saves: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryPositionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project's records directly.
    pub fn put(&self, project_id: ObjectId, records: Vec<PositionRecord>) {
        self.projects.borrow_mut().insert(project_id, records);
    }

    /// Make every following save fail with [`StoreError::Unavailable`].
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    /// Snapshot of a project's stored records.
    #[must_use]
    pub fn records(&self, project_id: &ObjectId) -> Vec<PositionRecord> {
        self.projects.borrow().get(project_id).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait(?Send)]
impl PositionStore for MemoryPositionStore {
    async fn load_positions(&self, project_id: ObjectId) -> Result<Vec<PositionRecord>, StoreError> {
        Ok(self.records(&project_id))
    }

    async fn save_positions(&self, project_id: ObjectId, records: &[PositionRecord]) -> Result<(), StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Unavailable("memory store is failing saves".into()));
        }
        self.projects.borrow_mut().insert(project_id, records.to_vec());
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}

/// Entity provider serving fixed snapshots.
#[derive(Debug, Default)]
pub struct MemoryEntityProvider {
    views: HashMap<ViewSelector, ViewSnapshot>,
}

impl MemoryEntityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, selector: ViewSelector, snapshot: ViewSnapshot) {
        self.views.insert(selector, snapshot);
    }
}

#[async_trait::async_trait(?Send)]
impl EntityProvider for MemoryEntityProvider {
    async fn fetch_view(&self, selector: &ViewSelector) -> Result<ViewSnapshot, ProviderError> {
        self.views
            .get(selector)
            .cloned()
            .ok_or_else(|| ProviderError::Fetch(format!("no view for {:?}", selector.scope)))
    }
}
