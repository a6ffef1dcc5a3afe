//! Persisted position records and their natural key.
//!
//! A record says "entity E sits at (x, y) when viewed in scope S". The scope
//! qualifiers depend on the view context, so in memory they are a tagged enum
//! ([`PositionScope`]) and only the wire/database shape ([`PositionRow`]) is
//! flat with nullable columns. Converting a row into a record rejects
//! qualifier combinations that do not belong to its context.

#[cfg(test)]
#[path = "position_test.rs"]
mod position_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::context::ViewContext;
use crate::doc::{EntityKind, EntityRef, ObjectId};
use crate::error::RecordError;

/// Scope qualifiers of a persisted position.
///
/// `minitask_id` on module and task scopes marks a satellite of that minitask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionScope {
    SolarSystem,
    Module { module_id: ObjectId, minitask_id: Option<ObjectId> },
    Task { module_id: ObjectId, task_id: ObjectId, minitask_id: Option<ObjectId> },
    Minitask { module_id: ObjectId, task_id: ObjectId, minitask_id: ObjectId },
}

impl PositionScope {
    #[must_use]
    pub fn context(&self) -> ViewContext {
        match self {
            Self::SolarSystem => ViewContext::SolarSystem,
            Self::Module { .. } => ViewContext::Module,
            Self::Task { .. } => ViewContext::Task,
            Self::Minitask { .. } => ViewContext::Minitask,
        }
    }

    #[must_use]
    pub fn module_id(&self) -> Option<ObjectId> {
        match *self {
            Self::SolarSystem => None,
            Self::Module { module_id, .. } | Self::Task { module_id, .. } | Self::Minitask { module_id, .. } => {
                Some(module_id)
            }
        }
    }

    #[must_use]
    pub fn task_id(&self) -> Option<ObjectId> {
        match *self {
            Self::SolarSystem | Self::Module { .. } => None,
            Self::Task { task_id, .. } | Self::Minitask { task_id, .. } => Some(task_id),
        }
    }

    #[must_use]
    pub fn minitask_id(&self) -> Option<ObjectId> {
        match *self {
            Self::SolarSystem => None,
            Self::Module { minitask_id, .. } | Self::Task { minitask_id, .. } => minitask_id,
            Self::Minitask { minitask_id, .. } => Some(minitask_id),
        }
    }

    /// True if any qualifier names `id`.
    #[must_use]
    pub fn references(&self, id: &ObjectId) -> bool {
        [self.module_id(), self.task_id(), self.minitask_id()]
            .iter()
            .any(|q| q.as_ref() == Some(id))
    }

    /// Build a scope from flat columns.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when a qualifier the context needs is missing or
    /// one it cannot carry is present.
    pub fn from_parts(
        context: ViewContext,
        module_id: Option<ObjectId>,
        task_id: Option<ObjectId>,
        minitask_id: Option<ObjectId>,
    ) -> Result<Self, RecordError> {
        let missing = |field| RecordError::MissingQualifier { context, field };
        let unexpected = |field| RecordError::UnexpectedQualifier { context, field };

        match context {
            ViewContext::SolarSystem => {
                if module_id.is_some() {
                    return Err(unexpected("moduleId"));
                }
                if task_id.is_some() {
                    return Err(unexpected("taskId"));
                }
                if minitask_id.is_some() {
                    return Err(unexpected("minitaskId"));
                }
                Ok(Self::SolarSystem)
            }
            ViewContext::Module => {
                if task_id.is_some() {
                    return Err(unexpected("taskId"));
                }
                let module_id = module_id.ok_or_else(|| missing("moduleId"))?;
                Ok(Self::Module { module_id, minitask_id })
            }
            ViewContext::Task => {
                let module_id = module_id.ok_or_else(|| missing("moduleId"))?;
                let task_id = task_id.ok_or_else(|| missing("taskId"))?;
                Ok(Self::Task { module_id, task_id, minitask_id })
            }
            ViewContext::Minitask => {
                let module_id = module_id.ok_or_else(|| missing("moduleId"))?;
                let task_id = task_id.ok_or_else(|| missing("taskId"))?;
                let minitask_id = minitask_id.ok_or_else(|| missing("minitaskId"))?;
                Ok(Self::Minitask { module_id, task_id, minitask_id })
            }
        }
    }
}

/// Natural key: at most one record exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub scope: PositionScope,
    pub entity: EntityRef,
}

/// One persisted position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionRow", into = "PositionRow")]
pub struct PositionRecord {
    pub scope: PositionScope,
    pub entity: EntityRef,
    pub position: Point,
}

impl PositionRecord {
    #[must_use]
    pub fn new(scope: PositionScope, entity: EntityRef, position: Point) -> Self {
        Self { scope, entity, position }
    }

    #[must_use]
    pub fn key(&self) -> PositionKey {
        PositionKey { scope: self.scope, entity: self.entity }
    }
}

/// Flat wire and database shape of a [`PositionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub entity_type: EntityKind,
    pub entity_id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub view_context: ViewContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minitask_id: Option<ObjectId>,
}

impl TryFrom<PositionRow> for PositionRecord {
    type Error = RecordError;

    fn try_from(row: PositionRow) -> Result<Self, Self::Error> {
        let scope = PositionScope::from_parts(row.view_context, row.module_id, row.task_id, row.minitask_id)?;
        Ok(Self {
            scope,
            entity: EntityRef::new(row.entity_type, row.entity_id),
            position: Point::new(row.x, row.y),
        })
    }
}

impl From<PositionRecord> for PositionRow {
    fn from(record: PositionRecord) -> Self {
        Self {
            entity_type: record.entity.kind,
            entity_id: record.entity.id,
            x: record.position.x,
            y: record.position.y,
            view_context: record.scope.context(),
            module_id: record.scope.module_id(),
            task_id: record.scope.task_id(),
            minitask_id: record.scope.minitask_id(),
        }
    }
}
