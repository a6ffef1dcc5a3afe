//! Document model: planning entities as canvas objects, and the in-memory store.
//!
//! This module defines what is on the canvas for the current view
//! (`CanvasObject`, `EntityKind`, `DependencyEdge`), the snapshot shape the
//! entity data provider hands over (`ViewSnapshot`), and the runtime store
//! that owns the live objects (`DocStore`).
//!
//! Positions here are the provider's ground truth. Unsaved edits never touch
//! the store; they live in the engine's edit session as overrides.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a planning entity.
pub type ObjectId = Uuid;

/// The type of a planning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// The project itself (the sun of the solar-system view).
    Project,
    /// A module (planet).
    Module,
    /// A task inside a module.
    Task,
    /// A subtask; may orbit a minitask.
    Subtask,
    /// A minitask (asteroid) inside a task.
    Minitask,
    /// A portal linking to another view.
    Portal,
}

impl EntityKind {
    /// Wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Module => "module",
            Self::Task => "task",
            Self::Subtask => "subtask",
            Self::Minitask => "minitask",
            Self::Portal => "portal",
        }
    }

    /// Parse a wire name. Returns `None` for unknown kinds.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "project" => Some(Self::Project),
            "module" => Some(Self::Module),
            "task" => Some(Self::Task),
            "subtask" => Some(Self::Subtask),
            "minitask" => Some(Self::Minitask),
            "portal" => Some(Self::Portal),
            _ => None,
        }
    }

    /// Draw layer; higher layers are drawn (and hit-tested) above lower ones.
    #[must_use]
    pub fn layer(self) -> u8 {
        match self {
            Self::Project => 0,
            Self::Module => 1,
            Self::Task => 2,
            Self::Minitask => 3,
            Self::Subtask => 4,
            Self::Portal => 5,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(entity type, entity id)`. Identity never changes once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: ObjectId,
}

impl EntityRef {
    #[must_use]
    pub fn new(kind: EntityKind, id: ObjectId) -> Self {
        Self { kind, id }
    }
}

fn default_radius() -> f64 {
    40.0
}

/// An entity as rendered on the canvas for one view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasObject {
    /// Entity id.
    pub id: ObjectId,
    /// Entity type.
    pub kind: EntityKind,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Center of the object in its authoring frame. Providers supply canvas
    /// units; the engine re-expresses satellites in their owner's local frame.
    pub position: Point,
    /// Radius of the object in canvas units.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// CSS color string.
    #[serde(default)]
    pub color: String,
    /// Pinned objects can never be dragged.
    #[serde(default)]
    pub pinned: bool,
    /// Synthetic canvas-center entry; never selected, dragged, or saved.
    #[serde(default)]
    pub placeholder: bool,
    /// The minitask this object orbits when shown as a satellite in a module or task view.
    #[serde(default)]
    pub orbit_owner: Option<ObjectId>,
    /// Free-form provider metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl CanvasObject {
    /// A plain object with default styling at `position`.
    #[must_use]
    pub fn new(id: ObjectId, kind: EntityKind, position: Point) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            position,
            radius: default_radius(),
            color: String::new(),
            pinned: false,
            placeholder: false,
            orbit_owner: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// The `(kind, id)` reference for this object.
    #[must_use]
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.kind, self.id)
    }
}

/// A dependency edge between two entities. Read-only for this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub id: Uuid,
    pub source: ObjectId,
    pub target: ObjectId,
    /// Edge type as named by the provider (e.g. `"blocks"`).
    pub kind: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// Everything the entity data provider returns for one view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSnapshot {
    /// The entity the view is centered on, if any.
    #[serde(default)]
    pub anchor: Option<ObjectId>,
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

/// An object taken out of a [`DocStore`] with everything that referenced it.
#[derive(Debug, Clone)]
pub struct RemovedObject {
    pub object: CanvasObject,
    /// Edges that touched the object.
    pub edges: Vec<DependencyEdge>,
    /// The object was the view's anchor.
    pub was_anchor: bool,
}

/// In-memory store of the objects and edges shown in the current view.
pub struct DocStore {
    objects: HashMap<ObjectId, CanvasObject>,
    edges: Vec<DependencyEdge>,
    anchor: Option<ObjectId>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new(), edges: Vec::new(), anchor: None }
    }

    /// Replace everything with a provider snapshot.
    pub fn load_snapshot(&mut self, snapshot: ViewSnapshot) {
        self.objects.clear();
        for obj in snapshot.objects {
            self.objects.insert(obj.id, obj);
        }
        self.edges = snapshot.edges;
        self.anchor = snapshot.anchor;
    }

    /// Insert or replace an object.
    pub fn insert(&mut self, obj: CanvasObject) {
        self.objects.insert(obj.id, obj);
    }

    /// Remove an object and any edges touching it, returning the object if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<CanvasObject> {
        self.take(id).map(|removed| removed.object)
    }

    /// Remove an object together with its edges and anchor role, so that
    /// [`Self::restore`] can put all of it back.
    pub fn take(&mut self, id: &ObjectId) -> Option<RemovedObject> {
        let object = self.objects.remove(id)?;
        let (edges, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.source == *id || e.target == *id);
        self.edges = kept;
        let was_anchor = self.anchor.as_ref() == Some(id);
        if was_anchor {
            self.anchor = None;
        }
        Some(RemovedObject { object, edges, was_anchor })
    }

    /// Undo a [`Self::take`]. Edges already present are not duplicated.
    pub fn restore(&mut self, removed: RemovedObject) {
        let RemovedObject { object, edges, was_anchor } = removed;
        if was_anchor {
            self.anchor = Some(object.id);
        }
        for edge in edges {
            if !self.edges.iter().any(|e| e.id == edge.id) {
                self.edges.push(edge);
            }
        }
        self.objects.insert(object.id, object);
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.get(id)
    }

    /// Move an object. Returns false if it is not in the store.
    pub fn set_position(&mut self, id: &ObjectId, position: Point) -> bool {
        match self.objects.get_mut(id) {
            Some(obj) => {
                obj.position = position;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// The view's anchor object id.
    #[must_use]
    pub fn anchor(&self) -> Option<ObjectId> {
        self.anchor
    }

    /// True for the anchor and for placeholder entries.
    #[must_use]
    pub fn is_anchor_like(&self, id: &ObjectId) -> bool {
        self.anchor.as_ref() == Some(id) || self.objects.get(id).is_some_and(|o| o.placeholder)
    }

    /// Dependency edges shown in this view.
    #[must_use]
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// All objects in draw order: by kind layer, then id. Last drawn is topmost.
    #[must_use]
    pub fn sorted_objects(&self) -> Vec<&CanvasObject> {
        let mut objs: Vec<&CanvasObject> = self.objects.values().collect();
        objs.sort_by(|a, b| a.kind.layer().cmp(&b.kind.layer()).then_with(|| a.id.cmp(&b.id)));
        objs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
