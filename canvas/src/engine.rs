//! Engine: view state, gesture handling, edit session, and the save pipeline.
//!
//! `EngineCore` holds everything that does not need a browser: the document
//! for the current view, camera, selection, the active gesture, and the
//! session's unsaved edits. `Engine` wraps it with the canvas element used
//! for measuring the container and drawing the overlay.
//!
//! Unsaved positions live in `EditSession::overrides` in each object's
//! authoring frame. They are folded into one full upsert set by
//! [`EngineCore::begin_save`] and cleared by [`EngineCore::finish_save`] only
//! after the store reports success.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point, Viewport};
use crate::context::{OrbitFrame, ViewSelector};
use crate::doc::{CanvasObject, DocStore, EntityKind, EntityRef, ObjectId, RemovedObject, ViewSnapshot};
use crate::drag::{DragFrame, DragMember, DragSession};
use crate::error::{CommitError, EngineError, StoreError};
use crate::hit::{ScreenBounds, SelectionBox, box_select, hit_test_point};
use crate::input::{Button, InputState, Key, Modifiers, PointerId, UiState, WheelDelta};
use crate::merge::MergeTable;
use crate::position::PositionRecord;
use crate::render;
use crate::store::{EntityProvider, PositionStore};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(String),
    /// Route further events of this pointer to the canvas (`setPointerCapture`).
    CapturePointer(PointerId),
    ReleasePointer(PointerId),
    /// The selection was replaced; carries the new set in id order.
    SelectionChanged(Vec<ObjectId>),
    /// A plain click on an object; the host opens its detail panel.
    OpenDetail { id: ObjectId, kind: EntityKind },
}

/// Bookkeeping for an entity created during the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntity {
    pub kind: EntityKind,
    /// Owning minitask when the entity is created as a satellite.
    pub orbit_owner: Option<ObjectId>,
}

/// Unsaved edits. Exists only while edit mode is on.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    /// Positions not yet committed, in each object's authoring frame.
    pub overrides: HashMap<ObjectId, Point>,
    pub new_entities: HashMap<ObjectId, NewEntity>,
    pub deleted: HashSet<ObjectId>,
    /// Objects taken out of the view by deletion, with their edges and
    /// anchor role; restored on discard.
    removed: Vec<RemovedObject>,
}

impl EditSession {
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !(self.overrides.is_empty() && self.new_entities.is_empty() && self.deleted.is_empty())
    }
}

/// A save handed to the host between [`EngineCore::begin_save`] and [`EngineCore::finish_save`].
#[derive(Debug, Clone)]
pub struct SaveTicket {
    id: u64,
    project_id: ObjectId,
    records: Vec<PositionRecord>,
    overrides: HashMap<ObjectId, Point>,
    new_ids: Vec<ObjectId>,
    deleted: HashSet<ObjectId>,
}

impl SaveTicket {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn project_id(&self) -> ObjectId {
        self.project_id
    }

    /// The full upsert set to pass to the position store.
    #[must_use]
    pub fn records(&self) -> &[PositionRecord] {
        &self.records
    }
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub container_width: f64,
    pub container_height: f64,
    selector: Option<ViewSelector>,
    edit: Option<EditSession>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            container_width: 0.0,
            container_height: 0.0,
            selector: None,
            edit: None,
            in_flight: None,
            next_ticket: 1,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =============================================================
    // View
    // =============================================================

    /// Record the measured container size in CSS pixels.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container_width = width;
        self.container_height = height;
    }

    /// The current screen ↔ canvas transform.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.container_width, self.container_height, self.camera)
    }

    #[must_use]
    pub fn selector(&self) -> Option<ViewSelector> {
        self.selector
    }

    /// Show a provider snapshot.
    ///
    /// Reloading the same view keeps camera, selection, and edits. Switching
    /// to another project or scope resets the camera, selection, and gesture.
    ///
    /// # Errors
    ///
    /// Switching views fails with [`EngineError::UnsavedEdits`] while edits are
    /// pending and [`EngineError::SaveInFlight`] while a save is outstanding.
    pub fn load_view(&mut self, selector: ViewSelector, snapshot: ViewSnapshot) -> Result<(), EngineError> {
        if self.selector != Some(selector) {
            if self.in_flight.is_some() {
                return Err(EngineError::SaveInFlight);
            }
            if self.has_unsaved_edits() {
                return Err(EngineError::UnsavedEdits);
            }
            self.camera.reset();
            self.ui = UiState::default();
            self.input = InputState::Idle;
            self.selector = Some(selector);
        }

        let carried = self.carried_new_entities();
        self.doc.load_snapshot(snapshot);
        self.localize_satellites();
        self.reapply_session(carried);

        let doc = &self.doc;
        self.ui.selection.retain(|id| doc.contains(id));
        debug!(project_id = %selector.project_id, context = %selector.scope.context(), objects = self.doc.len(), "view loaded");
        Ok(())
    }

    /// Session-created objects currently shown, in their authoring frame.
    fn carried_new_entities(&self) -> Vec<CanvasObject> {
        let Some(edit) = &self.edit else {
            return Vec::new();
        };
        edit.new_entities.keys().filter_map(|id| self.doc.get(id).cloned()).collect()
    }

    /// Re-apply session deletions and creations on top of a fresh snapshot.
    ///
    /// Created objects the provider did not return are put back unless their
    /// orbit owner is gone; the provider's copy wins when it has one.
    fn reapply_session(&mut self, carried: Vec<CanvasObject>) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };
        for id in &edit.deleted {
            if let Some(fresh) = self.doc.take(id) {
                edit.removed.retain(|r| r.object.id != *id);
                edit.removed.push(fresh);
            }
        }
        for obj in carried {
            let owner_present = obj.orbit_owner.is_none_or(|owner| self.doc.contains(&owner));
            if owner_present && !self.doc.contains(&obj.id) {
                self.doc.insert(obj);
            }
        }
    }

    /// Re-express provider positions of satellites in their owner's local frame.
    fn localize_satellites(&mut self) {
        let moves: Vec<(ObjectId, Point)> = self
            .doc
            .sorted_objects()
            .into_iter()
            .filter_map(|obj| {
                let owner = self.satellite_owner(obj)?;
                let frame = self.frame_around(owner.position)?;
                frame.to_local(obj.position).map(|local| (obj.id, local))
            })
            .collect();
        for (id, local) in moves {
            self.doc.set_position(&id, local);
        }
    }

    /// The owning minitask if `obj` is drawn as a satellite in this view.
    fn satellite_owner(&self, obj: &CanvasObject) -> Option<&CanvasObject> {
        let owner = self.doc.get(&obj.orbit_owner?)?;
        if owner.orbit_owner.is_some() {
            return None;
        }
        self.selector?.scope.context().orbit_radius()?;
        Some(owner)
    }

    fn frame_around(&self, asteroid: Point) -> Option<OrbitFrame> {
        self.selector?.scope.orbit_frame(asteroid)
    }

    fn authoring_of(&self, obj: &CanvasObject) -> Point {
        self.edit
            .as_ref()
            .and_then(|e| e.overrides.get(&obj.id))
            .copied()
            .unwrap_or(obj.position)
    }

    /// Orbit frame around the owner's current position.
    fn current_frame(&self, owner: &CanvasObject) -> Option<OrbitFrame> {
        self.frame_around(self.authoring_of(owner))
    }

    /// Position in the object's authoring frame: override if present, else source.
    #[must_use]
    pub fn authoring_position(&self, id: &ObjectId) -> Option<Point> {
        match self.doc.get(id) {
            Some(obj) => Some(self.authoring_of(obj)),
            None => self.edit.as_ref().and_then(|e| e.overrides.get(id)).copied(),
        }
    }

    /// Canvas-space position used for drawing and hit testing.
    #[must_use]
    pub fn effective_position(&self, id: &ObjectId) -> Option<Point> {
        let obj = self.doc.get(id)?;
        Some(self.canvas_position_of(obj))
    }

    fn canvas_position_of(&self, obj: &CanvasObject) -> Point {
        let local = self.authoring_of(obj);
        self.satellite_owner(obj)
            .and_then(|owner| self.current_frame(owner))
            .map_or(local, |frame| frame.to_canvas(local))
    }

    /// Effective positions of every object in draw order.
    #[must_use]
    pub fn rendered_positions(&self) -> Vec<(ObjectId, Point)> {
        self.doc
            .sorted_objects()
            .into_iter()
            .map(|obj| (obj.id, self.canvas_position_of(obj)))
            .collect()
    }

    /// Screen footprints of every hit-testable object, in draw order.
    #[must_use]
    pub fn screen_bounds(&self, vp: &Viewport) -> Vec<ScreenBounds> {
        self.doc
            .sorted_objects()
            .into_iter()
            .filter(|obj| !obj.placeholder)
            .map(|obj| ScreenBounds {
                id: obj.id,
                center: vp.canvas_to_screen(self.canvas_position_of(obj)),
                radius: vp.canvas_dist_to_screen(obj.radius),
            })
            .collect()
    }

    // =============================================================
    // Selection
    // =============================================================

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<ObjectId> {
        &self.ui.selection
    }

    /// Replace the selection. Unknown ids, placeholders, and the anchor are skipped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ObjectId>) -> Vec<Action> {
        let doc = &self.doc;
        self.ui.selection = ids
            .into_iter()
            .filter(|id| doc.contains(id) && !doc.is_anchor_like(id))
            .collect();
        self.selection_changed()
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.ui.selection.clear();
        self.selection_changed()
    }

    fn selection_changed(&self) -> Vec<Action> {
        vec![Action::SelectionChanged(self.ui.selection.iter().copied().collect()), Action::RenderNeeded]
    }

    // =============================================================
    // Edit session
    // =============================================================

    pub fn enter_edit_mode(&mut self) {
        if self.edit.is_none() {
            self.edit = Some(EditSession::default());
            debug!("edit mode entered");
        }
    }

    /// Leave edit mode.
    ///
    /// # Errors
    ///
    /// Fails while edits are unsaved or a save is in flight; commit or
    /// discard first.
    pub fn exit_edit_mode(&mut self) -> Result<(), EngineError> {
        let Some(edit) = &self.edit else {
            return Err(EngineError::NotEditing);
        };
        if self.in_flight.is_some() {
            return Err(EngineError::SaveInFlight);
        }
        if edit.is_dirty() {
            return Err(EngineError::UnsavedEdits);
        }
        if matches!(self.input, InputState::DraggingObjects(_)) {
            self.input = InputState::Idle;
        }
        self.edit = None;
        debug!("edit mode exited");
        Ok(())
    }

    /// Throw away every unsaved edit and stay in edit mode.
    ///
    /// # Errors
    ///
    /// Fails when not editing or while a save is in flight.
    pub fn discard_edits(&mut self) -> Result<(), EngineError> {
        if self.in_flight.is_some() {
            return Err(EngineError::SaveInFlight);
        }
        if self.edit.is_none() {
            return Err(EngineError::NotEditing);
        }
        let edit = self.edit.replace(EditSession::default()).unwrap_or_default();
        if matches!(self.input, InputState::DraggingObjects(_)) {
            self.input = InputState::Idle;
        }
        for id in edit.new_entities.keys() {
            self.doc.remove(id);
            self.ui.selection.remove(id);
        }
        for removed in edit.removed.into_iter().rev() {
            self.doc.restore(removed);
        }
        debug!(overrides = edit.overrides.len(), "edits discarded");
        Ok(())
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    #[must_use]
    pub fn has_unsaved_edits(&self) -> bool {
        self.edit.as_ref().is_some_and(EditSession::is_dirty)
    }

    /// Unsaved positions, in authoring frames.
    #[must_use]
    pub fn overrides(&self) -> Option<&HashMap<ObjectId, Point>> {
        self.edit.as_ref().map(|e| &e.overrides)
    }

    #[must_use]
    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    #[must_use]
    pub fn save_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Add a newly created entity at `obj.position` (canvas space).
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::NotEditing`] outside edit mode.
    pub fn create_entity(&mut self, mut obj: CanvasObject) -> Result<(), EngineError> {
        if self.edit.is_none() {
            return Err(EngineError::NotEditing);
        }
        let authoring = self
            .satellite_owner(&obj)
            .and_then(|owner| self.current_frame(owner))
            .and_then(|frame| frame.to_local(obj.position))
            .unwrap_or(obj.position);
        obj.position = authoring;

        let id = obj.id;
        let entity = NewEntity { kind: obj.kind, orbit_owner: obj.orbit_owner };
        let Some(edit) = self.edit.as_mut() else {
            return Err(EngineError::NotEditing);
        };
        edit.overrides.insert(id, authoring);
        edit.new_entities.insert(id, entity);
        edit.deleted.remove(&id);
        self.doc.insert(obj);
        debug!(%id, kind = %entity.kind, "entity created");
        Ok(())
    }

    /// Delete an entity and any satellites orbiting it.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::NotEditing`] outside edit mode.
    pub fn delete_entity(&mut self, id: &ObjectId) -> Result<(), EngineError> {
        if self.edit.is_none() {
            return Err(EngineError::NotEditing);
        }
        let mut ids = vec![*id];
        ids.extend(
            self.doc
                .sorted_objects()
                .into_iter()
                .filter(|obj| obj.orbit_owner.as_ref() == Some(id))
                .map(|obj| obj.id),
        );

        let Some(edit) = self.edit.as_mut() else {
            return Err(EngineError::NotEditing);
        };
        for gone in ids {
            edit.overrides.remove(&gone);
            self.ui.selection.remove(&gone);
            let was_new = edit.new_entities.remove(&gone).is_some();
            let removed = self.doc.take(&gone);
            if !was_new {
                edit.deleted.insert(gone);
                edit.removed.extend(removed);
            }
        }
        debug!(%id, "entity deleted");
        Ok(())
    }

    // =============================================================
    // Pointer input
    // =============================================================

    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        pointer_id: PointerId,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        if !self.input.is_idle() || button != Button::Primary {
            return Vec::new();
        }
        let vp = self.viewport();
        if !vp.is_ready() {
            return Vec::new();
        }
        self.ui.just_dragged = None;
        self.ui.suppress_background_click = false;

        match hit_test_point(screen, &self.screen_bounds(&vp)) {
            Some(id) => self.begin_drag(id, pointer_id, screen),
            None if modifiers.shift => {
                self.input = InputState::BoxSelecting { pointer_id, rect: SelectionBox::at(screen) };
                debug!(pointer_id, "box select started");
                vec![Action::CapturePointer(pointer_id), Action::SetCursor("crosshair".into())]
            }
            None => {
                self.input = InputState::Panning { pointer_id, last_screen: screen };
                vec![Action::CapturePointer(pointer_id), Action::SetCursor("grabbing".into())]
            }
        }
    }

    fn is_draggable(&self, id: &ObjectId) -> bool {
        self.doc.get(id).is_some_and(|obj| !obj.pinned) && !self.doc.is_anchor_like(id)
    }

    fn begin_drag(&mut self, id: ObjectId, pointer_id: PointerId, screen: Point) -> Vec<Action> {
        if self.edit.is_none() || !self.is_draggable(&id) {
            return Vec::new();
        }

        let mut group = vec![id];
        if self.ui.selection.len() > 1 && self.ui.selection.contains(&id) {
            group.extend(
                self.ui
                    .selection
                    .iter()
                    .filter(|sel| **sel != id && self.is_draggable(sel)),
            );
        }

        let members: Vec<DragMember> = group
            .iter()
            .filter_map(|member_id| self.drag_member(member_id, &group))
            .collect();
        let Some(session) = DragSession::new(pointer_id, screen, members) else {
            return Vec::new();
        };
        debug!(%id, members = session.members.len(), "drag started");
        self.input = InputState::DraggingObjects(session);
        vec![Action::CapturePointer(pointer_id), Action::SetCursor("grabbing".into())]
    }

    fn drag_member(&self, id: &ObjectId, group: &[ObjectId]) -> Option<DragMember> {
        let obj = self.doc.get(id)?;
        let frame = match self.satellite_owner(obj) {
            None => DragFrame::Canvas,
            Some(owner) if group.contains(&owner.id) => DragFrame::FollowsOwner,
            Some(owner) => self
                .current_frame(owner)
                .map_or(DragFrame::Canvas, |f| DragFrame::Orbit { scale: f.scale() }),
        };
        Some(DragMember { id: *id, start: self.authoring_of(obj), frame })
    }

    pub fn on_pointer_move(&mut self, screen: Point, pointer_id: PointerId) -> Vec<Action> {
        if self.input.pointer_id() != Some(pointer_id) {
            return Vec::new();
        }
        let vp = self.viewport();

        match &mut self.input {
            InputState::Panning { last_screen, .. } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                self.camera.pan_by(delta.x, delta.y);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingObjects(session) => {
                if !session.has_moved && screen == session.start_pointer {
                    return Vec::new();
                }
                let Some(delta) = vp.screen_delta_to_canvas(screen - session.start_pointer) else {
                    return Vec::new();
                };
                let Some(edit) = self.edit.as_mut() else {
                    return Vec::new();
                };
                session.has_moved = true;
                for (id, pos) in session.positions_for(delta) {
                    edit.overrides.insert(id, pos);
                }
                vec![Action::RenderNeeded]
            }
            InputState::BoxSelecting { rect, .. } => {
                rect.end = screen;
                vec![Action::RenderNeeded]
            }
            InputState::Idle => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, pointer_id: PointerId) -> Vec<Action> {
        if self.input.pointer_id() != Some(pointer_id) {
            return Vec::new();
        }
        let mut actions = vec![Action::ReleasePointer(pointer_id), Action::SetCursor("default".into())];

        match std::mem::take(&mut self.input) {
            InputState::DraggingObjects(session) => {
                if session.has_moved {
                    self.ui.just_dragged = Some(session.object_id);
                }
                debug!(id = %session.object_id, moved = session.has_moved, "drag ended");
                actions.push(Action::RenderNeeded);
            }
            InputState::BoxSelecting { mut rect, .. } => {
                rect.end = screen;
                actions.extend(self.finish_box_select(rect));
            }
            InputState::Panning { .. } | InputState::Idle => {}
        }
        actions
    }

    fn finish_box_select(&mut self, rect: SelectionBox) -> Vec<Action> {
        let vp = self.viewport();
        let bounds = self.screen_bounds(&vp);
        self.ui.selection = box_select(&rect.rect(), &bounds, self.doc.anchor());
        self.ui.suppress_background_click = true;
        debug!(selected = self.ui.selection.len(), "box select finished");
        self.selection_changed()
    }

    /// Pointer left the canvas or the browser cancelled it.
    ///
    /// Positions already written by a drag are kept; a box selection is dropped.
    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        if self.input.pointer_id() != Some(pointer_id) {
            return Vec::new();
        }
        self.cancel_gesture()
    }

    fn cancel_gesture(&mut self) -> Vec<Action> {
        let Some(pointer_id) = std::mem::take(&mut self.input).pointer_id() else {
            return Vec::new();
        };
        debug!(pointer_id, "gesture cancelled");
        vec![Action::ReleasePointer(pointer_id), Action::SetCursor("default".into()), Action::RenderNeeded]
    }

    /// A click (pointer-down and up without a gesture in between) at `screen`.
    pub fn on_click(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let vp = self.viewport();
        if !vp.is_ready() {
            return Vec::new();
        }
        if self.ui.take_background_suppression() {
            return Vec::new();
        }
        let Some(id) = hit_test_point(screen, &self.screen_bounds(&vp)) else {
            return self.clear_selection();
        };

        if self.ui.take_just_dragged(&id) {
            return Vec::new();
        }
        let Some(kind) = self.doc.get(&id).map(|obj| obj.kind) else {
            return Vec::new();
        };
        if !modifiers.shift {
            return vec![Action::OpenDetail { id, kind }];
        }
        if self.doc.is_anchor_like(&id) {
            return Vec::new();
        }
        if !self.ui.selection.remove(&id) {
            self.ui.selection.insert(id);
        }
        self.selection_changed()
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if !self.viewport().is_ready() {
            return Vec::new();
        }
        self.camera.zoom_by_wheel(delta.dy);
        vec![Action::RenderNeeded]
    }

    /// Zoom buttons.
    pub fn zoom_by(&mut self, delta: f64) -> Vec<Action> {
        self.camera.zoom_by(delta);
        vec![Action::RenderNeeded]
    }

    /// Zoom slider, `t` in `[0, 1]`.
    pub fn set_zoom_slider(&mut self, t: f64) -> Vec<Action> {
        self.camera.set_zoom_from_slider(t);
        vec![Action::RenderNeeded]
    }

    pub fn reset_camera(&mut self) -> Vec<Action> {
        self.camera.reset();
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.0 != "Escape" {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        actions.extend(self.clear_selection());
        actions
    }

    // =============================================================
    // Save pipeline
    // =============================================================

    /// Fold persisted records and the edit session into one upsert set.
    fn build_payload(&self, persisted: &[PositionRecord], edit: &EditSession) -> Option<Vec<PositionRecord>> {
        let scope = self.selector?.scope;
        let mut table = MergeTable::new();
        table.seed(persisted);

        for obj in self.doc.sorted_objects() {
            if obj.placeholder {
                continue;
            }
            let owner = self.satellite_owner(obj).map(|o| o.id);
            table.upsert(scope.position_scope(owner), obj.entity(), self.canvas_position_of(obj));
        }

        for (id, entity) in &edit.new_entities {
            if self.doc.contains(id) {
                continue;
            }
            let Some(local) = edit.overrides.get(id).copied() else {
                continue;
            };
            let entity_ref = EntityRef::new(entity.kind, *id);
            match entity.orbit_owner {
                None => table.upsert(scope.position_scope(None), entity_ref, local),
                Some(owner_id) => {
                    let Some(owner) = self.doc.get(&owner_id) else {
                        continue;
                    };
                    let Some(frame) = self.current_frame(owner) else {
                        table.upsert(scope.position_scope(None), entity_ref, local);
                        continue;
                    };
                    table.upsert(scope.position_scope(Some(owner_id)), entity_ref, frame.to_canvas(local));
                }
            }
        }

        for id in edit.overrides.keys() {
            if !self.doc.contains(id) && !edit.new_entities.contains_key(id) && !edit.deleted.contains(id) {
                debug!(%id, "dropping override for entity no longer in view");
            }
        }

        let dropped = table.drop_deleted(&edit.deleted);
        if dropped > 0 {
            debug!(dropped, "records removed by deletion");
        }
        Some(table.into_records())
    }

    /// Start a save: merge `persisted` with the session and hand out the payload.
    ///
    /// # Errors
    ///
    /// Fails when not editing, with no view loaded, or while another save is
    /// in flight.
    pub fn begin_save(&mut self, persisted: &[PositionRecord]) -> Result<SaveTicket, CommitError> {
        if self.in_flight.is_some() {
            return Err(CommitError::SaveInFlight);
        }
        let edit = self.edit.as_ref().ok_or(CommitError::NotEditing)?;
        let project_id = self.selector.ok_or(CommitError::NoView)?.project_id;
        let records = self.build_payload(persisted, edit).ok_or(CommitError::NoView)?;

        let ticket = SaveTicket {
            id: self.next_ticket,
            project_id,
            records,
            overrides: edit.overrides.clone(),
            new_ids: edit.new_entities.keys().copied().collect(),
            deleted: edit.deleted.clone(),
        };
        self.next_ticket += 1;
        self.in_flight = Some(ticket.id);
        debug!(ticket = ticket.id, %project_id, count = ticket.records.len(), "save started");
        Ok(ticket)
    }

    /// Complete a save with the store's result.
    ///
    /// On success, overrides unchanged since [`Self::begin_save`] become the
    /// objects' source positions and leave the session, along with the saved
    /// new-entity and deletion entries. Edits made during the save stay.
    ///
    /// # Errors
    ///
    /// Returns the store error on failure (the session is untouched), or
    /// [`CommitError::StaleTicket`] if `ticket` is not the save in flight.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<(), StoreError>) -> Result<usize, CommitError> {
        if self.in_flight != Some(ticket.id) {
            return Err(CommitError::StaleTicket(ticket.id));
        }
        self.in_flight = None;

        if let Err(e) = result {
            warn!(project_id = %ticket.project_id, error = %e, "position save failed; edits kept");
            return Err(CommitError::Store(e));
        }

        let count = ticket.records.len();
        if let Some(edit) = self.edit.as_mut() {
            for (id, saved) in &ticket.overrides {
                if edit.overrides.get(id) == Some(saved) {
                    edit.overrides.remove(id);
                    self.doc.set_position(id, *saved);
                }
            }
            for id in &ticket.new_ids {
                if !edit.overrides.contains_key(id) {
                    edit.new_entities.remove(id);
                }
            }
            edit.deleted.retain(|id| !ticket.deleted.contains(id));
            let deleted = &edit.deleted;
            edit.removed.retain(|r| deleted.contains(&r.object.id));
        }
        info!(project_id = %ticket.project_id, count, "positions saved");
        Ok(count)
    }

    /// Load persisted positions, merge, and save in one go.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_save`] and [`Self::finish_save`]; store load
    /// failures are returned as [`CommitError::Store`].
    pub async fn commit<S: PositionStore + ?Sized>(&mut self, store: &S) -> Result<usize, CommitError> {
        if self.in_flight.is_some() {
            return Err(CommitError::SaveInFlight);
        }
        if self.edit.is_none() {
            return Err(CommitError::NotEditing);
        }
        let project_id = self.selector.ok_or(CommitError::NoView)?.project_id;

        let persisted = store.load_positions(project_id).await?;
        let ticket = self.begin_save(&persisted)?;
        let result = store.save_positions(project_id, ticket.records()).await;
        self.finish_save(ticket, result)
    }

    /// Switch to another view, saving pending edits first.
    ///
    /// # Errors
    ///
    /// A failed save aborts the switch and keeps the current view and edits.
    pub async fn switch_view<S, P>(&mut self, store: &S, provider: &P, selector: ViewSelector) -> Result<(), CommitError>
    where
        S: PositionStore + ?Sized,
        P: EntityProvider + ?Sized,
    {
        if self.has_unsaved_edits() {
            self.commit(store).await?;
        }
        let snapshot = provider.fetch_view(&selector).await?;
        self.load_view(selector, snapshot)?;
        Ok(())
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let mut engine = Self { canvas, core: EngineCore::new() };
        engine.sync_container_size();
        engine
    }

    /// Re-measure the canvas element. Call from the host's resize observer.
    pub fn sync_container_size(&mut self) {
        let width = f64::from(self.canvas.client_width());
        let height = f64::from(self.canvas.client_height());
        self.core.set_container_size(width, height);
    }

    /// Draw the selection overlay. `dpr` is the device pixel ratio.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render_overlay(&self, dpr: f64) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw_overlay(&ctx, &self.core, dpr)
    }

    // --- Delegated input ---

    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        pointer_id: PointerId,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.on_pointer_down(screen, pointer_id, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen: Point, pointer_id: PointerId) -> Vec<Action> {
        self.core.on_pointer_move(screen, pointer_id)
    }

    pub fn on_pointer_up(&mut self, screen: Point, pointer_id: PointerId) -> Vec<Action> {
        self.core.on_pointer_up(screen, pointer_id)
    }

    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        self.core.on_pointer_cancel(pointer_id)
    }

    pub fn on_click(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_click(screen, modifiers)
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(delta)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<ObjectId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.core.viewport()
    }
}
