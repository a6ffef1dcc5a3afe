//! Canvas positioning engine for the planning solar system.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interaction layer of the planning canvas: the fixed virtual canvas scaled
//! to fit its container, pan/zoom, dragging and box selection, the mapping of
//! satellite positions between nested view contexts, and the merge of an
//! edit session with persisted positions into one atomic save. The host
//! JavaScript layer wires DOM events to the engine, renders the entities,
//! and performs the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`]; edit session and save pipeline |
//! | [`doc`] | Entities, edges, provider snapshots, and the in-memory document store |
//! | [`camera`] | Pan/zoom camera and screen ↔ canvas conversions |
//! | [`fit`] | Scale-to-fit factor for a container |
//! | [`context`] | View contexts and the satellite orbit frame |
//! | [`position`] | Persisted position records and their natural key |
//! | [`merge`] | Merge table with deletion cascade |
//! | [`drag`] | Single and group drag sessions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Point picks and box selection in screen space |
//! | [`store`] | Position store and entity provider traits, in-memory implementations |
//! | [`render`] | Selection overlay drawing |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (canvas extent, zoom limits, orbit radii) |

pub mod camera;
pub mod consts;
pub mod context;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod error;
pub mod fit;
pub mod hit;
pub mod input;
pub mod merge;
pub mod position;
pub mod render;
pub mod store;
