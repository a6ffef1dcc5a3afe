//! Position service: validation, load, and atomic replace-all save.
//!
//! DESIGN
//! ======
//! A project's positions are saved as a whole: the client sends the complete
//! merged table and the service swaps it in with one transaction (delete the
//! project's rows, insert the new ones). Saves of the same project are
//! serialized through the per-project lock in [`AppState`], so a reader never
//! sees a half-replaced table and two savers never interleave.
//!
//! ERROR HANDLING
//! ==============
//! Validation runs before any database work. A rejected payload leaves the
//! stored table untouched. Rows that no longer convert into records (unknown
//! entity types or view contexts, mismatched qualifiers) surface as
//! [`PositionError::Corrupt`] rather than being skipped.

use std::collections::HashSet;

use canvas::context::ViewContext;
use canvas::doc::EntityKind;
use canvas::position::{PositionKey, PositionRecord, PositionRow};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// Rows per INSERT statement. Nine binds per row keeps each statement far
/// below the Postgres bind-parameter limit.
const INSERT_CHUNK: usize = 1000;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("too many records: {count} exceeds limit {max}")]
    TooManyRecords { count: usize, max: usize },
    #[error("duplicate position for {kind} {id}")]
    DuplicateKey { kind: EntityKind, id: Uuid },
    #[error("non-finite coordinates for {kind} {id}")]
    NonFinite { kind: EntityKind, id: Uuid },
    #[error("corrupt stored position: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PositionError {
    /// Whether the error was caused by the submitted payload.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::TooManyRecords { .. } | Self::DuplicateKey { .. } | Self::NonFinite { .. })
    }
}

/// Column tuple of `entity_positions` in the order [`load_positions`] selects it.
type StoredRow = (String, Uuid, f64, f64, String, Option<Uuid>, Option<Uuid>, Option<Uuid>);

// =============================================================================
// VALIDATION
// =============================================================================

/// Check a save payload: bounded size, finite coordinates, unique natural keys.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_records(records: &[PositionRecord], max: usize) -> Result<(), PositionError> {
    if records.len() > max {
        return Err(PositionError::TooManyRecords { count: records.len(), max });
    }

    let mut seen: HashSet<PositionKey> = HashSet::with_capacity(records.len());
    for record in records {
        let entity = record.entity;
        if !record.position.x.is_finite() || !record.position.y.is_finite() {
            return Err(PositionError::NonFinite { kind: entity.kind, id: entity.id });
        }
        if !seen.insert(record.key()) {
            return Err(PositionError::DuplicateKey { kind: entity.kind, id: entity.id });
        }
    }
    Ok(())
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Load every stored position of a project in insertion order.
///
/// # Errors
///
/// Returns a database error if the query fails, or [`PositionError::Corrupt`]
/// if a stored row does not form a valid record.
pub async fn load_positions(pool: &PgPool, project_id: Uuid) -> Result<Vec<PositionRecord>, PositionError> {
    let rows = sqlx::query_as::<_, StoredRow>(
        "SELECT entity_type, entity_id, x, y, view_context, module_id, task_id, minitask_id
         FROM entity_positions
         WHERE project_id = $1
         ORDER BY id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(stored_row_to_record).collect()
}

/// Replace all positions of a project with `records` in one transaction.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns a validation error before touching the database, or a database
/// error if any statement fails (the transaction is then rolled back).
pub async fn replace_positions(
    state: &AppState,
    project_id: Uuid,
    records: &[PositionRecord],
) -> Result<usize, PositionError> {
    validate_records(records, state.config.save_max_records)?;

    let lock = state.project_lock(project_id).await;
    let _guard = lock.lock().await;

    let mut tx = state.pool.begin().await?;
    let removed = sqlx::query("DELETE FROM entity_positions WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for chunk in records.chunks(INSERT_CHUNK) {
        let mut builder = insert_builder(project_id, chunk);
        builder.build().execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!(%project_id, written = records.len(), removed, "positions replaced");
    Ok(records.len())
}

fn insert_builder(project_id: Uuid, records: &[PositionRecord]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "INSERT INTO entity_positions
            (project_id, view_context, module_id, task_id, minitask_id, entity_type, entity_id, x, y) ",
    );
    builder.push_values(records.iter().copied(), |mut b, record| {
        b.push_bind(project_id)
            .push_bind(record.scope.context().as_str())
            .push_bind(record.scope.module_id())
            .push_bind(record.scope.task_id())
            .push_bind(record.scope.minitask_id())
            .push_bind(record.entity.kind.as_str())
            .push_bind(record.entity.id)
            .push_bind(record.position.x)
            .push_bind(record.position.y);
    });
    builder
}

fn stored_row_to_record(row: StoredRow) -> Result<PositionRecord, PositionError> {
    let (entity_type, entity_id, x, y, view_context, module_id, task_id, minitask_id) = row;
    let entity_type = EntityKind::parse(&entity_type)
        .ok_or_else(|| PositionError::Corrupt(format!("unknown entity type {entity_type:?}")))?;
    let view_context = ViewContext::parse(&view_context)
        .ok_or_else(|| PositionError::Corrupt(format!("unknown view context {view_context:?}")))?;

    let row = PositionRow { entity_type, entity_id, x, y, view_context, module_id, task_id, minitask_id };
    PositionRecord::try_from(row).map_err(|e| PositionError::Corrupt(e.to_string()))
}

#[cfg(test)]
#[path = "positions_test.rs"]
mod tests;
