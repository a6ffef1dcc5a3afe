//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the parsed config, and one save lock per
//! project so concurrent replace-all saves of the same project run one at a
//! time instead of interleaving their delete and insert phases.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::ServerConfig;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    project_locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        Self { pool, config: Arc::new(config), project_locks: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// The save lock for `project_id`, created on first use.
    pub async fn project_lock(&self, project_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(lock) = self.project_locks.read().await.get(&project_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.project_locks.write().await;
        Arc::clone(locks.entry(project_id).or_default())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
