//! Shared context for handler callbacks
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Registries injected explicitly instead of module-level state
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;

use crate::database::Database;
use crate::registry::{ActionRegistry, EventRegistry};

/// Shared context for all handler callbacks
///
/// Contains the services callbacks may use:
/// - Database for the user entity
/// - Both registries (callbacks may read them; they must not assume an
///   entry survives their own await points)
#[derive(Clone)]
pub struct HandlerContext {
    pub database: Database,
    pub actions: Arc<ActionRegistry>,
    pub events: Arc<EventRegistry>,
}

impl HandlerContext {
    pub fn new(database: Database, actions: Arc<ActionRegistry>, events: Arc<EventRegistry>) -> Self {
        Self {
            database,
            actions,
            events,
        }
    }

    #[cfg(test)]
    pub async fn for_tests() -> Arc<Self> {
        let database = Database::in_memory().await.expect("in-memory database");
        Arc::new(Self::new(
            database,
            Arc::new(ActionRegistry::new()),
            Arc::new(EventRegistry::new()),
        ))
    }
}
