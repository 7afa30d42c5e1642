//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`. It bundles the
//! connection pool the transactional wrappers draw from and the event
//! publisher the service layer notifies after commits, threaded explicitly
//! here instead of living in a process-global.

use std::sync::Arc;

use crate::events::EventPublisher;
use crate::outbound::persistence::DbPool;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub bus: Arc<dyn EventPublisher>,
}

impl AppState {
    /// Bundle the pool and event publisher for handler injection.
    pub fn new(pool: DbPool, bus: Arc<dyn EventPublisher>) -> Self {
        Self { pool, bus }
    }
}
