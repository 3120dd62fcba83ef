//! Shared application state for the API server.
//!
//! [`AppState`] carries the store handle injected into every handler via
//! Axum's `State` extractor. The handle is cheap to clone and safe to
//! share: the `PostgreSQL` backend wraps a connection pool, the memory
//! backend an `Arc`-shared map.

use audit_db::EventStore;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The event collection every handler reads and writes.
    pub store: EventStore,
}

impl AppState {
    /// Create application state around a store backend.
    pub fn new(store: impl Into<EventStore>) -> Self {
        Self {
            store: store.into(),
        }
    }
}
