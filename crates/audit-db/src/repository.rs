//! The event collection accessor.
//!
//! [`EventRepository`] is the seam between the HTTP layer and whatever
//! holds the documents. [`EventStore`] picks a backend at startup and
//! dispatches to it, so handlers stay non-generic.

use std::future::Future;

use audit_types::{Event, EventId, NewEvent};

use crate::error::StoreError;
use crate::event_store::PgEventStore;
use crate::filter::EventFilter;
use crate::memory_store::MemoryEventStore;

/// Five operations against the single `events` collection.
///
/// Implementations must be safe to share across request tasks. No
/// operation coordinates with any other: concurrent writers race exactly
/// as the backing store lets them.
pub trait EventRepository: Send + Sync {
    /// Return events matching `filter`, newest first, at most
    /// [`MAX_LIST_RESULTS`](crate::filter::MAX_LIST_RESULTS).
    fn list(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;

    /// Store a new event and return it with its assigned identifier.
    ///
    /// Uses the body's identifier when one is supplied, otherwise assigns a
    /// fresh one. Fails with [`StoreError::DuplicateKey`] if the identifier
    /// is taken.
    fn insert(&self, body: NewEvent) -> impl Future<Output = Result<Event, StoreError>> + Send;

    /// Fetch one event. Fails with [`StoreError::NotFound`] if absent.
    fn get_by_id(&self, id: EventId) -> impl Future<Output = Result<Event, StoreError>> + Send;

    /// Replace every field of an existing event. The identifier is kept.
    /// Fails with [`StoreError::NotFound`] if absent.
    fn update_by_id(
        &self,
        id: EventId,
        body: NewEvent,
    ) -> impl Future<Output = Result<Event, StoreError>> + Send;

    /// Remove an event. Fails with [`StoreError::NotFound`] if absent.
    fn delete_by_id(&self, id: EventId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The backend selected at startup.
#[derive(Debug, Clone)]
pub enum EventStore {
    /// Documents in a `PostgreSQL` JSONB table.
    Postgres(PgEventStore),
    /// Documents in process memory.
    Memory(MemoryEventStore),
}

impl EventStore {
    /// Short backend name for logs.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<PgEventStore> for EventStore {
    fn from(store: PgEventStore) -> Self {
        Self::Postgres(store)
    }
}

impl From<MemoryEventStore> for EventStore {
    fn from(store: MemoryEventStore) -> Self {
        Self::Memory(store)
    }
}

impl EventRepository for EventStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        match self {
            Self::Postgres(store) => store.list(filter).await,
            Self::Memory(store) => store.list(filter).await,
        }
    }

    async fn insert(&self, body: NewEvent) -> Result<Event, StoreError> {
        match self {
            Self::Postgres(store) => store.insert(body).await,
            Self::Memory(store) => store.insert(body).await,
        }
    }

    async fn get_by_id(&self, id: EventId) -> Result<Event, StoreError> {
        match self {
            Self::Postgres(store) => store.get_by_id(id).await,
            Self::Memory(store) => store.get_by_id(id).await,
        }
    }

    async fn update_by_id(&self, id: EventId, body: NewEvent) -> Result<Event, StoreError> {
        match self {
            Self::Postgres(store) => store.update_by_id(id, body).await,
            Self::Memory(store) => store.update_by_id(id, body).await,
        }
    }

    async fn delete_by_id(&self, id: EventId) -> Result<(), StoreError> {
        match self {
            Self::Postgres(store) => store.delete_by_id(id).await,
            Self::Memory(store) => store.delete_by_id(id).await,
        }
    }
}
