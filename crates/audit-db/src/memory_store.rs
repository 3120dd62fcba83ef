//! In-memory implementation of the event collection accessor.
//!
//! Holds documents in a [`BTreeMap`] behind a [`RwLock`]. Filters are
//! evaluated against the same JSON document form `PostgreSQL` stores, so a
//! query selects the same events from either backend.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use audit_types::{Event, EventId, NewEvent};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::filter::{EventFilter, MAX_LIST_RESULTS};
use crate::repository::EventRepository;

/// Process-local event collection. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<BTreeMap<EventId, NewEvent>>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl EventRepository for MemoryEventStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().await;

        let mut matched = Vec::new();
        for (id, doc) in events.iter() {
            if filter.matches(&serde_json::to_value(doc)?) {
                matched.push(Event::from_new(*id, doc.clone()));
            }
        }

        matched.sort_by_key(|event| Reverse((event.time, event.id)));
        matched.truncate(MAX_LIST_RESULTS);
        Ok(matched)
    }

    async fn insert(&self, body: NewEvent) -> Result<Event, StoreError> {
        let id = body.id.unwrap_or_default();
        let doc = body.without_id();

        let mut events = self.events.write().await;
        if events.contains_key(&id) {
            return Err(StoreError::DuplicateKey(id));
        }
        events.insert(id, doc.clone());

        tracing::debug!(%id, "Inserted event");
        Ok(Event::from_new(id, doc))
    }

    async fn get_by_id(&self, id: EventId) -> Result<Event, StoreError> {
        self.events
            .read()
            .await
            .get(&id)
            .map(|doc| Event::from_new(id, doc.clone()))
            .ok_or(StoreError::NotFound(id))
    }

    async fn update_by_id(&self, id: EventId, body: NewEvent) -> Result<Event, StoreError> {
        let doc = body.without_id();

        let mut events = self.events.write().await;
        let slot = events.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        slot.clone_from(&doc);

        tracing::debug!(%id, "Replaced event");
        Ok(Event::from_new(id, doc))
    }

    async fn delete_by_id(&self, id: EventId) -> Result<(), StoreError> {
        if self.events.write().await.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(%id, "Deleted event");
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;

    fn body(entity: &str, action: &str, time: DateTime<Utc>) -> NewEvent {
        NewEvent {
            id: None,
            entity: entity.to_owned(),
            action: action.to_owned(),
            event: format!("{entity} {action}"),
            time,
            author: String::from("alice"),
        }
    }

    fn base_time() -> DateTime<Utc> {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_returns_same_record() {
        let store = MemoryEventStore::new();
        let created = store
            .insert(body("User", "CREATE", base_time()))
            .await
            .unwrap();

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.entity, "User");
    }

    #[tokio::test]
    async fn insert_honours_supplied_id_and_rejects_duplicates() {
        let store = MemoryEventStore::new();
        let id = EventId::new();
        let mut first = body("User", "CREATE", base_time());
        first.id = Some(id);

        let created = store.insert(first.clone()).await.unwrap();
        assert_eq!(created.id, id);

        let err = store.insert(first).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(dup) if dup == id));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn list_filters_by_equality_and_membership() {
        let store = MemoryEventStore::new();
        let t = base_time();
        store.insert(body("User", "CREATE", t)).await.unwrap();
        store.insert(body("User", "UPDATE", t)).await.unwrap();
        store.insert(body("User", "DELETE", t)).await.unwrap();
        store.insert(body("Order", "CREATE", t)).await.unwrap();

        let users = store
            .list(&EventFilter::from_pairs([("entity", "User")]))
            .await
            .unwrap();
        assert_eq!(users.len(), 3);
        assert!(users.iter().all(|e| e.entity == "User"));

        let writes = store
            .list(&EventFilter::from_pairs([
                ("entity", "User"),
                ("action", "CREATE"),
                ("action", "UPDATE"),
            ]))
            .await
            .unwrap();
        assert_eq!(writes.len(), 2);
        assert!(
            writes
                .iter()
                .all(|e| e.action == "CREATE" || e.action == "UPDATE")
        );
    }

    #[tokio::test]
    async fn list_is_newest_first_and_capped() {
        let store = MemoryEventStore::new();
        for minute in 0..150 {
            store
                .insert(body("User", "CREATE", base_time() + Duration::minutes(minute)))
                .await
                .unwrap();
        }

        let events = store.list(&EventFilter::new()).await.unwrap();
        assert_eq!(events.len(), MAX_LIST_RESULTS);
        assert_eq!(events[0].time, base_time() + Duration::minutes(149));
        assert!(events.windows(2).all(|pair| pair[0].time >= pair[1].time));
    }

    #[tokio::test]
    async fn unknown_parameter_returns_nothing() {
        let store = MemoryEventStore::new();
        store
            .insert(body("User", "CREATE", base_time()))
            .await
            .unwrap();

        let events = store
            .list(&EventFilter::from_pairs([("colour", "blue")]))
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let store = MemoryEventStore::new();
        let created = store
            .insert(body("User", "CREATE", base_time()))
            .await
            .unwrap();

        let replacement = NewEvent {
            id: Some(EventId::new()),
            entity: String::from("Order"),
            ..NewEvent::default()
        };
        let updated = store.update_by_id(created.id, replacement).await.unwrap();
        assert_eq!(updated.id, created.id);

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entity, "Order");
        assert!(fetched.action.is_empty());
        assert!(fetched.author.is_empty());
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryEventStore::new();
        let id = EventId::new();

        assert!(matches!(
            store.get_by_id(id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_by_id(id, NewEvent::default()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_by_id(id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_event() {
        let store = MemoryEventStore::new();
        let created = store
            .insert(body("User", "CREATE", base_time()))
            .await
            .unwrap();

        store.delete_by_id(created.id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(
            store.delete_by_id(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
