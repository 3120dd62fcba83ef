//! `PostgreSQL` implementation of the event collection accessor.
//!
//! Each event is one row of the `events` table: the identifier in the
//! primary key, the body as a JSONB document, and the event time copied
//! into a typed column for ordering. Filters address document keys, so any
//! field name a client sends is a valid (if possibly empty) query.

use audit_types::{Event, EventId, NewEvent};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::StoreError;
use crate::filter::{EventFilter, MAX_LIST_RESULTS};
use crate::repository::EventRepository;

/// Operations on the `events` table.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventRepository for PgEventStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, doc FROM events");
        filter.push_where(&mut builder);
        builder.push(" ORDER BY time DESC, id DESC LIMIT ");
        builder.push_bind(i64::try_from(MAX_LIST_RESULTS).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            conditions = filter.len(),
            count = rows.len(),
            "Listed events"
        );
        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }

    async fn insert(&self, body: NewEvent) -> Result<Event, StoreError> {
        let id = body.id.unwrap_or_default();
        let doc = body.without_id();

        let result = sqlx::query(r"INSERT INTO events (id, time, doc) VALUES ($1, $2, $3)")
            .bind(id.into_inner())
            .bind(doc.time)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(%id, "Inserted event");
                Ok(Event::from_new(id, doc))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateKey(id))
            }
            Err(e) => Err(StoreError::Backend(e)),
        }
    }

    async fn get_by_id(&self, id: EventId) -> Result<Event, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(r"SELECT id, doc FROM events WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(EventRow::into_event)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update_by_id(&self, id: EventId, body: NewEvent) -> Result<Event, StoreError> {
        let doc = body.without_id();

        let result = sqlx::query(r"UPDATE events SET time = $2, doc = $3 WHERE id = $1")
            .bind(id.into_inner())
            .bind(doc.time)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(%id, "Replaced event");
        Ok(Event::from_new(id, doc))
    }

    async fn delete_by_id(&self, id: EventId) -> Result<(), StoreError> {
        let result = sqlx::query(r"DELETE FROM events WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(%id, "Deleted event");
        Ok(())
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// The event body.
    pub doc: Json<NewEvent>,
}

impl EventRow {
    /// Combine the key and document into an [`Event`].
    pub fn into_event(self) -> Event {
        Event::from_new(EventId::from(self.id), self.doc.0)
    }
}

