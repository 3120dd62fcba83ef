//! The audit event record.
//!
//! An [`Event`] is what the store hands back: every field present,
//! identifier included. A [`NewEvent`] is what clients send on create and
//! update: the identifier is optional and every other field decodes to its
//! zero value when missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::EventId;

/// A single audit log entry as stored and returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Store-assigned identifier. Immutable once assigned.
    pub id: EventId,
    /// The kind of entity the event is about (e.g. `User`).
    pub entity: String,
    /// What happened to the entity (e.g. `CREATE`, `UPDATE`).
    pub action: String,
    /// Free-text description of the event.
    pub event: String,
    /// When the audited action happened.
    pub time: DateTime<Utc>,
    /// Who performed the action.
    pub author: String,
}

impl Event {
    /// Build a stored event from an identifier and a request body.
    ///
    /// Any identifier carried by `body` is discarded in favour of `id`.
    pub fn from_new(id: EventId, body: NewEvent) -> Self {
        Self {
            id,
            entity: body.entity,
            action: body.action,
            event: body.event,
            time: body.time,
            author: body.author,
        }
    }
}

/// Request body for creating or replacing an event.
///
/// Missing fields take their zero value (empty string, Unix epoch for
/// `time`). Serializing a body without an identifier yields the document
/// form persisted by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewEvent {
    /// Optional client-chosen identifier. Honoured on create, ignored on
    /// update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    /// The kind of entity the event is about.
    pub entity: String,
    /// What happened to the entity.
    pub action: String,
    /// Free-text description of the event.
    pub event: String,
    /// When the audited action happened.
    pub time: DateTime<Utc>,
    /// Who performed the action.
    pub author: String,
}

impl NewEvent {
    /// Strip the identifier, leaving only the document fields.
    #[must_use]
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }
}
