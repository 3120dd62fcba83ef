//! REST API endpoint handlers.
//!
//! Each handler decodes its inputs, makes one store call, and encodes the
//! result. Decode failures and store errors become [`ApiError`] values and
//! never escape the request.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/event` | List events matching the query parameters |
//! | `POST` | `/event` | Add an event |
//! | `GET` | `/event/{id}` | Get a single event |
//! | `PUT` | `/event/{id}` | Replace an event |
//! | `DELETE` | `/event/{id}` | Remove an event |

use std::sync::Arc;

use audit_db::{EventFilter, EventRepository};
use audit_types::{Event, EventId, NewEvent};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /event -- filtered listing
// ---------------------------------------------------------------------------

/// Return the events matching every query parameter, newest first.
///
/// A parameter given once requires equality; a parameter repeated requires
/// membership, e.g. `?action=CREATE&action=UPDATE`. At most 100 events are
/// returned.
#[utoipa::path(
    get,
    path = "/event",
    tag = "event",
    params(
        ("entity" = Option<String>, Query, description = "Match on entity; repeat for any-of"),
        ("action" = Option<String>, Query, description = "Match on action; repeat for any-of"),
        ("author" = Option<String>, Query, description = "Match on author; repeat for any-of"),
    ),
    responses(
        (status = 200, description = "Matching events, newest first", body = [Event]),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let Query(pairs) = query?;
    let filter = EventFilter::from_pairs(pairs);
    tracing::debug!(?filter, "Listing events");

    let events = state.store.list(&filter).await?;
    Ok(Json(events))
}

// ---------------------------------------------------------------------------
// POST /event -- create
// ---------------------------------------------------------------------------

/// Add a new event to the audit log.
///
/// Responds `201 Created` with a `Location` header pointing at the new
/// event and the stored event as the body.
#[utoipa::path(
    post,
    path = "/event",
    tag = "event",
    request_body(content = NewEvent, description = "Event to add to the audit log"),
    responses(
        (status = 201, description = "Event added", body = Event,
            headers(("Location" = String, description = "Path of the new event"))),
        (status = 400, description = "Malformed body or duplicate id", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewEvent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let event = state.store.insert(body).await?;

    tracing::info!(id = %event.id, entity = %event.entity, action = %event.action, "Event added");

    let location = format!("/event/{}", event.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(event),
    ))
}

// ---------------------------------------------------------------------------
// GET /event/{id} -- single event
// ---------------------------------------------------------------------------

/// Return a single event by identifier.
#[utoipa::path(
    get,
    path = "/event/{id}",
    tag = "event",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "The event", body = Event),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "No such event", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_id(&id_str)?;
    let event = state.store.get_by_id(id).await?;
    Ok(Json(event))
}

// ---------------------------------------------------------------------------
// PUT /event/{id} -- full replace
// ---------------------------------------------------------------------------

/// Replace every field of an existing event.
///
/// The identifier in the path wins over any `id` in the body.
#[utoipa::path(
    put,
    path = "/event/{id}",
    tag = "event",
    params(("id" = String, Path, description = "Event identifier")),
    request_body(content = NewEvent, description = "Replacement event"),
    responses(
        (status = 204, description = "Event replaced"),
        (status = 400, description = "Malformed identifier or body", body = ErrorBody),
        (status = 404, description = "No such event", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Result<Json<NewEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id_str)?;
    let Json(body) = body?;
    state.store.update_by_id(id, body).await?;

    tracing::info!(%id, "Event replaced");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// DELETE /event/{id}
// ---------------------------------------------------------------------------

/// Remove an event.
#[utoipa::path(
    delete,
    path = "/event/{id}",
    tag = "event",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event removed"),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "No such event", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id_str)?;
    state.store.delete_by_id(id).await?;

    tracing::info!(%id, "Event removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// JSON 404 for any route not in the table.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: String::from("Not found"),
        }),
    )
}

/// JSON 405 for a known path hit with a method it does not serve.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            message: String::from("Method not allowed"),
        }),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an event identifier, returning an [`ApiError`] on failure.
fn parse_id(s: &str) -> Result<EventId, ApiError> {
    s.parse::<EventId>()
        .map_err(|e| ApiError::invalid_id(format!("{s}: {e}")))
}
