//! `OpenAPI` description of the audit API, served at `GET /swagger`.

use audit_types::{Event, EventId, NewEvent};
use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers;

/// The generated `OpenAPI` 3 document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Audit API documentation",
        description = "Add, list, fetch, replace, and remove audit log events"
    ),
    paths(
        handlers::list_events,
        handlers::create_event,
        handlers::get_event,
        handlers::update_event,
        handlers::delete_event,
    ),
    components(schemas(Event, NewEvent, EventId, ErrorBody)),
    tags((name = "event", description = "Audit log events"))
)]
pub struct ApiDoc;

/// Serve the API description as JSON.
pub async fn swagger() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
