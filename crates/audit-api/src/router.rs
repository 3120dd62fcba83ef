//! Axum router construction for the audit API.
//!
//! Assembles the event routes and the API description into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::openapi;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /event` -- list events matching the query parameters
/// - `POST /event` -- add an event
/// - `GET /event/{id}` -- single event
/// - `PUT /event/{id}` -- replace an event
/// - `DELETE /event/{id}` -- remove an event
/// - `GET /swagger` -- `OpenAPI` document
///
/// Unknown routes answer with a JSON 404 and unsupported methods on known
/// routes with a JSON 405. CORS allows any origin so the API description
/// can be loaded by a browser-hosted viewer.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/event",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/event/{id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/swagger", get(openapi::swagger))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
