//! REST API for the audit log service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Event CRUD** under `/event` and `/event/{id}`
//! - **Filtered listing**: every query parameter on `GET /event` becomes a
//!   condition on the document field of the same name (see
//!   [`audit_db::filter`])
//! - **API description** (`GET /swagger`) as an `OpenAPI` 3 document
//!
//! # Architecture
//!
//! Handlers receive the selected [`EventStore`](audit_db::EventStore)
//! through the shared [`AppState`]; there is no global store handle.
//! Every failure is converted to an [`ApiError`] at the handler boundary
//! and rendered as `{"message": "..."}` with a 400, 404, or 500 status.
//!
//! [`ApiError`]: error::ApiError

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::{ApiError, ErrorBody};
pub use openapi::ApiDoc;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, shutdown_signal, start_server};
pub use state::AppState;
