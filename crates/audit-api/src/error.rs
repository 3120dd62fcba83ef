//! Error types for the API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Backend
//! details are logged, never returned to the client.

use audit_db::StoreError;
use audit_types::EventId;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of what went wrong.
    pub message: String,
}

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or identifier could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No event exists with the given identifier.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// An event with the given identifier already exists.
    #[error("duplicate event id: {0}")]
    DuplicateKey(EventId),

    /// Any other store failure.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl ApiError {
    /// A malformed request body.
    pub fn invalid_body(detail: impl core::fmt::Display) -> Self {
        Self::BadRequest(format!("Incorrect body: {detail}"))
    }

    /// A path segment that is not a valid event identifier.
    pub fn invalid_id(detail: impl core::fmt::Display) -> Self {
        Self::BadRequest(format!("Invalid event id: {detail}"))
    }

    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client.
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::NotFound(_) => String::from("Event not found"),
            Self::DuplicateKey(_) => String::from("Event with this Id already exists"),
            Self::Store(_) => String::from("Database error"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::DuplicateKey(id) => Self::DuplicateKey(id),
            other => Self::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store(err) = &self {
            tracing::error!(error = %err, "Store operation failed");
        }

        let status = self.status();
        let body = ErrorBody {
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}
