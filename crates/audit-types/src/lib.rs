//! Shared type definitions for the audit log service.
//!
//! This crate is the single source of truth for the event record that
//! flows between the HTTP layer and the document store. Types derive
//! [`utoipa::ToSchema`] so the API description served at `/swagger`
//! stays in sync with the wire format.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for event identifiers
//! - [`event`] -- The stored [`Event`] and the [`NewEvent`] request body

pub mod event;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use event::{Event, NewEvent};
pub use ids::EventId;
