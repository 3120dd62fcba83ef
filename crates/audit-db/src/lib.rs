//! Document store layer for the audit log service.
//!
//! Audit events live in a single logical collection. Two backends
//! implement the [`EventRepository`] accessor:
//!
//! ```text
//! HTTP handler
//!     |
//!     +-- EventFilter::from_pairs(query) --> EventFilter
//!     |
//!     +-- EventStore (enum dispatch)
//!         |-- PgEventStore      (PostgreSQL JSONB documents, production)
//!         +-- MemoryEventStore  (process-local map, tests and demos)
//! ```
//!
//! # Modules
//!
//! - [`filter`] -- Query parameters to filter expression translation
//! - [`repository`] -- The five-operation collection accessor trait
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`event_store`] -- `PostgreSQL` implementation of the accessor
//! - [`memory_store`] -- In-memory implementation of the accessor
//! - [`error`] -- Shared error types

pub mod error;
pub mod event_store;
pub mod filter;
pub mod memory_store;
pub mod postgres;
pub mod repository;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use event_store::PgEventStore;
pub use filter::{Condition, EventFilter, MAX_LIST_RESULTS};
pub use memory_store::MemoryEventStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use repository::{EventRepository, EventStore};
