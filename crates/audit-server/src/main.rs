//! Audit log service binary.
//!
//! Wires configuration, logging, the event store and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `audit-config.yaml` (or `AUDIT_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured event store, running migrations for `PostgreSQL`
//! 4. Build the router and serve until a shutdown signal arrives
//! 5. Close the connection pool

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use audit_api::{AppState, ServerConfig};
use audit_db::{EventStore, MemoryEventStore, PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AuditConfig, LoggingSection, StoreBackend, StoreSection};
use crate::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let explicit_path = std::env::var_os("AUDIT_CONFIG").map(PathBuf::from);
    let (config, config_path) = AuditConfig::load(explicit_path.as_deref())?;
    init_logging(&config.logging);

    info!(
        path = ?config_path,
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.store.backend,
        "Configuration loaded"
    );

    let (store, pool) = open_store(&config.store).await?;
    info!(backend = store.backend_name(), "Event store ready");

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(store));
    let result = audit_api::start_server(&server_config, state, audit_api::shutdown_signal()).await;

    if let Some(pool) = pool {
        pool.close().await;
    }

    result?;
    info!("audit-server exiting");
    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence
/// over the configured level.
fn init_logging(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Open the configured backend. The pool is returned separately so it can
/// be closed after the server stops.
async fn open_store(store: &StoreSection) -> Result<(EventStore, Option<PostgresPool>), AppError> {
    match store.backend {
        StoreBackend::Postgres => {
            let pg_config = PostgresConfig::new(&store.postgres_url)
                .with_max_connections(store.max_connections)
                .with_acquire_timeout(Duration::from_secs(store.acquire_timeout_secs))
                .with_idle_timeout(Duration::from_secs(store.idle_timeout_secs));

            let pool = PostgresPool::open(&pg_config).await?;
            Ok((pool.event_store().into(), Some(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory event store; contents are lost on exit");
            Ok((MemoryEventStore::new().into(), None))
        }
    }
}
