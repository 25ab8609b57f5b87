//! HTTP front end for sheetapi.
//!
//! `POST /` connects a spreadsheet and registers one collection per tab; the per-tab routes
//! then dispatch through the [`CollectionRegistrar`](sheetapi_core::CollectionRegistrar).

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::{Config, RegistrationMode, StoreKind};
pub use error::{ApiError, Operation};
pub use routes::{AppState, router};
pub use store::AnyStore;

use anyhow::{Context, Result};
use sheetapi_core::CollectionRegistrar;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `fallback` when set.
pub fn init_tracing(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

/// Build the store from `config` and serve until ctrl-c.
pub async fn serve(config: Config) -> Result<()> {
    let store = AnyStore::from_config(&config)?;
    info!(store = ?store.kind(), registration = ?config.registration, "store ready");
    let registrar = CollectionRegistrar::with_policy(Arc::new(store), config.registration.into());
    let app = router(AppState::new(registrar, config.port));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server running on port {}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
