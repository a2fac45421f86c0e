use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend, StorageConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

use service::{
    auth::AdminGate,
    aus::{AuService, AuStore},
    file::FileAuStore,
    mongo::MongoAuStore,
    runtime,
};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Open the backend selected by `storage.backend`.
pub async fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn AuStore>, StartupError> {
    cfg.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let store: Arc<dyn AuStore> = match cfg.backend {
        StorageBackend::File => {
            let path = Path::new(&cfg.data_file);
            runtime::ensure_data_dir(path).await?;
            let store = FileAuStore::open(path).await?;
            info!(path = %store.path().display(), "using file storage");
            store
        }
        StorageBackend::Mongodb => {
            MongoAuStore::connect(&cfg.mongodb_uri, &cfg.mongodb_database, &cfg.mongodb_collection).await?
        }
    };
    Ok(store)
}

/// Assemble store, gate, state and router from a validated config.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = open_store(&cfg.storage).await?;

    let gate = AdminGate::new(cfg.admin.token.clone());
    if !gate.is_configured() {
        warn!("ADMIN_TOKEN is not set; every delete will be refused");
    }

    let state = AppState::new(AuService::new(store, gate));
    let cors = routes::build_cors(&cfg.cors)?;
    Ok(routes::build_router(state, cors, cfg.server.max_body_bytes))
}

/// Host/port from the validated config
fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, backend = ?cfg.storage.backend, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
