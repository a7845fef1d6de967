use std::env;
use std::sync::Arc;

use academia_code_server::api::{self, AppState};
use academia_code_server::db;
use anyhow::Context;
use identity_directory::{DirectoryConfig, HttpDirectory, IdentityProvider, NoopDirectory};
use review_delegate::{ReviewClient, ReviewConfig};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const REVIEW_CONFIG_PATH: &str = "review.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting academia-code server");
    let db = db::init_pool_and_migrate()
        .await
        .context("failed to initialize database")?;

    // Privileged integrations degrade instead of blocking startup: account
    // provisioning becomes a no-op, the review endpoint answers unavailable.
    let directory: Arc<dyn IdentityProvider> = match DirectoryConfig::from_env() {
        Some(config) => {
            info!(api_url = %config.api_url, "directory provisioning enabled");
            Arc::new(HttpDirectory::new(config))
        }
        None => {
            warn!("directory credentials not set, account provisioning is a no-op");
            Arc::new(NoopDirectory)
        }
    };

    let review = match ReviewConfig::from_file(REVIEW_CONFIG_PATH) {
        Ok(config) => {
            info!(model = %config.model, endpoint = %config.endpoint, "review delegate enabled");
            Some(Arc::new(ReviewClient::new(config)))
        }
        Err(err) => {
            warn!(error = %err, "review delegate disabled");
            None
        }
    };

    let state = Arc::new(AppState::new(db, directory, review));
    let app = api::create_router()
        .with_state(state)
        .layer(CorsLayer::permissive());

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(addr = %bind_addr, "server is ready, press Ctrl+C to shut down");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
