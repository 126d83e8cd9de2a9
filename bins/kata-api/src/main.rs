mod error;
mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use kata_common::catalog::{GraphqlCatalog, ProblemCatalog};
use kata_common::config::Config;
use kata_common::coordinator::ExecutionService;
use kata_common::judge0::Judge0Client;
use kata_common::store::{ProblemStore, RedisProblemStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// Collaborators injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProblemCatalog>,
    pub store: Arc<dyn ProblemStore>,
    pub executor: Arc<dyn ExecutionService>,
}

impl AppState {
    /// Open the production collaborators described by `config`
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let store = RedisProblemStore::open(&config.redis_url)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            catalog: Arc::new(GraphqlCatalog::new(config.catalog_url.clone())),
            store: Arc::new(store),
            executor: Arc::new(Judge0Client::new(config)),
        })
    }

    /// Release collaborators. Connections close as their last handle drops.
    pub fn close(self) {
        info!("Closing catalog, store and execution clients");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("Kata API booting...");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        judge0 = %config.judge0_url,
        catalog = %config.catalog_url,
        base64 = config.judge0_base64,
        "Configuration loaded"
    );

    let state = AppState::open(&config).await?;
    let app = routes::routes().with_state(Arc::new(state.clone()));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Failed to install CTRL+C handler");
                std::future::pending::<()>().await;
            }
            warn!("Received shutdown signal, finishing in-flight requests...");
        })
        .await
        .context("Server error")?;

    state.close();
    info!("API shutdown complete");
    Ok(())
}
