mod config;
mod error;
mod handlers;
mod routes;

use autotest_common::simulator::RunSimulator;
use autotest_common::store::TestCaseStore;
use clap::Parser;
use config::ServerConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Shared per-process handles, built once at startup and injected into handlers
pub struct AppState {
    pub store: Arc<dyn TestCaseStore>,
    pub simulator: Arc<RunSimulator>,
}

fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "autotest_api={level},autotest_common={level},tower_http=info",
            level = config.log_level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to install CTRL+C handler");
        return;
    }
    warn!("Received shutdown signal, finishing in-flight requests...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Configuration error: {}", e);
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    info!("Autotest API booting...");

    let store = config.store_config().open_store()?;
    info!(
        backend = store.backend_name(),
        database = %config.database_url,
        "Store initialized"
    );

    let state = Arc::new(AppState {
        store,
        simulator: Arc::new(RunSimulator::new()),
    });

    let app = routes::app(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
