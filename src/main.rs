// =============================================================================
// Fractal Markets: Main Entry Point
// =============================================================================
//
// Serves the analysis library over HTTP. Configuration is read from
// FRACTAL_CONFIG (default `analysis_config.json`) and written back on
// shutdown.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fractal_markets::api;
use fractal_markets::app_state::AppState;
use fractal_markets::runtime_config::AnalysisConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Fractal Markets starting up");

    let config_path =
        std::env::var("FRACTAL_CONFIG").unwrap_or_else(|_| "analysis_config.json".into());
    let config = match AnalysisConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, path = %config_path, "Using default analysis config");
            AnalysisConfig::default()
        }
    };

    let state = Arc::new(AppState::new(config, &config_path));

    // ── 2. Cache housekeeping ────────────────────────────────────────────
    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            purge_state.cache.purge_expired();
        }
    });

    // ── 3. API server ────────────────────────────────────────────────────
    let bind_addr =
        std::env::var("FRACTAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, api::router(state.clone()))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await?;

    // ── 4. Persist config ────────────────────────────────────────────────
    if let Err(e) = state.config().save(&state.config_path) {
        error!(error = %e, "Failed to save analysis config on shutdown");
    }

    info!("Fractal Markets shut down complete.");
    Ok(())
}
