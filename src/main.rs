// =============================================================================
// SPX Bias Engine — Main Entry Point
// =============================================================================
//
// Fetches index bars plus the volatility-index level on a fixed cadence, runs
// the signal pipeline, and serves the latest snapshot over a small REST API.
// A failed cycle is logged and skipped; the previous snapshot stays available.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod error;
mod indicators;
mod market_data;
mod pipeline;
mod runtime_config;
mod series;
mod signals;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::YahooClient;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Env overrides.
    if let Ok(symbol) = std::env::var("SPXBIAS_SYMBOL") {
        config.symbol = symbol;
    }
    if let Ok(addr) = std::env::var("SPXBIAS_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        symbol = %config.symbol,
        aux_symbol = %config.aux_symbol,
        range = %config.range,
        interval = %config.interval,
        refresh_secs = config.refresh_secs,
        "SPX bias engine starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr = api_state.runtime_config.read().bind_addr.clone();
    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    let loop_state = state.clone();
    tokio::spawn(async move {
        let client = YahooClient::new();
        let refresh_secs = loop_state.runtime_config.read().refresh_secs;
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(refresh_secs.max(1)));

        loop {
            interval.tick().await;
            run_refresh_cycle(&loop_state, &client).await;
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("SPX bias engine shut down complete.");
    Ok(())
}

/// One refresh cycle: fetch bars and the aux reading, run the pipeline, and
/// store either the snapshot or the error.
async fn run_refresh_cycle(state: &Arc<AppState>, client: &YahooClient) {
    let (symbol, aux_symbol, range, interval) = {
        let cfg = state.runtime_config.read();
        (
            cfg.symbol.clone(),
            cfg.aux_symbol.clone(),
            cfg.range.clone(),
            cfg.interval.clone(),
        )
    };

    let series = match client.fetch_bars(&symbol, &range, &interval).await {
        Ok(s) => s,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "bar fetch failed — skipping cycle");
            state.store_error(format!("bar fetch failed: {e}"));
            return;
        }
    };

    // A missing aux reading is recoverable: the pipeline reports it as a
    // typed error and the cycle is skipped.
    let aux = match client.fetch_latest_aux(&aux_symbol).await {
        Ok(reading) => Some(reading),
        Err(e) => {
            warn!(aux_symbol = %aux_symbol, error = %e, "aux fetch failed");
            None
        }
    };

    match pipeline::compute_snapshot(&series, aux) {
        Ok(snapshot) => {
            info!(
                symbol = %snapshot.symbol,
                close = snapshot.latest_close,
                aux = snapshot.latest_aux,
                ensemble = snapshot.scores.ensemble_score,
                bias = %snapshot.bias,
                "snapshot refreshed"
            );
            state.store_snapshot(snapshot);
        }
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "pipeline run failed — keeping previous snapshot");
            state.store_error(e.to_string());
        }
    }
}
