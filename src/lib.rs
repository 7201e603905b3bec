pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod http;
pub mod log;
pub mod providers;
pub mod rate_provider;
pub mod store;
pub mod tasks;

use crate::config::AppConfig;
use crate::core::rates::CurrencyEntry;
use crate::history::HistoryService;
use crate::http::AppState;
use crate::providers::currency_api::CurrencyApiProvider;
use crate::store::CurrencyListStore;
use crate::store::disk::FjallStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

fn open_store(config: &AppConfig) -> Result<Arc<FjallStore>> {
    Ok(Arc::new(FjallStore::open(&config.data_dir)?))
}

fn history_service(config: &AppConfig, store: Arc<FjallStore>) -> HistoryService {
    let provider = Arc::new(CurrencyApiProvider::new(&config.api_url, &config.api_key));
    HistoryService::new(store, provider, &config.refresh_key).with_rounding(config.round_latest)
}

/// Runs the HTTP server with the periodic refresh task attached.
pub async fn serve(config: AppConfig) -> Result<()> {
    let store = open_store(&config)?;
    let history = Arc::new(history_service(&config, store.clone()));

    tasks::spawn_refresh(history.clone(), config.refresh_interval);

    let state = AppState {
        history,
        list: store,
    };
    let app = http::router(state, &config.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!(port = config.port, "ratehub listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// One-shot historical bulk load. Long-running: dominated by the mandatory
/// pauses between provider windows.
pub async fn backfill(config: AppConfig) -> Result<()> {
    let store = open_store(&config)?;
    let history = history_service(&config, store);
    info!("starting historical backfill");
    history.backfill().await?;
    info!("historical backfill finished");
    Ok(())
}

/// Seeds the currency list from a JSON file of `{ name, sign }` entries.
pub async fn seed_list(config: AppConfig, path: &str) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read currency list file: {path}"))?;
    let entries: Vec<CurrencyEntry> =
        serde_json::from_str(&raw).context("Currency list file must be a JSON array")?;

    let store = open_store(&config)?;
    store.put_all(&entries).await?;
    info!(count = entries.len(), "seeded currency list");
    Ok(())
}
