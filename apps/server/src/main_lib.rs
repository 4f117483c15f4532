use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use pricesync_core::{
    prices::PriceStore,
    securities::SecurityStore,
    sync::{DailyUpdateJob, SyncService, SyncServiceTrait},
};
use pricesync_market_data::{MarketDataProvider, YahooProvider};
use pricesync_storage_sqlite::{db, PriceRepository, SecurityRepository};

pub struct AppState {
    pub sync_service: Arc<dyn SyncServiceTrait>,
    pub security_store: Arc<dyn SecurityStore>,
    pub price_store: Arc<dyn PriceStore>,
    pub daily_job: Arc<DailyUpdateJob>,
}

pub fn init_tracing() {
    let log_format = std::env::var("PS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build the application state backed by Yahoo Finance.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = Arc::new(YahooProvider::new()?);
    build_state_with_provider(config, provider).await
}

/// Build the application state around any market data provider.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn MarketDataProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(pool.clone())?;

    let security_store = Arc::new(SecurityRepository::new(pool.clone(), writer.clone()));
    let price_store = Arc::new(PriceRepository::new(pool, writer));

    tracing::info!("Market data provider: {}", provider.id());
    let sync_service: Arc<dyn SyncServiceTrait> = Arc::new(SyncService::new(
        provider,
        security_store.clone(),
        price_store.clone(),
        config.sync.clone(),
    )?);
    let daily_job = Arc::new(DailyUpdateJob::new(
        sync_service.clone(),
        config.daily.clone(),
    )?);

    Ok(Arc::new(AppState {
        sync_service,
        security_store,
        price_store,
        daily_job,
    }))
}
