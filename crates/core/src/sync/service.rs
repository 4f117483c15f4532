use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};

use pricesync_market_data::{MarketDataProvider, RateLimiter, ResponseCache, SearchResult};

use super::config::SyncConfig;
use super::model::{BatchReport, SymbolSnapshot, SymbolUpdateResult};
use super::scheduler::BatchScheduler;
use super::symbol::ResolvedSymbol;
use super::updater::SymbolUpdater;
use crate::errors::{Error, Result, ValidationError};
use crate::prices::PriceStore;
use crate::securities::SecurityStore;

/// Operations exposed to triggers (HTTP handlers, the daily job, tests).
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Update a batch of symbols.
    ///
    /// The whole input is validated first; any invalid symbol or a zero
    /// concurrency rejects the call before any provider traffic.
    async fn synchronize(&self, symbols: &[String], concurrency: usize) -> Result<BatchReport>;

    /// Update one symbol.
    async fn synchronize_one(&self, symbol: &str) -> Result<SymbolUpdateResult>;

    /// Look up symbols at the provider.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Stop tracking a security: remove it with its price points and drop its
    /// cached snapshot. Returns false when no such security existed.
    async fn delete_security(&self, symbol: &str) -> Result<bool>;

    /// Storage symbols of every tracked security.
    fn tracked_symbols(&self) -> Result<Vec<String>>;

    /// Remove price points dated before `cutoff`. Returns the count removed.
    async fn cleanup_before(&self, cutoff: NaiveDate) -> Result<usize>;

    fn config(&self) -> &SyncConfig;
}

/// Default [`SyncServiceTrait`] implementation.
///
/// Owns the process-wide rate limiter and response cache, so one instance
/// should be shared by every trigger.
pub struct SyncService {
    provider: Arc<dyn MarketDataProvider>,
    securities: Arc<dyn SecurityStore>,
    prices: Arc<dyn PriceStore>,
    limiter: Arc<RateLimiter>,
    updater: Arc<SymbolUpdater>,
    scheduler: BatchScheduler,
    config: Arc<SyncConfig>,
}

impl SyncService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        securities: Arc<dyn SecurityStore>,
        prices: Arc<dyn PriceStore>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let limiter = Arc::new(RateLimiter::with_config(config.rate_limit));
        let mut cache = ResponseCache::<SymbolSnapshot>::new(config.cache_ttl);
        if let Some(max) = config.cache_max_entries {
            cache = cache.with_max_entries(max);
        }
        let config = Arc::new(config);

        let updater = Arc::new(SymbolUpdater::new(
            provider.clone(),
            securities.clone(),
            prices.clone(),
            limiter.clone(),
            Arc::new(cache),
            config.clone(),
        ));

        Ok(Self {
            provider,
            securities,
            prices,
            limiter,
            scheduler: BatchScheduler::new(updater.clone()),
            updater,
            config,
        })
    }

    fn resolve(&self, symbol: &str) -> Result<ResolvedSymbol> {
        Ok(ResolvedSymbol::parse(symbol, &self.config.default_suffix)?)
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn synchronize(&self, symbols: &[String], concurrency: usize) -> Result<BatchReport> {
        if concurrency == 0 {
            return Err(ValidationError::InvalidInput(
                "concurrency must be at least 1".to_string(),
            )
            .into());
        }

        let resolved = symbols
            .iter()
            .map(|s| self.resolve(s))
            .collect::<Result<Vec<_>>>()?;

        if resolved.is_empty() {
            debug!("synchronize called with no symbols");
            return Ok(BatchReport::default());
        }

        Ok(self.scheduler.run(resolved, concurrency).await)
    }

    async fn synchronize_one(&self, symbol: &str) -> Result<SymbolUpdateResult> {
        let resolved = self.resolve(symbol)?;
        Ok(self.updater.update(&resolved).await)
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::MissingField("query".to_string()).into());
        }

        self.limiter
            .acquire(&format!("search:{}", query.to_uppercase()))
            .await;
        self.provider
            .search_symbols(query)
            .await
            .map_err(Error::MarketData)
    }

    async fn delete_security(&self, symbol: &str) -> Result<bool> {
        let resolved = self.resolve(symbol)?;
        let deleted = self.securities.delete_security(&resolved.storage).await?;
        self.updater.forget(&resolved.storage);
        if deleted {
            info!("Stopped tracking {}", resolved.storage);
        }
        Ok(deleted)
    }

    fn tracked_symbols(&self) -> Result<Vec<String>> {
        self.securities.list_symbols()
    }

    async fn cleanup_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let deleted = self.prices.delete_points_before(cutoff).await?;
        info!("Removed {} price points dated before {}", deleted, cutoff);
        Ok(deleted)
    }

    fn config(&self) -> &SyncConfig {
        &self.config
    }
}
