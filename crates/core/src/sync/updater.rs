//! Single-symbol update.
//!
//! ```text
//! cache hit? ──yes──► return cached snapshot
//!     │ no
//!     ▼
//! acquire ─► quote (deadline, fatal)
//!     ▼
//! acquire ─► history (deadline, degrades to empty)
//!     ▼
//! upsert security (fatal) ─► upsert each point (skip on error)
//!     ▼
//! snapshot ─► cache
//! ```

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, error, warn};
use tokio::time::timeout;

use pricesync_market_data::{
    suffix_info, HistoricalBar, MarketDataError, MarketDataProvider, QuoteSnapshot, RateLimiter,
    ResponseCache,
};

use super::config::SyncConfig;
use super::model::{
    PersistTarget, SymbolSnapshot, SymbolUpdate, SymbolUpdateResult, UpdateError, UpdateStep,
};
use super::symbol::ResolvedSymbol;
use crate::constants::{QUOTE_CACHE_KEY_PREFIX, UNKNOWN_EXCHANGE};
use crate::prices::{DailyPricePoint, PriceStore};
use crate::securities::{NewSecurity, SecurityStore};

/// Cache key for a symbol's quote snapshot.
pub fn quote_cache_key(storage_symbol: &str) -> String {
    format!("{}{}", QUOTE_CACHE_KEY_PREFIX, storage_symbol)
}

/// Runs the update for one symbol against shared collaborators.
///
/// Safe to call concurrently for any mix of symbols; the rate limiter and
/// cache are the only shared mutable state.
pub struct SymbolUpdater {
    provider: Arc<dyn MarketDataProvider>,
    securities: Arc<dyn SecurityStore>,
    prices: Arc<dyn PriceStore>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache<SymbolSnapshot>>,
    config: Arc<SyncConfig>,
}

impl SymbolUpdater {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        securities: Arc<dyn SecurityStore>,
        prices: Arc<dyn PriceStore>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache<SymbolSnapshot>>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            provider,
            securities,
            prices,
            limiter,
            cache,
            config,
        }
    }

    /// Update one symbol. Never panics on provider or storage failure; every
    /// problem ends up in the returned result.
    pub async fn update(&self, symbol: &ResolvedSymbol) -> SymbolUpdateResult {
        let cache_key = quote_cache_key(&symbol.storage);
        if let Some(snapshot) = self.cached_snapshot(&symbol.storage, &cache_key) {
            debug!("Serving {} from cache", symbol.storage);
            return SymbolUpdateResult::succeeded(
                symbol.input.clone(),
                SymbolUpdate {
                    snapshot,
                    points_written: 0,
                    warnings: Vec::new(),
                    from_cache: true,
                },
            );
        }

        match self.run(symbol).await {
            Ok(update) => {
                self.cache.put(cache_key, update.snapshot.clone());
                SymbolUpdateResult::succeeded(symbol.input.clone(), update)
            }
            Err(e) => {
                error!("Update failed for {}: {}", symbol.provider, e);
                SymbolUpdateResult::failed(symbol.input.clone(), e)
            }
        }
    }

    /// A fresh cached snapshot, only while its security row still exists.
    fn cached_snapshot(&self, storage_symbol: &str, cache_key: &str) -> Option<SymbolSnapshot> {
        let snapshot = self.cache.get(cache_key)?;
        match self.securities.find_security(storage_symbol) {
            Ok(Some(_)) => Some(snapshot),
            Ok(None) => {
                debug!("Dropping cached {}: security no longer stored", storage_symbol);
                self.cache.invalidate(cache_key);
                None
            }
            Err(e) => {
                warn!("Security lookup for {} failed, refetching: {}", storage_symbol, e);
                None
            }
        }
    }

    /// Drop the cached snapshot for a storage symbol.
    pub fn forget(&self, storage_symbol: &str) {
        self.cache.invalidate(&quote_cache_key(storage_symbol));
    }

    async fn run(&self, symbol: &ResolvedSymbol) -> Result<SymbolUpdate, UpdateError> {
        let quote = self.fetch_quote(symbol).await?;

        let mut warnings = Vec::new();
        let bars = match self.fetch_history(symbol).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!("Continuing {} without history: {}", symbol.provider, e);
                warnings.push(e);
                Vec::new()
            }
        };

        let security = self
            .securities
            .upsert_security(self.security_from_quote(symbol, &quote))
            .await
            .map_err(|e| UpdateError::PersistenceFailed {
                symbol: symbol.storage.clone(),
                target: PersistTarget::Security,
                message: e.to_string(),
            })?;

        let mut points_written = 0;
        for point in bars
            .iter()
            .filter_map(|bar| DailyPricePoint::from_bar(&symbol.storage, bar))
        {
            match self.prices.upsert_price_point(&point).await {
                Ok(()) => points_written += 1,
                Err(e) => {
                    warn!(
                        "Skipping price point {} for {}: {}",
                        point.date, symbol.storage, e
                    );
                    warnings.push(UpdateError::PersistenceFailed {
                        symbol: symbol.storage.clone(),
                        target: PersistTarget::PricePoint(point.date),
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Updated {} ({} points, {} warnings)",
            symbol.storage,
            points_written,
            warnings.len()
        );

        Ok(SymbolUpdate {
            snapshot: SymbolSnapshot::new(&security, symbol, &quote, Utc::now()),
            points_written,
            warnings,
            from_cache: false,
        })
    }

    async fn fetch_quote(&self, symbol: &ResolvedSymbol) -> Result<QuoteSnapshot, UpdateError> {
        self.limiter.acquire(&symbol.storage).await;

        let deadline = self.config.quote_timeout;
        match timeout(deadline, self.provider.fetch_quote(&symbol.provider)).await {
            Ok(Ok(quote)) => Ok(quote),
            Ok(Err(e)) if e.is_timeout() => Err(UpdateError::timeout(
                &symbol.storage,
                UpdateStep::Quote,
                deadline,
            )),
            Ok(Err(e)) => Err(UpdateError::QuoteFetchFailed {
                symbol: symbol.storage.clone(),
                message: e.to_string(),
            }),
            Err(_) => Err(UpdateError::timeout(
                &symbol.storage,
                UpdateStep::Quote,
                deadline,
            )),
        }
    }

    async fn fetch_history(
        &self,
        symbol: &ResolvedSymbol,
    ) -> Result<Vec<HistoricalBar>, UpdateError> {
        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(self.config.history_days);

        self.limiter.acquire(&symbol.storage).await;

        let deadline = self.config.historical_timeout;
        let fetch = self.provider.fetch_historical(
            &symbol.provider,
            start,
            end,
            self.config.history_interval,
        );
        match timeout(deadline, fetch).await {
            Ok(Ok(bars)) => Ok(bars),
            Ok(Err(MarketDataError::NoDataForRange)) => {
                debug!("No bars for {} between {} and {}", symbol.provider, start, end);
                Ok(Vec::new())
            }
            Ok(Err(e)) if e.is_timeout() => Err(UpdateError::timeout(
                &symbol.storage,
                UpdateStep::Historical,
                deadline,
            )),
            Ok(Err(e)) => Err(UpdateError::HistoricalFetchFailed {
                symbol: symbol.storage.clone(),
                message: e.to_string(),
            }),
            Err(_) => Err(UpdateError::timeout(
                &symbol.storage,
                UpdateStep::Historical,
                deadline,
            )),
        }
    }

    fn security_from_quote(&self, symbol: &ResolvedSymbol, quote: &QuoteSnapshot) -> NewSecurity {
        let name = quote
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| symbol.storage.clone());

        let exchange = suffix_info(&symbol.provider)
            .map(|s| s.exchange.to_string())
            .or_else(|| quote.exchange_name.clone())
            .unwrap_or_else(|| UNKNOWN_EXCHANGE.to_string());

        let currency = quote
            .currency
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.config.default_currency.clone());

        NewSecurity {
            symbol: symbol.storage.clone(),
            name,
            sector: quote.sector.clone(),
            industry: quote.industry.clone(),
            market_cap: quote.market_cap,
            currency,
            exchange,
        }
    }
}
