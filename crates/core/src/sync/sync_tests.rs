//! Tests for the synchronization engine against mock collaborators.
//!
//! Timing-sensitive tests run on tokio's paused clock, so rate-limit waits
//! and fetch deadlines elapse instantly in virtual time.

#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result};
    use crate::prices::{DailyPricePoint, PriceStore};
    use crate::securities::{NewSecurity, Security, SecurityStore};
    use crate::sync::{
        DailyUpdateJob, DailyUpdatePolicy, PersistTarget, SyncConfig, SyncService,
        SyncServiceTrait, UpdateError, UpdateStep,
    };
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
    use pricesync_market_data::{
        HistoricalBar, Interval, MarketDataError, MarketDataProvider, QuoteSnapshot, SearchResult,
    };
    use rust_decimal_macros::dec;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    // =========================================================================
    // Mock MarketDataProvider
    // =========================================================================

    #[derive(Clone, Debug)]
    enum Behavior {
        Succeed,
        Delay(Duration),
        Fail(&'static str),
        Hang,
        Panic,
    }

    #[derive(Default)]
    struct MockProvider {
        quote_behavior: Mutex<HashMap<String, Behavior>>,
        history_behavior: Mutex<HashMap<String, Behavior>>,
        quote_overrides: Mutex<HashMap<String, QuoteSnapshot>>,
        calls: Mutex<Vec<(&'static str, String, Instant)>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl MockProvider {
        fn on_quote(&self, symbol: &str, behavior: Behavior) {
            self.quote_behavior
                .lock()
                .unwrap()
                .insert(symbol.to_string(), behavior);
        }

        fn on_history(&self, symbol: &str, behavior: Behavior) {
            self.history_behavior
                .lock()
                .unwrap()
                .insert(symbol.to_string(), behavior);
        }

        fn with_quote(&self, quote: QuoteSnapshot) {
            self.quote_overrides
                .lock()
                .unwrap()
                .insert(quote.symbol.clone(), quote);
        }

        fn calls(&self, kind: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _, _)| *k == kind)
                .map(|(_, s, _)| s.clone())
                .collect()
        }

        fn call_instants(&self) -> Vec<(String, Instant)> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, s, at)| (s.clone(), *at))
                .collect()
        }

        fn record(&self, kind: &'static str, symbol: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((kind, symbol.to_string(), Instant::now()));
        }

        async fn apply(&self, behavior: Behavior) -> std::result::Result<(), MarketDataError> {
            match behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Delay(d) => {
                    tokio::time::sleep(d).await;
                    Ok(())
                }
                Behavior::Fail(message) => Err(MarketDataError::ProviderError {
                    provider: "MOCK".to_string(),
                    message: message.to_string(),
                }),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
                Behavior::Panic => panic!("mock provider exploded"),
            }
        }
    }

    fn default_quote(symbol: &str) -> QuoteSnapshot {
        let mut quote = QuoteSnapshot::new(symbol, dec!(110));
        quote.regular_market_previous_close = Some(dec!(100));
        quote.long_name = Some(format!("{} Limited", symbol));
        quote.currency = Some("INR".to_string());
        quote.regular_market_volume = Some(1_000);
        quote
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn default_history() -> Vec<HistoricalBar> {
        vec![
            HistoricalBar {
                date: Some(day(3)),
                open: Some(dec!(100)),
                high: Some(dec!(112)),
                low: Some(dec!(99)),
                close: Some(dec!(110)),
                volume: Some(5_000),
                adj_close: Some(dec!(110)),
            },
            HistoricalBar {
                date: Some(day(4)),
                close: Some(dec!(111)),
                ..Default::default()
            },
            // Undated rows are dropped.
            HistoricalBar {
                date: None,
                close: Some(dec!(1)),
                ..Default::default()
            },
        ]
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn fetch_quote(
            &self,
            symbol: &str,
        ) -> std::result::Result<QuoteSnapshot, MarketDataError> {
            self.record("quote", symbol);
            let behavior = self
                .quote_behavior
                .lock()
                .unwrap()
                .get(symbol)
                .cloned()
                .unwrap_or(Behavior::Succeed);

            if matches!(behavior, Behavior::Succeed | Behavior::Delay(_)) {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_active.fetch_max(now, Ordering::SeqCst);
            }

            self.apply(behavior).await?;

            let quote = self
                .quote_overrides
                .lock()
                .unwrap()
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| default_quote(symbol));
            Ok(quote)
        }

        async fn fetch_historical(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
            interval: Interval,
        ) -> std::result::Result<Vec<HistoricalBar>, MarketDataError> {
            assert!(start < end);
            assert_eq!(interval, Interval::Daily);
            self.record("history", symbol);

            let behavior = self
                .history_behavior
                .lock()
                .unwrap()
                .get(symbol)
                .cloned()
                .unwrap_or(Behavior::Succeed);
            let outcome = self.apply(behavior).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            outcome?;

            Ok(default_history())
        }

        async fn search_symbols(
            &self,
            query: &str,
        ) -> std::result::Result<Vec<SearchResult>, MarketDataError> {
            self.record("search", query);
            Ok(vec![SearchResult::new(
                format!("{}.NS", query.to_uppercase()),
                "Match Limited",
                "NSI",
                "EQUITY",
            )])
        }
    }

    // =========================================================================
    // In-memory stores
    // =========================================================================

    #[derive(Default)]
    struct MockSecurityStore {
        securities: Mutex<BTreeMap<String, Security>>,
        fail_on_upsert: Mutex<HashSet<String>>,
        upserts: AtomicUsize,
    }

    impl MockSecurityStore {
        fn get(&self, symbol: &str) -> Option<Security> {
            self.securities.lock().unwrap().get(symbol).cloned()
        }

        fn seed(&self, symbols: &[&str]) {
            let now = Utc::now().naive_utc();
            let mut securities = self.securities.lock().unwrap();
            for symbol in symbols {
                let security = NewSecurity {
                    symbol: symbol.to_string(),
                    name: symbol.to_string(),
                    sector: None,
                    industry: None,
                    market_cap: None,
                    currency: "INR".to_string(),
                    exchange: "NSE".to_string(),
                }
                .into_security(None, now);
                securities.insert(symbol.to_string(), security);
            }
        }
    }

    #[async_trait]
    impl SecurityStore for MockSecurityStore {
        async fn upsert_security(&self, security: NewSecurity) -> Result<Security> {
            if self
                .fail_on_upsert
                .lock()
                .unwrap()
                .contains(&security.symbol)
            {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "Intentional upsert failure".to_string(),
                )));
            }
            self.upserts.fetch_add(1, Ordering::SeqCst);
            let mut securities = self.securities.lock().unwrap();
            let existing = securities.get(&security.symbol).cloned();
            let stored = security.into_security(existing.as_ref(), Utc::now().naive_utc());
            securities.insert(stored.symbol.clone(), stored.clone());
            Ok(stored)
        }

        async fn delete_security(&self, symbol: &str) -> Result<bool> {
            Ok(self.securities.lock().unwrap().remove(symbol).is_some())
        }

        fn find_security(&self, symbol: &str) -> Result<Option<Security>> {
            Ok(self.get(symbol))
        }

        fn list_securities(&self) -> Result<Vec<Security>> {
            Ok(self.securities.lock().unwrap().values().cloned().collect())
        }

        fn list_symbols(&self) -> Result<Vec<String>> {
            Ok(self.securities.lock().unwrap().keys().cloned().collect())
        }
    }

    #[derive(Default)]
    struct MockPriceStore {
        points: Mutex<BTreeMap<(String, NaiveDate), DailyPricePoint>>,
        fail_dates: Mutex<HashSet<NaiveDate>>,
        writes: AtomicUsize,
        cleanup_cutoffs: Mutex<Vec<NaiveDate>>,
    }

    impl MockPriceStore {
        fn count_for(&self, symbol: &str) -> usize {
            self.points
                .lock()
                .unwrap()
                .keys()
                .filter(|(s, _)| s == symbol)
                .count()
        }
    }

    #[async_trait]
    impl PriceStore for MockPriceStore {
        async fn upsert_price_point(&self, point: &DailyPricePoint) -> Result<()> {
            if self.fail_dates.lock().unwrap().contains(&point.date) {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "Intentional point failure".to_string(),
                )));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.points
                .lock()
                .unwrap()
                .insert((point.symbol.clone(), point.date), point.clone());
            Ok(())
        }

        async fn delete_points_before(&self, cutoff: NaiveDate) -> Result<usize> {
            self.cleanup_cutoffs.lock().unwrap().push(cutoff);
            let mut points = self.points.lock().unwrap();
            let before = points.len();
            points.retain(|(_, date), _| *date >= cutoff);
            Ok(before - points.len())
        }

        fn price_points(
            &self,
            symbol: &str,
            from: Option<NaiveDate>,
            to: Option<NaiveDate>,
        ) -> Result<Vec<DailyPricePoint>> {
            Ok(self
                .points
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.symbol == symbol)
                .filter(|p| from.map_or(true, |f| p.date >= f))
                .filter(|p| to.map_or(true, |t| p.date <= t))
                .cloned()
                .collect())
        }
    }

    // =========================================================================
    // Harness
    // =========================================================================

    struct Harness {
        provider: Arc<MockProvider>,
        securities: Arc<MockSecurityStore>,
        prices: Arc<MockPriceStore>,
        service: Arc<SyncService>,
    }

    fn harness() -> Harness {
        harness_with(SyncConfig::default())
    }

    fn harness_with(config: SyncConfig) -> Harness {
        let provider = Arc::new(MockProvider::default());
        let securities = Arc::new(MockSecurityStore::default());
        let prices = Arc::new(MockPriceStore::default());
        let service = Arc::new(
            SyncService::new(provider.clone(), securities.clone(), prices.clone(), config)
                .unwrap(),
        );
        Harness {
            provider,
            securities,
            prices,
            service,
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Batch behavior
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_quote_timeout_fails_only_that_symbol() {
        let h = harness();
        h.provider.on_quote("BBB.NS", Behavior::Hang);

        let report = h
            .service
            .synchronize(&symbols(&["AAA", "BBB", "CCC"]), 2)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, vec!["AAA", "CCC"]);
        assert_eq!(report.failed, vec!["BBB"]);

        let bbb = &report.results[1];
        assert_eq!(bbb.symbol, "BBB");
        assert_eq!(
            bbb.error(),
            Some(&UpdateError::Timeout {
                symbol: "BBB".to_string(),
                step: UpdateStep::Quote,
                after_ms: 10_000,
            })
        );

        // Fatal quote failure: no history call, no writes.
        assert!(!h.provider.calls("history").contains(&"BBB.NS".to_string()));
        assert!(h.securities.get("BBB").is_none());
        assert_eq!(h.prices.count_for("BBB"), 0);
        assert!(h.securities.get("AAA").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_error_is_isolated() {
        let h = harness();
        h.provider.on_quote("BBB.NS", Behavior::Fail("HTTP 500"));

        let report = h
            .service
            .synchronize(&symbols(&["AAA", "BBB", "CCC"]), 3)
            .await
            .unwrap();

        assert_eq!(report.succeeded, vec!["AAA", "CCC"]);
        assert_eq!(report.failed, vec!["BBB"]);
        assert!(matches!(
            report.results[1].error(),
            Some(UpdateError::QuoteFetchFailed { .. })
        ));
        assert_eq!(h.prices.count_for("AAA"), 2);
        assert_eq!(h.prices.count_for("CCC"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_input_order() {
        let h = harness();
        h.provider
            .on_quote("SLOW.NS", Behavior::Delay(Duration::from_secs(5)));

        let input = symbols(&["SLOW", "FAST1", "FAST2", "FAST3"]);
        let report = h.service.synchronize(&input, 4).await.unwrap();

        let order: Vec<&str> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["SLOW", "FAST1", "FAST2", "FAST3"]);
        assert_eq!(report.succeeded, input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bound_is_respected() {
        for bound in [1usize, 2, 3] {
            let h = harness();
            let input: Vec<String> = (0..8).map(|i| format!("SYM{}", i)).collect();
            for symbol in &input {
                h.provider.on_quote(
                    &format!("{}.NS", symbol),
                    Behavior::Delay(Duration::from_secs(2)),
                );
            }

            let report = h.service.synchronize(&input, bound).await.unwrap();

            assert_eq!(report.succeeded.len(), 8);
            let max_active = h.provider.max_active.load(Ordering::SeqCst);
            assert!(
                max_active <= bound,
                "observed {} in flight with bound {}",
                max_active,
                bound
            );
            assert_eq!(max_active, bound);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_calls_respect_rate_limits() {
        let h = harness();

        h.service
            .synchronize(&symbols(&["AAA", "BBB", "CCC"]), 3)
            .await
            .unwrap();

        let calls = h.provider.call_instants();
        assert_eq!(calls.len(), 6);

        for pair in calls.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= Duration::from_millis(200));
        }

        let mut last_by_symbol: HashMap<String, Instant> = HashMap::new();
        for (symbol, at) in calls {
            if let Some(prev) = last_by_symbol.insert(symbol.clone(), at) {
                assert!(
                    at.duration_since(prev) >= Duration::from_secs(1),
                    "{} called twice within a second",
                    symbol
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_update_is_contained() {
        let h = harness();
        h.provider.on_quote("BOOM.NS", Behavior::Panic);

        let report = h
            .service
            .synchronize(&symbols(&["AAA", "BOOM", "CCC"]), 2)
            .await
            .unwrap();

        assert_eq!(report.succeeded, vec!["AAA", "CCC"]);
        assert_eq!(report.failed, vec!["BOOM"]);
        assert!(matches!(
            report.results[1].error(),
            Some(UpdateError::Aborted { .. })
        ));
    }

    // =========================================================================
    // Degraded updates
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_historical_failure_still_succeeds() {
        let h = harness();
        h.provider.on_history("AAA.NS", Behavior::Fail("chart down"));

        let result = h.service.synchronize_one("AAA").await.unwrap();

        let update = result.outcome.as_ref().unwrap();
        assert_eq!(update.points_written, 0);
        assert!(matches!(
            update.warnings.as_slice(),
            [UpdateError::HistoricalFetchFailed { .. }]
        ));
        assert_eq!(h.prices.writes.load(Ordering::SeqCst), 0);
        assert_eq!(h.securities.get("AAA").unwrap().name, "AAA.NS Limited");
    }

    #[tokio::test(start_paused = true)]
    async fn test_historical_timeout_still_succeeds() {
        let h = harness();
        h.provider.on_history("AAA.NS", Behavior::Hang);

        let result = h.service.synchronize_one("AAA").await.unwrap();

        let update = result.outcome.as_ref().unwrap();
        assert_eq!(
            update.warnings,
            vec![UpdateError::Timeout {
                symbol: "AAA".to_string(),
                step: UpdateStep::Historical,
                after_ms: 15_000,
            }]
        );
        assert_eq!(update.points_written, 0);
        assert!(h.securities.get("AAA").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_point_is_skipped() {
        let h = harness();
        h.prices.fail_dates.lock().unwrap().insert(day(3));

        let result = h.service.synchronize_one("AAA").await.unwrap();

        let update = result.outcome.as_ref().unwrap();
        assert_eq!(update.points_written, 1);
        match update.warnings.as_slice() {
            [UpdateError::PersistenceFailed {
                symbol,
                target,
                message,
            }] => {
                assert_eq!(symbol, "AAA");
                assert_eq!(*target, PersistTarget::PricePoint(day(3)));
                assert!(message.contains("Intentional point failure"));
            }
            other => panic!("unexpected warnings: {:?}", other),
        }
        let stored = h.prices.price_points("AAA", None, None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].date, day(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_security_write_failure_is_fatal() {
        let h = harness();
        h.securities
            .fail_on_upsert
            .lock()
            .unwrap()
            .insert("AAA".to_string());

        let result = h.service.synchronize_one("AAA").await.unwrap();

        assert!(matches!(
            result.error(),
            Some(UpdateError::PersistenceFailed {
                target: PersistTarget::Security,
                ..
            })
        ));
        assert_eq!(h.prices.writes.load(Ordering::SeqCst), 0);
    }

    // =========================================================================
    // Persistence mapping and idempotence
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_security_fields_are_mapped_from_quote() {
        let h = harness();
        let mut quote = QuoteSnapshot::new("500325.BO", dec!(2950));
        quote.short_name = Some("RELIANCE".to_string());
        quote.sector = Some("Energy".to_string());
        quote.market_cap = Some(dec!(19960000000000));
        h.provider.with_quote(quote);

        let result = h.service.synchronize_one("500325.bo").await.unwrap();
        let snapshot = &result.outcome.as_ref().unwrap().snapshot;

        assert_eq!(snapshot.symbol, "500325.BO");
        assert_eq!(snapshot.name, "RELIANCE");
        assert_eq!(snapshot.exchange, "BSE");
        assert_eq!(snapshot.currency, "INR");
        assert_eq!(snapshot.change, dec!(0));
        assert_eq!(snapshot.change_percent, dec!(0));

        let stored = h.securities.get("500325.BO").unwrap();
        assert_eq!(stored.sector.as_deref(), Some("Energy"));
        assert_eq!(stored.market_cap, Some(dec!(19960000000000)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_is_derived_from_previous_close() {
        let h = harness();

        let result = h.service.synchronize_one("TCS").await.unwrap();
        let snapshot = &result.outcome.as_ref().unwrap().snapshot;

        assert_eq!(snapshot.symbol, "TCS");
        assert_eq!(snapshot.provider_symbol, "TCS.NS");
        assert_eq!(snapshot.exchange, "NSE");
        assert_eq!(snapshot.price, dec!(110));
        assert_eq!(snapshot.change, dec!(10));
        assert_eq!(snapshot.change_percent, dec!(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_updates_are_idempotent() {
        let h = harness();

        h.service.synchronize_one("AAA").await.unwrap();
        let first = h.securities.get("AAA").unwrap();
        let first_points = h.prices.price_points("AAA", None, None).unwrap();

        // Past the cache window, so the second run really hits the provider.
        tokio::time::advance(Duration::from_secs(301)).await;
        h.service.synchronize_one("AAA").await.unwrap();

        assert_eq!(h.provider.calls("quote").len(), 2);
        assert_eq!(h.securities.list_symbols().unwrap(), vec!["AAA"]);
        let second = h.securities.get("AAA").unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.name, first.name);
        assert_eq!(h.prices.price_points("AAA", None, None).unwrap(), first_points);
    }

    // =========================================================================
    // Cache
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_provider_and_writes() {
        let h = harness();

        let first = h.service.synchronize_one("AAA").await.unwrap();
        let writes = h.prices.writes.load(Ordering::SeqCst);
        let upserts = h.securities.upserts.load(Ordering::SeqCst);

        tokio::time::advance(Duration::from_secs(299)).await;
        let second = h.service.synchronize_one("aaa.ns").await.unwrap();

        let update = second.outcome.as_ref().unwrap();
        assert!(update.from_cache);
        assert_eq!(update.points_written, 0);
        assert_eq!(update.snapshot, first.outcome.as_ref().unwrap().snapshot);
        assert_eq!(second.symbol, "aaa.ns");

        assert_eq!(h.provider.calls("quote").len(), 1);
        assert_eq!(h.prices.writes.load(Ordering::SeqCst), writes);
        assert_eq!(h.securities.upserts.load(Ordering::SeqCst), upserts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_cache_entry_is_refetched() {
        let h = harness();

        h.service.synchronize_one("AAA").await.unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;
        let result = h.service.synchronize_one("AAA").await.unwrap();

        assert!(!result.outcome.as_ref().unwrap().from_cache);
        assert_eq!(h.provider.calls("quote").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let h = harness();
        h.provider.on_quote("AAA.NS", Behavior::Fail("HTTP 503"));
        assert!(!h.service.synchronize_one("AAA").await.unwrap().is_success());

        h.provider.on_quote("AAA.NS", Behavior::Succeed);
        assert!(h.service.synchronize_one("AAA").await.unwrap().is_success());
        assert_eq!(h.provider.calls("quote").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readding_deleted_security_refetches() {
        let h = harness();

        h.service.synchronize_one("TCS").await.unwrap();
        assert!(h.service.delete_security("tcs.ns").await.unwrap());
        assert!(h.securities.get("TCS").is_none());

        tokio::time::advance(Duration::from_secs(60)).await;
        let result = h.service.synchronize_one("TCS").await.unwrap();

        let update = result.outcome.as_ref().unwrap();
        assert!(!update.from_cache);
        assert_eq!(update.points_written, 2);
        assert!(h.securities.get("TCS").is_some());
        assert_eq!(h.provider.calls("quote").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_is_bypassed_when_row_removed_elsewhere() {
        let h = harness();

        h.service.synchronize_one("TCS").await.unwrap();
        h.securities.delete_security("TCS").await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        let result = h.service.synchronize_one("TCS").await.unwrap();

        assert!(!result.outcome.as_ref().unwrap().from_cache);
        assert!(h.securities.get("TCS").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_unknown_security_returns_false() {
        let h = harness();
        assert!(!h.service.delete_security("NOPE").await.unwrap());
        assert!(h.service.delete_security("  ").await.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_invalid_symbol_rejects_whole_batch() {
        let h = harness();

        let err = h
            .service
            .synchronize(&symbols(&["AAA", "   ", "CCC"]), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(h.provider.call_instants().is_empty());
        assert!(h.securities.list_symbols().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_concurrency_is_rejected() {
        let h = harness();
        let err = h
            .service
            .synchronize(&symbols(&["AAA"]), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(h.provider.call_instants().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_single_symbol_is_rejected() {
        let h = harness();
        let err = h.service.synchronize_one("").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_returns_empty_report() {
        let h = harness();
        let report = h.service.synchronize(&[], 5).await.unwrap();
        assert_eq!(report.total, 0);
        assert!(report.results.is_empty());
        assert!(h.provider.call_instants().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = SyncService::new(
            Arc::new(MockProvider::default()),
            Arc::new(MockSecurityStore::default()),
            Arc::new(MockPriceStore::default()),
            SyncConfig {
                default_concurrency: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidConfigValue(_))));
    }

    // =========================================================================
    // Search and cleanup
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_search_delegates_to_provider() {
        let h = harness();

        let results = h.service.search_symbols(" infy ").await.unwrap();
        assert_eq!(results[0].symbol, "INFY.NS");
        assert_eq!(h.provider.calls("search"), vec!["infy"]);

        assert!(matches!(
            h.service.search_symbols("  ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_before_removes_old_points() {
        let h = harness();
        h.service.synchronize_one("AAA").await.unwrap();

        let deleted = h.service.cleanup_before(day(4)).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(h.prices.count_for("AAA"), 1);
    }

    // =========================================================================
    // Daily job
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_daily_job_pages_and_cleans_up() {
        let h = harness();
        h.securities.seed(&["A1", "A2", "A3", "A4", "A5"]);
        h.provider.on_quote("A4.NS", Behavior::Fail("HTTP 404"));

        let policy = DailyUpdatePolicy {
            page_size: 2,
            page_delay: Duration::from_secs(30),
            concurrency: 2,
            retention_days: 30,
        };
        let job = DailyUpdateJob::new(h.service.clone(), policy).unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let start = Instant::now();
        let summary = job.run_for(today).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.report.total, 5);
        assert_eq!(summary.report.succeeded, vec!["A1", "A2", "A3", "A5"]);
        assert_eq!(summary.report.failed, vec!["A4"]);
        assert_eq!(summary.report.success_rate(), 80.0);

        let cutoff = today - ChronoDuration::days(30);
        assert_eq!(summary.cutoff, cutoff);
        assert_eq!(*h.prices.cleanup_cutoffs.lock().unwrap(), vec![cutoff]);
        // Mock bars are dated June 2024, before the cutoff.
        assert_eq!(summary.deleted_points, Some(8));
        assert!(summary.cleanup_error.is_none());

        let overview = summary.overview();
        assert_eq!(overview.failed, 1);
        assert_eq!(overview.pages, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_job_with_no_symbols_does_nothing() {
        let h = harness();
        let job = DailyUpdateJob::new(h.service.clone(), DailyUpdatePolicy::default()).unwrap();

        let summary = job.run().await.unwrap();

        assert_eq!(summary.pages, 0);
        assert_eq!(summary.report.total, 0);
        assert!(h.prices.cleanup_cutoffs.lock().unwrap().is_empty());
        assert!(h.provider.call_instants().is_empty());
    }

    #[test]
    fn test_daily_policy_validation() {
        let h = harness();
        let bad = DailyUpdatePolicy {
            page_size: 0,
            ..Default::default()
        };
        assert!(DailyUpdateJob::new(h.service.clone(), bad).is_err());
    }
}
