use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{error, info};

use super::model::{BatchReport, SymbolUpdateResult, UpdateError};
use super::symbol::ResolvedSymbol;
use super::updater::SymbolUpdater;

/// Runs updates for many symbols with a bound on how many are in flight.
///
/// Each update is spawned on its own task only once the bound admits it, so
/// a panic inside one update is reported as that symbol's failure and the
/// rest of the batch carries on.
#[derive(Clone)]
pub struct BatchScheduler {
    updater: Arc<SymbolUpdater>,
}

impl BatchScheduler {
    pub fn new(updater: Arc<SymbolUpdater>) -> Self {
        Self { updater }
    }

    /// Update every symbol, at most `concurrency` at a time.
    ///
    /// Every input yields exactly one result; results come back in input
    /// order. A `concurrency` of zero is treated as one.
    pub async fn run(&self, symbols: Vec<ResolvedSymbol>, concurrency: usize) -> BatchReport {
        let total = symbols.len();
        let concurrency = concurrency.max(1);
        info!(
            "Starting batch update of {} symbols (concurrency {})",
            total, concurrency
        );

        let results: Vec<SymbolUpdateResult> = stream::iter(symbols)
            .map(|symbol| {
                let updater = self.updater.clone();
                async move {
                    let input = symbol.input.clone();
                    let storage = symbol.storage.clone();
                    match tokio::spawn(async move { updater.update(&symbol).await }).await {
                        Ok(result) => result,
                        Err(join_error) => {
                            error!("Update task for {} died: {}", storage, join_error);
                            SymbolUpdateResult::failed(
                                input,
                                UpdateError::Aborted {
                                    symbol: storage,
                                    message: join_error.to_string(),
                                },
                            )
                        }
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let report = BatchReport::from_results(results);
        info!("Batch update finished: {}", report.summary());
        report
    }
}
