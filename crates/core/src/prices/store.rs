//! Price point storage traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::DailyPricePoint;
use crate::errors::Result;

/// Storage interface for daily price points.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert or replace the point for (symbol, date).
    async fn upsert_price_point(&self, point: &DailyPricePoint) -> Result<()>;

    /// Delete every point dated strictly before `cutoff`. Returns the count removed.
    async fn delete_points_before(&self, cutoff: NaiveDate) -> Result<usize>;

    /// Points for one symbol ordered by date, optionally bounded (inclusive).
    fn price_points(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyPricePoint>>;
}
