use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use pricesync_core::prices::{DailyPricePoint, PriceStore};
use pricesync_core::Result;

use super::model::{format_date, DailyPriceDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::daily_prices;

pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PriceRepository { pool, writer }
    }
}

#[async_trait]
impl PriceStore for PriceRepository {
    async fn upsert_price_point(&self, point: &DailyPricePoint) -> Result<()> {
        let row = DailyPriceDB::from_point(point, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(daily_prices::table)
                    .values(&row)
                    .on_conflict((daily_prices::symbol, daily_prices::date))
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete_points_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let cutoff = format_date(cutoff);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(daily_prices::table.filter(daily_prices::date.lt(cutoff)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn price_points(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyPricePoint>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = daily_prices::table
            .filter(daily_prices::symbol.eq(symbol))
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(daily_prices::date.ge(format_date(from)));
        }
        if let Some(to) = to {
            query = query.filter(daily_prices::date.le(format_date(to)));
        }

        let rows = query
            .select(DailyPriceDB::as_select())
            .order(daily_prices::date.asc())
            .load(&mut conn)
            .into_core()?;

        rows.into_iter().map(DailyPriceDB::into_point).collect()
    }
}
