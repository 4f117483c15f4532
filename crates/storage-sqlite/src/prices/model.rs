//! Database models for daily price points.
//!
//! Decimals are stored as TEXT to keep them exact. Dates are ISO `YYYY-MM-DD`
//! TEXT, so string order is date order and range filters work on the column
//! directly.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use pricesync_core::errors::Result;
use pricesync_core::prices::DailyPricePoint;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for daily price points
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::daily_prices)]
#[diesel(primary_key(symbol, date))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DailyPriceDB {
    pub symbol: String,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub adj_close: Option<String>,
    pub updated_at: NaiveDateTime,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl DailyPriceDB {
    pub fn from_point(point: &DailyPricePoint, now: NaiveDateTime) -> Self {
        Self {
            symbol: point.symbol.clone(),
            date: format_date(point.date),
            open: point.open.to_string(),
            high: point.high.to_string(),
            low: point.low.to_string(),
            close: point.close.to_string(),
            volume: point.volume,
            adj_close: point.adj_close.map(|v| v.to_string()),
            updated_at: now,
        }
    }

    /// Parse the row back into a price point.
    pub fn into_point(self) -> Result<DailyPricePoint> {
        Ok(DailyPricePoint {
            date: NaiveDate::parse_from_str(&self.date, DATE_FORMAT)?,
            open: Decimal::from_str(&self.open)?,
            high: Decimal::from_str(&self.high)?,
            low: Decimal::from_str(&self.low)?,
            close: Decimal::from_str(&self.close)?,
            volume: self.volume,
            adj_close: self
                .adj_close
                .as_deref()
                .map(Decimal::from_str)
                .transpose()?,
            symbol: self.symbol,
        })
    }
}
