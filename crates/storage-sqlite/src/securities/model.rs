//! Database models for securities.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use pricesync_core::securities::{NewSecurity, Security};

/// Database model for securities
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::securities)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SecurityDB {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<String>,
    pub currency: String,
    pub exchange: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns replaced when an existing security is upserted.
///
/// `None` writes NULL so a field the provider stopped reporting is cleared.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::securities)]
#[diesel(treat_none_as_null = true)]
pub struct SecurityChangesetDB {
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<String>,
    pub currency: String,
    pub exchange: String,
    pub updated_at: NaiveDateTime,
}

impl SecurityDB {
    pub fn from_new(security: NewSecurity, now: NaiveDateTime) -> Self {
        Self {
            symbol: security.symbol,
            name: security.name,
            sector: security.sector,
            industry: security.industry,
            market_cap: security.market_cap.map(|v| v.to_string()),
            currency: security.currency,
            exchange: security.exchange,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn changeset(&self) -> SecurityChangesetDB {
        SecurityChangesetDB {
            name: self.name.clone(),
            sector: self.sector.clone(),
            industry: self.industry.clone(),
            market_cap: self.market_cap.clone(),
            currency: self.currency.clone(),
            exchange: self.exchange.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<SecurityDB> for Security {
    fn from(db: SecurityDB) -> Self {
        Self {
            symbol: db.symbol,
            name: db.name,
            sector: db.sector,
            industry: db.industry,
            market_cap: db.market_cap.and_then(|v| Decimal::from_str(&v).ok()),
            currency: db.currency,
            exchange: db.exchange,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
