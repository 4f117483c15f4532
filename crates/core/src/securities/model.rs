use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked security, keyed by its storage symbol.
///
/// Descriptive fields are fully replaced by every successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<Decimal>,
    pub currency: String,
    pub exchange: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Upsert payload for a security.
///
/// Absent optional fields clear the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSecurity {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<Decimal>,
    pub currency: String,
    pub exchange: String,
}

impl NewSecurity {
    /// Materialize the record as it would be stored at `now`, keeping
    /// `created_at` from an existing row when there is one.
    pub fn into_security(self, existing: Option<&Security>, now: NaiveDateTime) -> Security {
        Security {
            symbol: self.symbol,
            name: self.name,
            sector: self.sector,
            industry: self.industry,
            market_cap: self.market_cap,
            currency: self.currency,
            exchange: self.exchange,
            created_at: existing.map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        }
    }
}
