//! Security storage traits.

use async_trait::async_trait;

use super::model::{NewSecurity, Security};
use crate::errors::Result;

/// Storage interface for securities.
///
/// Mutations are async (they go through the writer); lookups are sync.
#[async_trait]
pub trait SecurityStore: Send + Sync {
    /// Insert or fully replace the security with the same symbol.
    async fn upsert_security(&self, security: NewSecurity) -> Result<Security>;

    /// Remove a security and all of its price points.
    ///
    /// Returns false when no such security existed.
    async fn delete_security(&self, symbol: &str) -> Result<bool>;

    fn find_security(&self, symbol: &str) -> Result<Option<Security>>;

    /// All securities ordered by symbol.
    fn list_securities(&self) -> Result<Vec<Security>>;

    /// All stored symbols ordered alphabetically.
    fn list_symbols(&self) -> Result<Vec<String>>;
}
