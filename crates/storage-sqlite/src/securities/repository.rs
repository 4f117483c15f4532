use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use pricesync_core::securities::{NewSecurity, Security, SecurityStore};
use pricesync_core::Result;

use super::model::SecurityDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{daily_prices, securities};

pub struct SecurityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SecurityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SecurityRepository { pool, writer }
    }
}

#[async_trait]
impl SecurityStore for SecurityRepository {
    async fn upsert_security(&self, security: NewSecurity) -> Result<Security> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Security> {
                let row = SecurityDB::from_new(security, Utc::now().naive_utc());

                diesel::insert_into(securities::table)
                    .values(&row)
                    .on_conflict(securities::symbol)
                    .do_update()
                    .set(row.changeset())
                    .execute(conn)
                    .into_core()?;

                let stored = securities::table
                    .find(&row.symbol)
                    .select(SecurityDB::as_select())
                    .first(conn)
                    .into_core()?;
                Ok(stored.into())
            })
            .await
    }

    async fn delete_security(&self, symbol: &str) -> Result<bool> {
        let symbol = symbol.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                // Explicit so the delete does not depend on the foreign_keys pragma.
                diesel::delete(daily_prices::table.filter(daily_prices::symbol.eq(&symbol)))
                    .execute(conn)
                    .into_core()?;
                let removed = diesel::delete(securities::table.find(&symbol))
                    .execute(conn)
                    .into_core()?;
                Ok(removed > 0)
            })
            .await
    }

    fn find_security(&self, symbol: &str) -> Result<Option<Security>> {
        let mut conn = get_connection(&self.pool)?;
        let row = securities::table
            .find(symbol)
            .select(SecurityDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Security::from))
    }

    fn list_securities(&self) -> Result<Vec<Security>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = securities::table
            .select(SecurityDB::as_select())
            .order(securities::symbol.asc())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Security::from).collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        securities::table
            .select(securities::symbol)
            .order(securities::symbol.asc())
            .load::<String>(&mut conn)
            .into_core()
    }
}
