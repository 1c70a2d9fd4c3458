use ratebook_core::rates::{
    Currency, CurrencyWithRate, ExchangeRate, HistoricalRate, RateRepositoryTrait,
};
use ratebook_core::{Error, Result};

use super::model::{
    CountRow, CurrencyDB, CurrencyWithRateRow, HistoricalRateRow, NewCurrencyDB, NewRateDB, RateDB,
    SQL_DATE_FORMAT, SQL_TIMESTAMP_FORMAT,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{currencies, rates};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Latest rate per currency: the subquery picks the single most recent rate
/// row targeting the currency, newest date first, highest id on ties.
const LATEST_RATE_SELECT: &str = "
    SELECT
        c.id,
        c.code,
        c.name,
        c.created_at,
        r.rate AS latest_rate,
        r.effective_date AS rate_date
    FROM currencies c
    LEFT JOIN rates r ON r.id = (
        SELECT r2.id
        FROM rates r2
        WHERE r2.target_currency_id = c.id
          AND r2.base_currency_id = (SELECT id FROM currencies WHERE code = ?)
        ORDER BY r2.effective_date DESC, r2.id DESC
        LIMIT 1
    )";

/// As-of rates: a row survives only if no other row for the same target is
/// nearer to the query date (same-date ties go to the higher id).
const RATES_AS_OF_SELECT: &str = "
    SELECT
        r.id,
        base.code AS base_currency,
        target.code AS target_currency,
        target.name AS target_currency_name,
        r.rate,
        r.effective_date,
        r.created_at
    FROM rates r
    JOIN currencies base ON base.id = r.base_currency_id
    JOIN currencies target ON target.id = r.target_currency_id
    WHERE r.base_currency_id = (SELECT id FROM currencies WHERE code = ?)
      AND r.effective_date <= ?
      AND NOT EXISTS (
          SELECT 1
          FROM rates newer
          WHERE newer.target_currency_id = r.target_currency_id
            AND newer.base_currency_id = r.base_currency_id
            AND newer.effective_date <= ?
            AND (newer.effective_date > r.effective_date
                 OR (newer.effective_date = r.effective_date AND newer.id > r.id))
      )
    ORDER BY target.code ASC
    LIMIT ? OFFSET ?";

const RATE_TARGETS_AS_OF_COUNT: &str = "
    SELECT COUNT(DISTINCT r.target_currency_id) AS total
    FROM rates r
    WHERE r.base_currency_id = (SELECT id FROM currencies WHERE code = ?)
      AND r.effective_date <= ?";

#[derive(Clone)]
pub struct RateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    base_currency: String,
}

impl RateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, base_currency: impl Into<String>) -> Self {
        Self {
            pool,
            writer,
            base_currency: base_currency.into(),
        }
    }
}

/// Upserts the rate row for `(base, target, effective_date)`; a same-day
/// write replaces the stored rate and refreshes `created_at`.
fn upsert_rate(
    conn: &mut SqliteConnection,
    base_code: &str,
    target_id: i32,
    rate: Decimal,
    effective_date: NaiveDate,
) -> Result<RateDB> {
    let base_id = currencies::table
        .filter(currencies::code.eq(base_code))
        .select(currencies::id)
        .first::<i32>(conn)
        .map_err(StorageError::from)?;

    let now = Utc::now()
        .naive_utc()
        .format(SQL_TIMESTAMP_FORMAT)
        .to_string();
    let new_rate = NewRateDB {
        base_currency_id: base_id,
        target_currency_id: target_id,
        rate: rate.to_string(),
        effective_date: effective_date.format(SQL_DATE_FORMAT).to_string(),
        created_at: now.clone(),
    };

    let row = diesel::insert_into(rates::table)
        .values(&new_rate)
        .on_conflict((
            rates::base_currency_id,
            rates::target_currency_id,
            rates::effective_date,
        ))
        .do_update()
        .set((rates::rate.eq(&new_rate.rate), rates::created_at.eq(&now)))
        .returning(RateDB::as_returning())
        .get_result::<RateDB>(conn)
        .map_err(StorageError::from)?;

    Ok(row)
}

#[async_trait]
impl RateRepositoryTrait for RateRepository {
    fn list_currencies_with_latest_rate(&self) -> Result<Vec<CurrencyWithRate>> {
        let mut conn = get_connection(&self.pool)?;

        let query = format!("{} ORDER BY c.id ASC", LATEST_RATE_SELECT);
        let rows = sql_query(query)
            .bind::<Text, _>(&self.base_currency)
            .load::<CurrencyWithRateRow>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(CurrencyWithRate::from).collect())
    }

    async fn list_currencies_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CurrencyWithRate>> {
        let mut conn = get_connection(&self.pool)?;

        let query = format!("{} ORDER BY c.code ASC LIMIT ? OFFSET ?", LATEST_RATE_SELECT);
        let rows = sql_query(query)
            .bind::<Text, _>(&self.base_currency)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<CurrencyWithRateRow>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(CurrencyWithRate::from).collect())
    }

    async fn count_currencies(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let count = currencies::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count)
    }

    async fn list_rates_as_of(
        &self,
        date: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoricalRate>> {
        let mut conn = get_connection(&self.pool)?;

        let date_str = date.format(SQL_DATE_FORMAT).to_string();
        let rows = sql_query(RATES_AS_OF_SELECT)
            .bind::<Text, _>(&self.base_currency)
            .bind::<Text, _>(&date_str)
            .bind::<Text, _>(&date_str)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<HistoricalRateRow>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(HistoricalRate::from).collect())
    }

    async fn count_rate_targets_as_of(&self, date: NaiveDate) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let row = sql_query(RATE_TARGETS_AS_OF_COUNT)
            .bind::<Text, _>(&self.base_currency)
            .bind::<Text, _>(date.format(SQL_DATE_FORMAT).to_string())
            .get_result::<CountRow>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(row.total)
    }

    async fn get_currency(&self, id: i32) -> Result<Option<Currency>> {
        let mut conn = get_connection(&self.pool)?;

        let currency = currencies::table
            .find(id)
            .first::<CurrencyDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(currency.map(Currency::from))
    }

    async fn upsert_currency_with_rate(
        &self,
        code: String,
        name: String,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Result<(Currency, ExchangeRate)> {
        let base_code = self.base_currency.clone();
        self.writer
            .exec(move |conn| {
                let now = Utc::now()
                    .naive_utc()
                    .format(SQL_TIMESTAMP_FORMAT)
                    .to_string();
                let new_currency = NewCurrencyDB {
                    code,
                    name,
                    created_at: now,
                };

                let currency_db = diesel::insert_into(currencies::table)
                    .values(&new_currency)
                    .on_conflict(currencies::code)
                    .do_update()
                    .set(currencies::name.eq(&new_currency.name))
                    .returning(CurrencyDB::as_returning())
                    .get_result::<CurrencyDB>(conn)
                    .map_err(StorageError::from)?;

                let rate_db = upsert_rate(conn, &base_code, currency_db.id, rate, effective_date)?;

                Ok((Currency::from(currency_db), ExchangeRate::from(rate_db)))
            })
            .await
    }

    async fn update_currency_with_rate(
        &self,
        id: i32,
        name: String,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Result<(Currency, ExchangeRate)> {
        let base_code = self.base_currency.clone();
        self.writer
            .exec(move |conn| {
                // Existence is checked inside the transaction; code is
                // deliberately left untouched.
                let existing = currencies::table
                    .find(id)
                    .first::<CurrencyDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(_) = existing else {
                    return Err(Error::CurrencyNotFound(format!(
                        "Currency with id {} not found",
                        id
                    )));
                };

                let currency_db = diesel::update(currencies::table.find(id))
                    .set(currencies::name.eq(&name))
                    .returning(CurrencyDB::as_returning())
                    .get_result::<CurrencyDB>(conn)
                    .map_err(StorageError::from)?;

                let rate_db = upsert_rate(conn, &base_code, currency_db.id, rate, effective_date)?;

                Ok((Currency::from(currency_db), ExchangeRate::from(rate_db)))
            })
            .await
    }

    async fn delete_currency(&self, id: i32) -> Result<Currency> {
        self.writer
            .exec(move |conn| {
                let existing = currencies::table
                    .find(id)
                    .first::<CurrencyDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(existing) = existing else {
                    return Err(Error::CurrencyNotFound(format!(
                        "Currency with id {} not found",
                        id
                    )));
                };

                // Rates referencing the currency go with it via the
                // ON DELETE CASCADE constraint.
                diesel::delete(currencies::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(Currency::from(existing))
            })
            .await
    }
}
