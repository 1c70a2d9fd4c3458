//! Database models for the rate catalog.
//!
//! Decimals and dates are stored as TEXT and parsed at this boundary;
//! unparseable stored values fall back to zero/epoch rather than failing
//! the whole listing.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use ratebook_core::rates::{Currency, CurrencyWithRate, ExchangeRate, HistoricalRate};

pub const SQL_DATE_FORMAT: &str = "%Y-%m-%d";
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Database model for currencies
#[derive(
    Queryable, Identifiable, Selectable, QueryableByName, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::currencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDB {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub code: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
}

/// Database model for inserting a currency
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::currencies)]
pub struct NewCurrencyDB {
    pub code: String,
    pub name: String,
    pub created_at: String,
}

/// Database model for rates
#[derive(
    Queryable, Identifiable, Selectable, QueryableByName, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct RateDB {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Integer)]
    pub base_currency_id: i32,
    #[diesel(sql_type = Integer)]
    pub target_currency_id: i32,
    #[diesel(sql_type = Text)]
    pub rate: String,
    #[diesel(sql_type = Text)]
    pub effective_date: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
}

/// Database model for inserting a rate
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::rates)]
pub struct NewRateDB {
    pub base_currency_id: i32,
    pub target_currency_id: i32,
    pub rate: String,
    pub effective_date: String,
    pub created_at: String,
}

/// Row shape of the latest-rate listing queries.
#[derive(QueryableByName, Debug)]
pub struct CurrencyWithRateRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub code: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub latest_rate: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rate_date: Option<String>,
}

/// Row shape of the as-of listing query.
#[derive(QueryableByName, Debug)]
pub struct HistoricalRateRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub base_currency: String,
    #[diesel(sql_type = Text)]
    pub target_currency: String,
    #[diesel(sql_type = Text)]
    pub target_currency_name: String,
    #[diesel(sql_type = Text)]
    pub rate: String,
    #[diesel(sql_type = Text)]
    pub effective_date: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
}

#[derive(QueryableByName, Debug)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}

pub fn parse_decimal(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or(Decimal::ZERO)
}

pub fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, SQL_DATE_FORMAT).unwrap_or_default()
}

pub fn parse_timestamp(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, SQL_TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

// Conversion to domain models

impl From<CurrencyDB> for Currency {
    fn from(db: CurrencyDB) -> Self {
        Self {
            id: db.id,
            code: db.code,
            name: db.name,
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<RateDB> for ExchangeRate {
    fn from(db: RateDB) -> Self {
        Self {
            id: db.id,
            base_currency_id: db.base_currency_id,
            target_currency_id: db.target_currency_id,
            rate: parse_decimal(&db.rate),
            effective_date: parse_date(&db.effective_date),
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<CurrencyWithRateRow> for CurrencyWithRate {
    fn from(row: CurrencyWithRateRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            created_at: parse_timestamp(&row.created_at),
            latest_rate: row.latest_rate.as_deref().map(parse_decimal),
            rate_date: row.rate_date.as_deref().map(parse_date),
        }
    }
}

impl From<HistoricalRateRow> for HistoricalRate {
    fn from(row: HistoricalRateRow) -> Self {
        Self {
            id: row.id,
            base_currency: row.base_currency,
            target_currency: row.target_currency,
            target_currency_name: row.target_currency_name,
            rate: parse_decimal(&row.rate),
            effective_date: parse_date(&row.effective_date),
            created_at: parse_timestamp(&row.created_at),
        }
    }
}
