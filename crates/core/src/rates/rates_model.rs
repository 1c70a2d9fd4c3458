use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::CURRENCY_CODE_LEN;
use crate::errors::{Result, ValidationError};
use crate::pagination::Pagination;

/// A catalog currency. `code` is stored in canonical uppercase and is
/// immutable once the row exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// A daily rate: 1 base unit = `rate` target units on `effective_date`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: i32,
    pub base_currency_id: i32,
    pub target_currency_id: i32,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// A currency joined with its most recent rate against the base, if any.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyWithRate {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub latest_rate: Option<Decimal>,
    pub rate_date: Option<NaiveDate>,
}

/// The rate row that was in effect for a target currency on a queried date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRate {
    pub id: i32,
    pub base_currency: String,
    pub target_currency: String,
    pub target_currency_name: String,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Input for adding a currency together with today's rate.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    pub code: String,
    pub name: String,
    pub rate: Decimal,
}

impl NewCurrency {
    pub fn validate(&self) -> Result<()> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        validate_rate(self.rate)
    }

    /// Canonical uppercase form of the code.
    pub fn canonical_code(&self) -> String {
        self.code.trim().to_ascii_uppercase()
    }
}

/// Input for updating a currency's name and writing today's rate.
///
/// `code` is accepted for interface compatibility but never written; a
/// currency's code is immutable after creation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdate {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub rate: Decimal,
}

impl CurrencyUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_rate(self.rate)
    }
}

/// Result of an add or update: the currency and the rate row written for it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedCurrency {
    pub currency: Currency,
    pub rate: ExchangeRate,
}

/// A page of historical rates plus the echoed query date.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateHistoryPage {
    pub data: Vec<HistoricalRate>,
    pub pagination: Pagination,
    pub query_date: NaiveDate,
}

fn validate_code(code: &str) -> Result<()> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("code".to_string()).into());
    }
    if trimmed.len() != CURRENCY_CODE_LEN || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidInput(format!(
            "Currency code must be {} letters, got '{}'",
            CURRENCY_CODE_LEN, code
        ))
        .into());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()).into());
    }
    Ok(())
}

fn validate_rate(rate: Decimal) -> Result<()> {
    if rate <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "Exchange rate must be positive, got {}",
            rate
        ))
        .into());
    }
    Ok(())
}
