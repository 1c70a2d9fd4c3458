use super::rates_model::{
    Currency, CurrencyUpdate, CurrencyWithRate, ExchangeRate, HistoricalRate, NewCurrency,
    RateHistoryPage, SavedCurrency,
};
use crate::errors::Result;
use crate::pagination::{PageParams, Paginated};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait defining the contract for rate-catalog storage.
///
/// Reads take their own pooled connections; writes are expected to run all
/// statements of one call inside a single atomic transaction.
#[async_trait]
pub trait RateRepositoryTrait: Send + Sync {
    /// Every currency with its latest rate against the base, ordered by id.
    fn list_currencies_with_latest_rate(&self) -> Result<Vec<CurrencyWithRate>>;

    /// One page of currencies with latest rates, ordered by code.
    async fn list_currencies_page(&self, limit: i64, offset: i64)
        -> Result<Vec<CurrencyWithRate>>;

    async fn count_currencies(&self) -> Result<i64>;

    /// For each target currency, the most recent rate on or before `date`
    /// (ties broken by highest id), ordered by target code.
    async fn list_rates_as_of(
        &self,
        date: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoricalRate>>;

    /// Number of distinct target currencies having any rate on or before
    /// `date`.
    async fn count_rate_targets_as_of(&self, date: NaiveDate) -> Result<i64>;

    async fn get_currency(&self, id: i32) -> Result<Option<Currency>>;

    /// Upserts the currency by code (name overwritten on conflict), then
    /// upserts the rate for `effective_date`. Atomic.
    async fn upsert_currency_with_rate(
        &self,
        code: String,
        name: String,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Result<(Currency, ExchangeRate)>;

    /// Renames the currency and upserts the rate for `effective_date`.
    /// Fails with a not-found error when the id does not exist. Atomic.
    async fn update_currency_with_rate(
        &self,
        id: i32,
        name: String,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Result<(Currency, ExchangeRate)>;

    /// Deletes the currency; the store cascades the deletion to its rates.
    async fn delete_currency(&self, id: i32) -> Result<Currency>;
}

/// Trait defining the contract for admin catalog operations.
#[async_trait]
pub trait AdminRateServiceTrait: Send + Sync {
    fn list_currencies(&self) -> Result<Vec<CurrencyWithRate>>;
    async fn add_currency(&self, new_currency: NewCurrency) -> Result<SavedCurrency>;
    async fn update_currency(&self, update: CurrencyUpdate) -> Result<SavedCurrency>;
    async fn delete_currency(&self, id: i32) -> Result<Currency>;
}

/// Trait defining the contract for the read-only consumer surface.
#[async_trait]
pub trait UserRateServiceTrait: Send + Sync {
    async fn list_currencies(&self, params: PageParams) -> Result<Paginated<CurrencyWithRate>>;
    async fn historical_rates(
        &self,
        date: Option<&str>,
        params: PageParams,
    ) -> Result<RateHistoryPage>;
}
