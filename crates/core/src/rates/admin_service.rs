use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};

use super::rates_model::{Currency, CurrencyUpdate, CurrencyWithRate, NewCurrency, SavedCurrency};
use super::rates_traits::{AdminRateServiceTrait, RateRepositoryTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};

/// Administrative CRUD over currencies and their daily rates.
///
/// Add and update always write the rate for the current date; the base
/// currency is an explicit configuration value, not a lookup.
pub struct AdminRateService {
    repository: Arc<dyn RateRepositoryTrait>,
    base_currency: String,
}

impl AdminRateService {
    pub fn new(repository: Arc<dyn RateRepositoryTrait>, base_currency: impl Into<String>) -> Self {
        Self {
            repository,
            base_currency: base_currency.into(),
        }
    }
}

#[async_trait]
impl AdminRateServiceTrait for AdminRateService {
    /// Lists every currency with its latest rate, ordered by id.
    fn list_currencies(&self) -> Result<Vec<CurrencyWithRate>> {
        self.repository.list_currencies_with_latest_rate()
    }

    /// Adds a currency and today's rate in one transaction.
    ///
    /// Adding an existing code is an idempotent upsert: the name is
    /// overwritten and today's rate replaced. A uniqueness violation that
    /// still escapes the upsert path surfaces as a distinct duplicate-code
    /// error.
    async fn add_currency(&self, new_currency: NewCurrency) -> Result<SavedCurrency> {
        new_currency.validate()?;

        let code = new_currency.canonical_code();
        let today = Utc::now().naive_utc().date();
        debug!("Adding currency {} with rate for {}", code, today);

        let (currency, rate) = self
            .repository
            .upsert_currency_with_rate(
                code.clone(),
                new_currency.name.trim().to_string(),
                new_currency.rate,
                today,
            )
            .await
            .map_err(|e| match e {
                Error::Database(DatabaseError::UniqueViolation(_)) => {
                    Error::DuplicateCurrencyCode(code.clone())
                }
                other => {
                    error!("Failed to add currency {}: {}", code, other);
                    other
                }
            })?;

        Ok(SavedCurrency { currency, rate })
    }

    /// Renames a currency and writes today's rate in one transaction.
    ///
    /// The input code is ignored; codes are immutable after creation.
    async fn update_currency(&self, update: CurrencyUpdate) -> Result<SavedCurrency> {
        update.validate()?;

        let today = Utc::now().naive_utc().date();
        debug!("Updating currency {} with rate for {}", update.id, today);

        let (currency, rate) = self
            .repository
            .update_currency_with_rate(
                update.id,
                update.name.trim().to_string(),
                update.rate,
                today,
            )
            .await
            .map_err(|e| {
                if !matches!(e, Error::CurrencyNotFound(_)) {
                    error!("Failed to update currency {}: {}", update.id, e);
                }
                e
            })?;

        Ok(SavedCurrency { currency, rate })
    }

    /// Deletes a currency; the store cascades the deletion to its rates.
    /// The base currency itself can never be deleted.
    async fn delete_currency(&self, id: i32) -> Result<Currency> {
        let existing = self
            .repository
            .get_currency(id)
            .await?
            .ok_or_else(|| Error::CurrencyNotFound(format!("Currency with id {} not found", id)))?;

        if existing.code == self.base_currency {
            return Err(ValidationError::InvalidInput(format!(
                "The base currency {} cannot be deleted",
                self.base_currency
            ))
            .into());
        }

        debug!("Deleting currency {} ({})", existing.code, id);
        self.repository.delete_currency(id).await
    }
}
