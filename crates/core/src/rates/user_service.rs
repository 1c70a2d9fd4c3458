use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;

use super::rates_model::{CurrencyWithRate, RateHistoryPage};
use super::rates_traits::{RateRepositoryTrait, UserRateServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::pagination::{PageParams, Paginated, Pagination};

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-only, always-paginated consumer surface over the catalog.
pub struct UserRateService {
    repository: Arc<dyn RateRepositoryTrait>,
}

impl UserRateService {
    pub fn new(repository: Arc<dyn RateRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserRateServiceTrait for UserRateService {
    /// One page of currencies with their latest rates, ordered by code.
    ///
    /// The data and count queries are independent reads and are dispatched
    /// concurrently.
    async fn list_currencies(&self, params: PageParams) -> Result<Paginated<CurrencyWithRate>> {
        debug!(
            "Listing currencies page {} (limit {})",
            params.page, params.limit
        );

        let (data, total) = tokio::try_join!(
            self.repository
                .list_currencies_page(params.limit, params.offset()),
            self.repository.count_currencies()
        )?;

        Ok(Paginated {
            pagination: Pagination::new(&params, total),
            data,
        })
    }

    /// One page of per-currency rates in effect on `date`.
    ///
    /// The date is mandatory and validated before any storage access;
    /// currencies with no rate on or before the date are omitted entirely.
    async fn historical_rates(
        &self,
        date: Option<&str>,
        params: PageParams,
    ) -> Result<RateHistoryPage> {
        let raw_date = date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::from(ValidationError::MissingField("date".to_string())))?;

        let query_date = NaiveDate::parse_from_str(raw_date, QUERY_DATE_FORMAT)?;
        debug!(
            "Listing historical rates as of {} page {} (limit {})",
            query_date, params.page, params.limit
        );

        let (data, total) = tokio::try_join!(
            self.repository
                .list_rates_as_of(query_date, params.limit, params.offset()),
            self.repository.count_rate_targets_as_of(query_date)
        )?;

        Ok(RateHistoryPage {
            pagination: Pagination::new(&params, total),
            data,
            query_date,
        })
    }
}
