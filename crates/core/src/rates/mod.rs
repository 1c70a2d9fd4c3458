//! Rates module - domain models, services, and traits.

mod admin_service;
mod rates_model;
mod rates_traits;
mod user_service;

#[cfg(test)]
mod user_service_tests;

pub use admin_service::AdminRateService;
pub use rates_model::{
    Currency, CurrencyUpdate, CurrencyWithRate, ExchangeRate, HistoricalRate, NewCurrency,
    RateHistoryPage, SavedCurrency,
};
pub use rates_traits::{AdminRateServiceTrait, RateRepositoryTrait, UserRateServiceTrait};
pub use user_service::UserRateService;
