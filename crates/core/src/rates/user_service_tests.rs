#[cfg(test)]
mod tests {
    use crate::constants::DEFAULT_BASE_CURRENCY;
    use crate::errors::{Error, Result, ValidationError};
    use crate::pagination::PageParams;
    use crate::rates::{
        Currency, CurrencyWithRate, ExchangeRate, HistoricalRate, RateRepositoryTrait,
        UserRateService, UserRateServiceTrait,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    const BASE_ID: i32 = 1;

    #[derive(Default)]
    struct MockState {
        currencies: Vec<Currency>,
        rates: Vec<ExchangeRate>,
        next_currency_id: i32,
        next_rate_id: i32,
        read_calls: u32,
    }

    /// Read-only in-memory repository with the same latest/as-of rules the
    /// SQL implements; counts every storage invocation.
    #[derive(Clone)]
    struct MockRateRepository {
        state: Arc<Mutex<MockState>>,
    }

    impl MockRateRepository {
        fn new() -> Self {
            let repo = Self {
                state: Arc::new(Mutex::new(MockState {
                    next_currency_id: 1,
                    next_rate_id: 1,
                    ..Default::default()
                })),
            };
            repo.seed_currency(DEFAULT_BASE_CURRENCY, "United States Dollar");
            repo
        }

        fn seed_currency(&self, code: &str, name: &str) -> i32 {
            let mut state = self.state.lock().unwrap();
            let id = state.next_currency_id;
            state.next_currency_id += 1;
            state.currencies.push(Currency {
                id,
                code: code.to_string(),
                name: name.to_string(),
                created_at: Utc::now().naive_utc(),
            });
            id
        }

        fn seed_rate(&self, target_id: i32, rate: Decimal, date: &str) -> i32 {
            let mut state = self.state.lock().unwrap();
            let id = state.next_rate_id;
            state.next_rate_id += 1;
            state.rates.push(ExchangeRate {
                id,
                base_currency_id: BASE_ID,
                target_currency_id: target_id,
                rate,
                effective_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                created_at: Utc::now().naive_utc(),
            });
            id
        }

        fn read_calls(&self) -> u32 {
            self.state.lock().unwrap().read_calls
        }

        fn best_rate_as_of(state: &MockState, target_id: i32, date: NaiveDate) -> Option<ExchangeRate> {
            state
                .rates
                .iter()
                .filter(|r| r.target_currency_id == target_id && r.effective_date <= date)
                .max_by_key(|r| (r.effective_date, r.id))
                .cloned()
        }
    }

    #[async_trait]
    impl RateRepositoryTrait for MockRateRepository {
        fn list_currencies_with_latest_rate(&self) -> Result<Vec<CurrencyWithRate>> {
            unimplemented!()
        }

        async fn list_currencies_page(
            &self,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<CurrencyWithRate>> {
            let mut state = self.state.lock().unwrap();
            state.read_calls += 1;

            let mut currencies = state.currencies.clone();
            currencies.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(currencies
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|c| {
                    let latest = state
                        .rates
                        .iter()
                        .filter(|r| r.target_currency_id == c.id)
                        .max_by_key(|r| (r.effective_date, r.id));
                    CurrencyWithRate {
                        id: c.id,
                        code: c.code,
                        name: c.name,
                        created_at: c.created_at,
                        latest_rate: latest.map(|r| r.rate),
                        rate_date: latest.map(|r| r.effective_date),
                    }
                })
                .collect())
        }

        async fn count_currencies(&self) -> Result<i64> {
            let mut state = self.state.lock().unwrap();
            state.read_calls += 1;
            Ok(state.currencies.len() as i64)
        }

        async fn list_rates_as_of(
            &self,
            date: NaiveDate,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<HistoricalRate>> {
            let mut state = self.state.lock().unwrap();
            state.read_calls += 1;

            let mut targets = state.currencies.clone();
            targets.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(targets
                .iter()
                .filter_map(|c| {
                    Self::best_rate_as_of(&state, c.id, date).map(|r| HistoricalRate {
                        id: r.id,
                        base_currency: DEFAULT_BASE_CURRENCY.to_string(),
                        target_currency: c.code.clone(),
                        target_currency_name: c.name.clone(),
                        rate: r.rate,
                        effective_date: r.effective_date,
                        created_at: r.created_at,
                    })
                })
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }

        async fn count_rate_targets_as_of(&self, date: NaiveDate) -> Result<i64> {
            let mut state = self.state.lock().unwrap();
            state.read_calls += 1;

            let count = state
                .currencies
                .iter()
                .filter(|c| Self::best_rate_as_of(&state, c.id, date).is_some())
                .count();
            Ok(count as i64)
        }

        async fn get_currency(&self, _id: i32) -> Result<Option<Currency>> {
            unimplemented!()
        }

        async fn upsert_currency_with_rate(
            &self,
            _code: String,
            _name: String,
            _rate: Decimal,
            _effective_date: NaiveDate,
        ) -> Result<(Currency, ExchangeRate)> {
            unimplemented!()
        }

        async fn update_currency_with_rate(
            &self,
            _id: i32,
            _name: String,
            _rate: Decimal,
            _effective_date: NaiveDate,
        ) -> Result<(Currency, ExchangeRate)> {
            unimplemented!()
        }

        async fn delete_currency(&self, _id: i32) -> Result<Currency> {
            unimplemented!()
        }
    }

    fn service(repo: &MockRateRepository) -> UserRateService {
        UserRateService::new(Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn listing_reports_totals_and_respects_the_limit() {
        let repo = MockRateRepository::new();
        for (code, name) in [
            ("EUR", "Euro"),
            ("GBP", "Pound Sterling"),
            ("JPY", "Japanese Yen"),
            ("THB", "Thai Baht"),
        ] {
            let id = repo.seed_currency(code, name);
            repo.seed_rate(id, dec!(1), "2025-01-01");
        }
        let service = service(&repo);

        let page = service
            .list_currencies(PageParams::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.data.len() as i64 <= page.pagination.limit);
        assert_eq!(page.pagination.total, 5); // USD included
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_more);
        assert!(page.pagination.has_previous);
        // Ordered by code: page 2 of [EUR GBP JPY THB USD] is [JPY THB].
        assert_eq!(page.data[0].code, "JPY");
        assert_eq!(page.data[1].code, "THB");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_well_formed() {
        let repo = MockRateRepository::new();
        let service = service(&repo);

        let page = service
            .list_currencies(PageParams::new(5, 10))
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert!(!page.pagination.has_more);
        assert!(page.pagination.has_previous);
    }

    #[tokio::test]
    async fn missing_date_fails_before_any_storage_call() {
        let repo = MockRateRepository::new();
        let service = service(&repo);

        for raw in [None, Some(""), Some("   ")] {
            let result = service.historical_rates(raw, PageParams::default()).await;
            assert!(matches!(
                result,
                Err(Error::Validation(ValidationError::MissingField(ref field))) if field == "date"
            ));
        }
        assert_eq!(repo.read_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_date_fails_before_any_storage_call() {
        let repo = MockRateRepository::new();
        let service = service(&repo);

        for raw in ["not-a-date", "2025-13-40", "01/02/2025"] {
            let result = service
                .historical_rates(Some(raw), PageParams::default())
                .await;
            assert!(matches!(
                result,
                Err(Error::Validation(ValidationError::DateParse(_)))
            ));
        }
        assert_eq!(repo.read_calls(), 0);
    }

    #[tokio::test]
    async fn as_of_query_returns_most_recent_rate_on_or_before_the_date() {
        let repo = MockRateRepository::new();
        let eur = repo.seed_currency("EUR", "Euro");
        repo.seed_rate(eur, dec!(0.92), "2024-12-01");
        let service = service(&repo);

        let page = service
            .historical_rates(Some("2025-01-01"), PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.query_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].target_currency, "EUR");
        assert_eq!(page.data[0].rate, dec!(0.92));
        assert_eq!(
            page.data[0].effective_date,
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn currencies_without_prior_rates_are_omitted_entirely() {
        let repo = MockRateRepository::new();
        let eur = repo.seed_currency("EUR", "Euro");
        repo.seed_rate(eur, dec!(0.92), "2024-12-01");
        let gbp = repo.seed_currency("GBP", "Pound Sterling");
        repo.seed_rate(gbp, dec!(0.79), "2025-02-01"); // after the query date
        let service = service(&repo);

        let page = service
            .historical_rates(Some("2025-01-01"), PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert!(page.data.iter().all(|r| r.target_currency != "GBP"));
    }

    #[tokio::test]
    async fn same_day_ties_resolve_to_the_highest_id() {
        let repo = MockRateRepository::new();
        let eur = repo.seed_currency("EUR", "Euro");
        // Should not happen under the uniqueness constraint, but the
        // tie-break must stay deterministic if it ever does.
        let _older = repo.seed_rate(eur, dec!(0.91), "2024-12-01");
        let newer = repo.seed_rate(eur, dec!(0.93), "2024-12-01");
        let service = service(&repo);

        let page = service
            .historical_rates(Some("2024-12-15"), PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, newer);
        assert_eq!(page.data[0].rate, dec!(0.93));
    }

    #[tokio::test]
    async fn historical_listing_is_sliced_by_target_code_order() {
        let repo = MockRateRepository::new();
        for (code, rate) in [("EUR", dec!(0.92)), ("GBP", dec!(0.79)), ("JPY", dec!(140))] {
            let id = repo.seed_currency(code, code);
            repo.seed_rate(id, rate, "2025-01-01");
        }
        let service = service(&repo);

        let page = service
            .historical_rates(Some("2025-06-01"), PageParams::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].target_currency, "JPY");
    }
}
