/// Fixed base currency every rate in the catalog is expressed against.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Length of an ISO 4217 currency code.
pub const CURRENCY_CODE_LEN: usize = 3;
