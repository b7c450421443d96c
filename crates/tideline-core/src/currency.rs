//! Currency normalization
//!
//! Every amount is converted to the configured base currency before it is
//! aggregated. Conversion is a pure function of the rate table.

use std::collections::HashMap;

use tracing::warn;

/// Converts amounts into the base currency
pub trait CurrencyConverter: Send + Sync {
    /// Base currency code (e.g. "USD")
    fn base(&self) -> &str;

    /// Convert `amount` denominated in `currency` into the base currency
    fn to_base(&self, amount: f64, currency: &str) -> f64;
}

/// Static exchange rates (units of base currency per unit of foreign currency)
#[derive(Debug, Clone)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: f64) -> Self {
        self.rates.insert(currency.to_uppercase(), rate);
        self
    }

    pub fn from_rates(base: &str, rates: &HashMap<String, f64>) -> Self {
        rates
            .iter()
            .fold(Self::new(base), |table, (code, rate)| table.with_rate(code, *rate))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl CurrencyConverter for RateTable {
    fn base(&self) -> &str {
        &self.base
    }

    fn to_base(&self, amount: f64, currency: &str) -> f64 {
        if currency.eq_ignore_ascii_case(&self.base) {
            return amount;
        }
        match self.rates.get(&currency.to_uppercase()) {
            Some(rate) => amount * rate,
            None => {
                warn!(currency = %currency, base = %self.base, "No exchange rate, using amount as-is");
                amount
            }
        }
    }
}
