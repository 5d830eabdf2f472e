//! Currency conversion against the Naira base price.
//!
//! Stored rates override the built-in defaults per currency, so a partially populated
//! `currencyRates` collection still converts every supported currency.

use std::{collections::BTreeMap, fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    Ngn,
    Usd,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Ngn, Currency::Usd, Currency::Gbp];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Ngn => "₦",
            Currency::Usd => "$",
            Currency::Gbp => "£",
        }
    }

    fn default_rate(self) -> f64 {
        match self {
            Currency::Ngn => 1.0,
            Currency::Usd => 0.0013,
            Currency::Gbp => 0.00105,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported currency `{0}`")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCurrency(trimmed.to_string()))
    }
}

/// Converts and formats Naira amounts using a fixed set of rates.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyConverter {
    rates: BTreeMap<Currency, f64>,
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::from_rates(&BTreeMap::new())
    }
}

impl CurrencyConverter {
    /// Build a converter from stored rates keyed by currency code. Unknown codes and
    /// non-positive rates are ignored.
    pub fn from_rates(stored: &BTreeMap<String, f64>) -> Self {
        let rates = Currency::ALL
            .into_iter()
            .map(|currency| {
                let rate = stored
                    .iter()
                    .find(|(code, _)| code.eq_ignore_ascii_case(currency.code()))
                    .map(|(_, rate)| *rate)
                    .filter(|rate| rate.is_finite() && *rate > 0.0)
                    .unwrap_or_else(|| currency.default_rate());
                (currency, rate)
            })
            .collect();
        Self { rates }
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates
            .get(&currency)
            .copied()
            .unwrap_or_else(|| currency.default_rate())
    }

    pub fn convert(&self, amount_naira: i64, currency: Currency) -> f64 {
        amount_naira as f64 * self.rate(currency)
    }

    /// Naira renders as a rounded, comma-grouped whole number; other currencies use two decimals.
    pub fn format(&self, amount_naira: i64, currency: Currency) -> String {
        let converted = self.convert(amount_naira, currency);
        match currency {
            Currency::Ngn => format!(
                "{}{}",
                currency.symbol(),
                group_thousands(converted.round() as i64)
            ),
            Currency::Usd | Currency::Gbp => format!("{}{converted:.2}", currency.symbol()),
        }
    }
}

/// Format a Naira amount without conversion, e.g. `₦12,500`.
pub fn format_naira(amount: i64) -> String {
    format!("{}{}", Currency::Ngn.symbol(), group_thousands(amount))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
