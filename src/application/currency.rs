//! Stored exchange rates against the Naira.

use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    domain::currency::CurrencyConverter,
    infra::store::{JsonDocumentStore, StoreError},
};

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CurrencyService {
    store: Arc<JsonDocumentStore>,
}

impl CurrencyService {
    pub fn new(store: Arc<JsonDocumentStore>) -> Self {
        Self { store }
    }

    /// Rates exactly as stored.
    pub async fn rates(&self) -> Result<BTreeMap<String, f64>, CurrencyError> {
        Ok(self.store.read().await?.currency_rates.clone())
    }

    pub async fn converter(&self) -> Result<CurrencyConverter, CurrencyError> {
        let document = self.store.read().await?;
        Ok(CurrencyConverter::from_rates(&document.currency_rates))
    }

    /// Merge `update` (an object of currency code to rate) into the stored rates. Codes
    /// that are not mentioned keep their current rate.
    pub async fn update_rates(&self, update: Value) -> Result<BTreeMap<String, f64>, CurrencyError> {
        let incoming = parse_rates(update).map_err(CurrencyError::Validation)?;

        let rates = self
            .store
            .mutate(|document| {
                document.currency_rates.extend(incoming.clone());
                Ok::<_, CurrencyError>(document.currency_rates.clone())
            })
            .await?;

        info!(
            target = "poshpoule::currency",
            op = "currency::update_rates",
            result = "ok",
            updated = ?incoming.keys().collect::<Vec<_>>(),
            "Currency rates updated"
        );
        Ok(rates)
    }
}

fn parse_rates(update: Value) -> Result<BTreeMap<String, f64>, String> {
    let Value::Object(entries) = update else {
        return Err("Invalid rates format: expected an object of currency codes".to_string());
    };

    let mut rates = BTreeMap::new();
    for (code, value) in entries {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid currency code `{code}`"));
        }
        let rate = value
            .as_f64()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| format!("Rate for {code} must be a positive number"))?;
        rates.insert(code, rate);
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn parses_and_normalizes_codes() {
        let rates = parse_rates(json!({"usd": 0.0012, " GBP ": 0.001})).unwrap();
        assert_eq!(rates.get("USD"), Some(&0.0012));
        assert_eq!(rates.get("GBP"), Some(&0.001));
    }

    #[test]
    fn rejects_non_objects_and_bad_rates() {
        assert!(parse_rates(json!([1, 2])).is_err());
        assert!(parse_rates(json!({"USD": 0})).is_err());
        assert!(parse_rates(json!({"USD": "0.001"})).is_err());
        assert!(parse_rates(json!({"DOLLARS": 1.0})).is_err());
    }
}
