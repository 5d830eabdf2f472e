//! How a request chooses the currency prices are displayed in.

use axum::http::{HeaderMap, header};

use crate::domain::currency::{Currency, UnknownCurrency};

pub const CURRENCY_COOKIE: &str = "poshpoule-currency";

pub trait CurrencyPreference: Send + Sync {
    /// `explicit` is the request's own choice (e.g. a query parameter). An explicit
    /// unknown code is an error; a stale cookie is ignored.
    fn resolve(
        &self,
        explicit: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<Option<Currency>, UnknownCurrency>;
}

/// Query parameter first, then the currency cookie set by the storefront.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryOrCookie;

impl CurrencyPreference for QueryOrCookie {
    fn resolve(
        &self,
        explicit: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<Option<Currency>, UnknownCurrency> {
        if let Some(code) = explicit.filter(|code| !code.trim().is_empty()) {
            return code.parse().map(Some);
        }
        Ok(cookie_value(headers, CURRENCY_COOKIE).and_then(|code| code.parse().ok()))
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::HeaderValue;

    fn cookies(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn query_wins_over_cookie() {
        let headers = cookies("poshpoule-currency=GBP");
        assert_eq!(
            QueryOrCookie.resolve(Some("usd"), &headers),
            Ok(Some(Currency::Usd))
        );
    }

    #[test]
    fn falls_back_to_cookie() {
        let headers = cookies("theme=dark; poshpoule-currency=GBP");
        assert_eq!(QueryOrCookie.resolve(None, &headers), Ok(Some(Currency::Gbp)));
    }

    #[test]
    fn unknown_query_is_an_error_but_bad_cookie_is_ignored() {
        assert!(QueryOrCookie.resolve(Some("EUR"), &HeaderMap::new()).is_err());
        let headers = cookies("poshpoule-currency=XYZ");
        assert_eq!(QueryOrCookie.resolve(None, &headers), Ok(None));
    }
}
