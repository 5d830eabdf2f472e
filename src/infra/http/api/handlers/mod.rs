//! API handlers organized by resource type.
//!
//! Error conversions from the service layer live here and are shared across modules.

mod content;
mod currencies;
mod leads;
mod orders;
mod products;
mod settings;

pub use content::*;
pub use currencies::*;
pub use leads::*;
pub use orders::*;
pub use products::*;
pub use settings::*;

use axum::http::{HeaderMap, StatusCode};
use poshpoule_api_types::ProductView;

use crate::application::currency::CurrencyError;
use crate::application::leads::LeadError;
use crate::application::orders::OrderError;
use crate::application::products::ProductError;
use crate::domain::currency::{Currency, CurrencyConverter};
use crate::domain::entities::ProductRecord;
use crate::infra::store::StoreError;

use super::error::{ApiError, codes};
use super::state::ApiState;

pub(crate) fn store_to_api(err: StoreError) -> ApiError {
    ApiError::storage(&err)
}

pub(crate) fn product_to_api(err: ProductError) -> ApiError {
    match err {
        ProductError::Validation(message) => ApiError::invalid_input(message),
        ProductError::DuplicateSlug(slug) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::DUPLICATE,
            "A product with this slug already exists",
            Some(slug),
        ),
        ProductError::NotFound => ApiError::not_found("Product not found"),
        ProductError::Store(err) => store_to_api(err),
    }
}

pub(crate) fn order_to_api(err: OrderError) -> ApiError {
    match err {
        OrderError::Validation(message) => ApiError::invalid_input(message),
        OrderError::NotFound => ApiError::not_found("Order not found"),
        OrderError::Store(err) => store_to_api(err),
    }
}

pub(crate) fn lead_to_api(err: LeadError) -> ApiError {
    match err {
        LeadError::Validation(message) => ApiError::invalid_input(message),
        LeadError::Store(err) => store_to_api(err),
    }
}

pub(crate) fn currency_to_api(err: CurrencyError) -> ApiError {
    match err {
        CurrencyError::Validation(message) => ApiError::invalid_input(message),
        CurrencyError::Store(err) => store_to_api(err),
    }
}

/// Converter plus the currency a response should display prices in.
pub(crate) struct PriceDisplay {
    converter: CurrencyConverter,
    currency: Currency,
}

impl PriceDisplay {
    fn format(&self, amount_naira: i64) -> String {
        self.converter.format(amount_naira, self.currency)
    }
}

pub(crate) async fn price_display(
    state: &ApiState,
    requested: Option<&str>,
    headers: &HeaderMap,
) -> Result<Option<PriceDisplay>, ApiError> {
    let currency = state
        .preference
        .resolve(requested, headers)
        .map_err(|err| ApiError::invalid_input(err.to_string()))?;
    let Some(currency) = currency else {
        return Ok(None);
    };
    let converter = state.currencies.converter().await.map_err(currency_to_api)?;
    Ok(Some(PriceDisplay {
        converter,
        currency,
    }))
}

/// Public projection: drops the creation-time base price.
pub(crate) fn product_view(record: ProductRecord, display: Option<&PriceDisplay>) -> ProductView {
    let display_price = display.map(|display| display.format(record.price_naira));
    ProductView {
        id: record.id,
        name: record.name,
        slug: record.slug,
        description: record.description,
        price_naira: record.price_naira,
        category: record.category,
        stock: record.stock,
        image: record.image,
        images: record.images,
        featured: record.featured,
        available: record.available,
        created_at: record.created_at,
        updated_at: record.updated_at,
        display_price,
        extra: record.extra,
    }
}
