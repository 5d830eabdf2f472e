//! Currency rate handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use poshpoule_api_types::PriceConversionResponse;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::currency::Currency;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiQuery};
use crate::infra::http::api::state::ApiState;

use super::currency_to_api;

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: i64,
    pub currency: String,
}

pub async fn get_currency_rates(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let rates = state.currencies.rates().await.map_err(currency_to_api)?;
    Ok(Json(rates))
}

pub async fn update_currency_rates(
    State(state): State<ApiState>,
    ApiJson(update): ApiJson<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let rates = state
        .currencies
        .update_rates(update)
        .await
        .map_err(currency_to_api)?;
    Ok(Json(rates))
}

pub async fn convert_price(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = query
        .currency
        .parse::<Currency>()
        .map_err(|err| ApiError::invalid_input(err.to_string()))?;
    let converter = state
        .currencies
        .converter()
        .await
        .map_err(currency_to_api)?;

    Ok(Json(PriceConversionResponse {
        currency: currency.code().to_string(),
        amount_naira: query.amount,
        amount: converter.convert(query.amount, currency),
        formatted: converter.format(query.amount, currency),
    }))
}
