//! Site settings handler

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::infra::http::api::PUBLIC_CACHE;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

use super::store_to_api;

pub async fn get_settings(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.read().await.map_err(store_to_api)?;
    Ok((
        [(header::CACHE_CONTROL, PUBLIC_CACHE)],
        Json(document.settings.clone()),
    ))
}
