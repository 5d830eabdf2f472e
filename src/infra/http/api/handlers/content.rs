//! Dashboard totals and the raw content collections.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use poshpoule_api_types::{AdminStatsResponse, GalleryResponse};

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

use super::store_to_api;

pub async fn admin_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.read().await.map_err(store_to_api)?;
    let stats = document.stats();
    Ok(Json(AdminStatsResponse {
        total_orders: stats.total_orders as u64,
        pending_orders: stats.pending_orders as u64,
        total_products: stats.total_products as u64,
        total_revenue: stats.total_revenue,
    }))
}

pub async fn gallery_images(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.read().await.map_err(store_to_api)?;
    Ok(Json(GalleryResponse {
        gallery_images: document.gallery_images.clone(),
    }))
}

pub async fn blog_posts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.read().await.map_err(store_to_api)?;
    Ok(Json(document.blog_posts_newest_first()))
}
