//! Product catalog handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use poshpoule_api_types::{
    DeletedResponse, PaginationMeta, ProductCreateRequest, ProductListResponse,
    ProductUpdateRequest,
};
use serde::Deserialize;

use crate::application::catalog::ProductFilter;
use crate::application::pagination::PageRequest;
use crate::application::products::{CreateProductCommand, UpdateProductCommand};
use crate::infra::http::api::PUBLIC_CACHE;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::infra::http::api::state::ApiState;

use super::{price_display, product_to_api, product_view, store_to_api};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub available: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyQuery {
    pub currency: Option<String>,
}

pub async fn list_products(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let display = price_display(&state, query.currency.as_deref(), &headers).await?;
    let filter = ProductFilter::new(query.category, query.featured, query.available, query.search);

    let page = state
        .catalog
        .list(&filter, PageRequest::new(query.page, query.page_size))
        .await
        .map_err(store_to_api)?;

    let body = ProductListResponse {
        data: page
            .items
            .into_iter()
            .map(|product| product_view(product, display.as_ref()))
            .collect(),
        pagination: PaginationMeta {
            page: page.meta.page,
            page_size: page.meta.page_size,
            total_items: page.meta.total_items,
            total_pages: page.meta.total_pages,
        },
    };

    Ok(([(header::CACHE_CONTROL, PUBLIC_CACHE)], Json(body)))
}

pub async fn get_product(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(query): ApiQuery<CurrencyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let display = price_display(&state, query.currency.as_deref(), &headers).await?;
    let product = state
        .catalog
        .find_by_slug(&slug)
        .await
        .map_err(store_to_api)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok((
        [(header::CACHE_CONTROL, PUBLIC_CACHE)],
        Json(product_view(product, display.as_ref())),
    ))
}

pub async fn create_product(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<ProductCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateProductCommand {
        name: payload.name,
        slug: payload.slug,
        description: payload.description,
        price_naira: payload.price_naira,
        category: payload.category,
        stock: payload.stock,
        image: payload.image,
        images: payload.images,
        featured: payload.featured,
        available: payload.available,
    };

    let product = state
        .products
        .create(command)
        .await
        .map_err(product_to_api)?;

    Ok((StatusCode::CREATED, Json(product_view(product, None))))
}

pub async fn update_product(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
    ApiJson(payload): ApiJson<ProductUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateProductCommand {
        name: payload.name,
        slug: payload.slug,
        description: payload.description,
        price_naira: payload.price_naira,
        category: payload.category,
        stock: payload.stock,
        image: payload.image,
        images: payload.images,
        featured: payload.featured,
        available: payload.available,
    };

    let product = state
        .products
        .update(&slug, command)
        .await
        .map_err(product_to_api)?;

    Ok(Json(product_view(product, None)))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .products
        .delete(&slug)
        .await
        .map_err(product_to_api)?;

    Ok(Json(DeletedResponse { success: true }))
}

pub async fn featured_products(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<FeaturedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let display = price_display(&state, query.currency.as_deref(), &headers).await?;
    let products = state
        .catalog
        .featured(query.limit)
        .await
        .map_err(store_to_api)?;

    let body: Vec<_> = products
        .into_iter()
        .map(|product| product_view(product, display.as_ref()))
        .collect();
    Ok(([(header::CACHE_CONTROL, PUBLIC_CACHE)], Json(body)))
}

pub async fn product_categories(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.catalog.categories().await.map_err(store_to_api)?;
    Ok(([(header::CACHE_CONTROL, PUBLIC_CACHE)], Json(categories)))
}
