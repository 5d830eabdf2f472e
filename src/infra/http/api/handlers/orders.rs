//! Order handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use poshpoule_api_types::{OrderCreateRequest, OrderUpdateRequest};

use crate::application::orders::{OrderLineCommand, PlaceOrderCommand, UpdateOrderCommand};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath};
use crate::infra::http::api::state::ApiState;

use super::order_to_api;

pub async fn create_order(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<OrderCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = PlaceOrderCommand {
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        customer_phone: payload.customer_phone,
        products: payload.products.map(|lines| {
            lines
                .into_iter()
                .map(|line| OrderLineCommand {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect()
        }),
        total_amount: payload.total_amount,
        currency: payload.currency,
        order_type: payload.order_type,
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        delivery_address: payload.delivery_address,
        notes: payload.notes,
    };

    let order = state.orders.place(command).await.map_err(order_to_api)?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let orders = state.orders.list().await.map_err(order_to_api)?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.get(&id).await.map_err(order_to_api)?;
    Ok(Json(order))
}

pub async fn update_order(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<OrderUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateOrderCommand {
        status: payload.status,
        order_type: payload.order_type,
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        delivery_address: payload.delivery_address,
        notes: payload.notes,
    };

    let order = state
        .orders
        .update(&id, command)
        .await
        .map_err(order_to_api)?;
    Ok(Json(order))
}
