pub mod api;
mod middleware;
pub mod preference;

pub use api::{ApiState, build_api_router};

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};

use crate::application::error::ErrorReport;
use crate::infra::store::StoreError;

/// Full application router: the JSON API plus the health check.
pub fn build_router(state: ApiState) -> Router {
    let health = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    build_api_router(state)
        .merge(health)
        .layer(from_fn(middleware::log_responses))
        .layer(from_fn(middleware::set_request_context))
}

async fn health_check(State(state): State<ApiState>) -> Response {
    store_health_response(state.store.read().await.map(|_| ()))
}

fn store_health_response(result: Result<(), StoreError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::store_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
