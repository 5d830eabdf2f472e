pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
};

/// Applied to every response that does not choose its own caching policy.
pub const NO_STORE: &str = "no-store";
/// Public catalog reads may be shared by caches for five minutes.
pub const PUBLIC_CACHE: &str = "public, s-maxage=300, stale-while-revalidate=60";

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{slug}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/api/catalog/featured", get(handlers::featured_products))
        .route("/api/catalog/categories", get(handlers::product_categories))
        .route(
            "/api/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/api/orders/{id}",
            get(handlers::get_order).put(handlers::update_order),
        )
        .route("/api/leads", post(handlers::submit_lead))
        .route(
            "/api/currencies",
            get(handlers::get_currency_rates).put(handlers::update_currency_rates),
        )
        .route("/api/currencies/convert", get(handlers::convert_price))
        .route("/api/settings", get(handlers::get_settings))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route("/api/gallery", get(handlers::gallery_images))
        .route("/api/blog/posts", get(handlers::blog_posts))
        .with_state(state)
        .layer(axum_middleware::from_fn(default_cache_control))
}

async fn default_cache_control(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static(NO_STORE));
    response
}
