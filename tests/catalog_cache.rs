mod common;

use std::time::Duration;

use poshpoule::application::{catalog::ProductFilter, pagination::PageRequest};

use common::{CACHE_TTL, spawn_app};

async fn set_stock_behind_the_catalog(app: &common::TestApp, stock: i64) {
    app.store
        .mutate(|document| {
            document.products[0].stock = stock;
            Ok::<_, poshpoule::infra::store::StoreError>(())
        })
        .await
        .expect("direct write succeeds");
}

async fn first_stock(app: &common::TestApp) -> i64 {
    let page = app
        .state
        .catalog
        .list(&ProductFilter::default(), PageRequest::default())
        .await
        .expect("list succeeds");
    page.items[0].stock
}

#[tokio::test]
async fn snapshot_is_reused_until_the_ttl_elapses() {
    let app = spawn_app();
    assert_eq!(first_stock(&app).await, 20);

    // A write that skips invalidation stays hidden while the snapshot is fresh.
    set_stock_behind_the_catalog(&app, 7).await;
    assert_eq!(first_stock(&app).await, 20);

    app.clock.advance(CACHE_TTL);
    assert_eq!(first_stock(&app).await, 20, "age equal to the TTL is fresh");

    app.clock.advance(Duration::from_secs(1));
    assert_eq!(first_stock(&app).await, 7);
}

#[tokio::test]
async fn invalidation_forces_a_reload_and_is_idempotent() {
    let app = spawn_app();
    assert_eq!(first_stock(&app).await, 20);

    app.state
        .products
        .update(
            "organic-farm-eggs",
            poshpoule::application::products::UpdateProductCommand {
                stock: Some(5),
                ..Default::default()
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(first_stock(&app).await, 5);

    app.state.catalog.invalidate();
    app.state.catalog.invalidate();
    assert_eq!(first_stock(&app).await, 5);
}

#[tokio::test]
async fn refresh_reports_the_product_count() {
    let app = spawn_app();
    let loaded = app.state.catalog.refresh().await.expect("refresh succeeds");
    assert_eq!(loaded, 3);
    assert_eq!(app.state.catalog.ttl(), CACHE_TTL);
}

#[tokio::test]
async fn detail_reads_bypass_the_list_snapshot() {
    let app = spawn_app();
    assert_eq!(first_stock(&app).await, 20);

    app.state
        .orders
        .place(poshpoule::application::orders::PlaceOrderCommand {
            customer_name: Some("Ada".into()),
            customer_email: Some("ada@example.com".into()),
            customer_phone: Some("0801".into()),
            products: Some(vec![poshpoule::application::orders::OrderLineCommand {
                product_id: "product-1".into(),
                quantity: 4,
            }]),
            total_amount: Some(18000),
            ..Default::default()
        })
        .await
        .expect("order placed");

    let product = app
        .state
        .catalog
        .find_by_slug("organic-farm-eggs")
        .await
        .expect("lookup succeeds")
        .expect("product exists");
    assert_eq!(product.stock, 16);
    assert_eq!(first_stock(&app).await, 16);
}
