mod common;

use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::Method;
use metrics_util::debugging::DebuggingRecorder;
use poshpoule::application::{
    catalog::ProductFilter,
    notify::{MailError, Mailer, NotificationDispatcher, OutboundEmail},
    pagination::PageRequest,
};
use serde_json::json;

use common::spawn_app_with;

struct FlakyMailer;

#[async_trait]
impl Mailer for FlakyMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if email.subject.starts_with("New Contact") {
            Ok(())
        } else {
            Err(MailError::Transport("relay refused".into()))
        }
    }
}

#[tokio::test]
async fn storefront_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = spawn_app_with(NotificationDispatcher::new(
        Arc::new(FlakyMailer),
        Duration::from_secs(1),
    ));

    // Catalog miss, then hit.
    for _ in 0..2 {
        app.state
            .catalog
            .list(&ProductFilter::default(), PageRequest::default())
            .await
            .expect("list succeeds");
    }

    // Store write plus invalidation, and a failed order notification.
    let order = app.state.orders.place(
        poshpoule::application::orders::PlaceOrderCommand {
            customer_name: Some("Ada".into()),
            customer_email: Some("ada@example.com".into()),
            customer_phone: Some("0801".into()),
            products: Some(vec![poshpoule::application::orders::OrderLineCommand {
                product_id: "product-1".into(),
                quantity: 1,
            }]),
            total_amount: Some(4500),
            ..Default::default()
        },
    );
    let placed = order.await.expect("order placed");
    assert_eq!(placed.id, "order-1");

    // A delivered lead notification.
    let response = app
        .send(
            Method::POST,
            "/api/leads",
            Some(json!({
                "name": "Chidi",
                "email": "chidi@example.com",
                "subject": "Hello",
                "message": "Hi"
            })),
        )
        .await;
    assert!(response.status().is_success());

    // Out-of-band writer to trigger a conflict.
    let mut external = app.on_disk();
    external["version"] = json!(99);
    std::fs::write(
        &app.data_path,
        serde_json::to_vec(&external).expect("serializes"),
    )
    .expect("external write");
    let conflict = app
        .state
        .currencies
        .update_rates(json!({"USD": 0.002}))
        .await;
    assert!(conflict.is_err());

    // Notifications are spawned; give them a moment to record.
    let expected = [
        "poshpoule_catalog_cache_hit_total",
        "poshpoule_catalog_cache_miss_total",
        "poshpoule_catalog_cache_invalidate_total",
        "poshpoule_store_write_total",
        "poshpoule_store_write_ms",
        "poshpoule_store_conflict_total",
        "poshpoule_mail_sent_total",
        "poshpoule_mail_failed_total",
    ];

    let mut names = HashSet::new();
    for _ in 0..50 {
        names = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
            .collect();
        if expected.iter().all(|metric| names.contains(*metric)) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
