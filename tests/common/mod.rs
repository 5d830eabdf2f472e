#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, header},
};
use poshpoule::{
    application::{
        clock::{Clock, ManualClock},
        notify::NotificationDispatcher,
    },
    infra::{
        http::{ApiState, build_router},
        store::JsonDocumentStore,
    },
};
use serde_json::{Value, json};
use tempfile::TempDir;
use time::macros::datetime;
use tower::ServiceExt;

pub const CACHE_TTL: Duration = Duration::from_secs(300);

pub struct TestApp {
    pub router: Router,
    pub state: ApiState,
    pub store: Arc<JsonDocumentStore>,
    pub clock: Arc<ManualClock>,
    pub data_path: PathBuf,
    _dir: TempDir,
}

pub fn seed_document() -> Value {
    json!({
        "users": [],
        "products": [
            {
                "id": "product-1",
                "name": "Organic Farm Eggs",
                "slug": "organic-farm-eggs",
                "description": "A crate of thirty free-range eggs.",
                "priceNaira": 4500,
                "basePriceNaira": 4500,
                "category": "eggs",
                "stock": 20,
                "image": "/images/eggs.webp",
                "images": [],
                "featured": true,
                "available": true,
                "createdAt": "2024-03-01T09:00:00Z"
            },
            {
                "id": "product-2",
                "name": "Whole Broiler",
                "slug": "whole-broiler",
                "description": "Dressed and chilled.",
                "priceNaira": 12000,
                "basePriceNaira": 12000,
                "category": "poultry",
                "stock": 3,
                "image": "/images/broiler.webp",
                "images": [],
                "featured": false,
                "available": true,
                "createdAt": "2024-03-02T09:00:00Z"
            },
            {
                "id": "product-3",
                "name": "Smoked Turkey",
                "slug": "smoked-turkey",
                "description": "Seasonal.",
                "priceNaira": 30000,
                "basePriceNaira": 30000,
                "category": "poultry",
                "stock": 0,
                "image": "/images/turkey.webp",
                "images": [],
                "featured": true,
                "available": false,
                "createdAt": "2024-03-03T09:00:00Z"
            }
        ],
        "orders": [],
        "testimonials": [{"id": "t-1", "quote": "Best eggs in Lagos"}],
        "blogPosts": [],
        "galleryImages": [],
        "teamMembers": [],
        "pickupSlots": [],
        "leads": [],
        "whyChooseUs": [],
        "currencyRates": {"NGN": 1.0, "USD": 0.0013, "GBP": 0.00105},
        "settings": {
            "siteName": "PoshPOULE Farms",
            "slogan": "Fresh from the farm",
            "contactEmail": "hello@example.com",
            "contactPhone": "+234 800 000 0000",
            "address": "Lagos"
        }
    })
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(NotificationDispatcher::disabled())
}

pub fn spawn_app_with(notifier: NotificationDispatcher) -> TestApp {
    spawn_app_seeded(seed_document(), notifier)
}

pub fn spawn_app_seeded(seed: Value, notifier: NotificationDispatcher) -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let data_path = dir.path().join("data.json");
    let seed = serde_json::to_vec_pretty(&seed).expect("seed serializes");
    std::fs::write(&data_path, seed).expect("seed written");

    let store = Arc::new(JsonDocumentStore::open(data_path.clone()));
    let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 12:00 UTC)));
    let state = ApiState::assemble(
        store.clone(),
        CACHE_TTL,
        clock.clone() as Arc<dyn Clock>,
        notifier,
    );

    TestApp {
        router: build_router(state.clone()),
        state,
        store,
        clock,
        data_path,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).expect("body serializes"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None).await
    }

    /// Contents of the data file as currently on disk.
    pub fn on_disk(&self) -> Value {
        let raw = std::fs::read(&self.data_path).expect("data file readable");
        serde_json::from_slice(&raw).expect("data file is JSON")
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn cache_control(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
}
