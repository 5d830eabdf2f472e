mod common;

use std::collections::HashSet;

use poshpoule::application::{leads::SubmitLeadCommand, products::CreateProductCommand};
use tokio::task::JoinSet;

use common::spawn_app;

const WRITERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lead_submissions_all_land_with_distinct_ids() {
    let app = spawn_app();

    let mut tasks = JoinSet::new();
    for n in 0..WRITERS {
        let leads = app.state.leads.clone();
        tasks.spawn(async move {
            leads
                .submit(SubmitLeadCommand {
                    name: Some(format!("Visitor {n}")),
                    email: Some(format!("visitor{n}@example.com")),
                    subject: Some("Bulk eggs".into()),
                    message: Some("Do you deliver to Yaba?".into()),
                    ..Default::default()
                })
                .await
        });
    }

    let mut returned = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        let lead = joined.expect("task finished").expect("lead stored");
        returned.insert(lead.id);
    }
    assert_eq!(returned.len(), WRITERS);

    let stored = app.on_disk();
    let stored_ids: HashSet<&str> = stored["leads"]
        .as_array()
        .expect("leads array")
        .iter()
        .filter_map(|lead| lead["id"].as_str())
        .collect();
    assert_eq!(stored_ids.len(), WRITERS);
    assert!(returned.iter().all(|id| stored_ids.contains(id.as_str())));
    assert_eq!(stored["version"], WRITERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_product_creation_keeps_every_product() {
    let app = spawn_app();

    let mut tasks = JoinSet::new();
    for n in 0..WRITERS {
        let products = app.state.products.clone();
        tasks.spawn(async move {
            products
                .create(CreateProductCommand {
                    name: Some(format!("Quail Eggs {n}")),
                    slug: Some(format!("quail-eggs-{n}")),
                    description: Some("Twelve to a pack".into()),
                    price_naira: Some(1_500),
                    category: Some("eggs".into()),
                    stock: Some(40),
                    ..Default::default()
                })
                .await
        });
    }

    let mut ids = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        let product = joined.expect("task finished").expect("product created");
        assert!(ids.insert(product.id), "duplicate product id");
    }

    let stored = app.on_disk();
    let products = stored["products"].as_array().expect("products array");
    assert_eq!(products.len(), 3 + WRITERS);
    let stored_ids: HashSet<&str> = products
        .iter()
        .filter_map(|product| product["id"].as_str())
        .collect();
    assert_eq!(stored_ids.len(), 3 + WRITERS);

    let listed = app
        .state
        .catalog
        .list(&Default::default(), Default::default())
        .await
        .expect("list succeeds");
    assert_eq!(listed.meta.total_items, (3 + WRITERS) as u64);
}
