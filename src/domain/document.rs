//! Shape of the single JSON document that backs the storefront.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::domain::{
    entities::{LeadRecord, OrderRecord, ProductRecord, SiteSettings},
    ids::{Identified, next_id},
    types::OrderStatus,
};

/// Top-level keys expected in a well-formed document.
pub const COLLECTION_KEYS: [&str; 12] = [
    "users",
    "products",
    "orders",
    "testimonials",
    "blogPosts",
    "galleryImages",
    "teamMembers",
    "pickupSlots",
    "leads",
    "whyChooseUs",
    "currencyRates",
    "settings",
];

/// The whole database. Collections this service never interprets are carried as raw JSON
/// so a rewrite leaves them byte-for-byte equivalent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    /// Incremented on every committed write; compared before writing to detect lost updates.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub testimonials: Vec<Value>,
    #[serde(default)]
    pub blog_posts: Vec<Value>,
    #[serde(default)]
    pub gallery_images: Vec<Value>,
    #[serde(default)]
    pub team_members: Vec<Value>,
    #[serde(default)]
    pub pickup_slots: Vec<Value>,
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
    #[serde(default)]
    pub why_choose_us: Vec<Value>,
    #[serde(default)]
    pub currency_rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub settings: SiteSettings,
    /// Members of the typed collections that failed to decode.
    #[serde(skip)]
    pub quarantined: Quarantined,
}

/// Raw records set aside at load time. They are written back unchanged after the typed
/// members of their collection and still reserve their ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quarantined {
    pub products: Vec<Value>,
    pub orders: Vec<Value>,
    pub leads: Vec<Value>,
}

impl Quarantined {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.orders.is_empty() && self.leads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len() + self.orders.len() + self.leads.len()
    }
}

impl Database {
    pub fn find_product(&self, slug: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.slug == slug)
    }

    pub fn find_order(&self, id: &str) -> Option<&OrderRecord> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// Order and catalog totals for the admin dashboard.
    pub fn stats(&self) -> StoreStats {
        let pending_orders = self
            .orders
            .iter()
            .filter(|order| matches!(order.status, OrderStatus::New | OrderStatus::Confirmed))
            .count();
        let total_revenue = self
            .orders
            .iter()
            .filter(|order| order.status == OrderStatus::Completed)
            .fold(0i64, |sum, order| sum.saturating_add(order.total_amount));

        StoreStats {
            total_orders: self.orders.len(),
            pending_orders,
            total_products: self.products.len(),
            total_revenue,
        }
    }

    /// Blog posts ordered by `createdAt`, newest first. Posts without a readable date sort
    /// last and otherwise keep their stored order.
    pub fn blog_posts_newest_first(&self) -> Vec<Value> {
        let mut posts = self.blog_posts.clone();
        posts.sort_by_cached_key(|post| std::cmp::Reverse(post_date(post)));
        posts
    }

    pub fn next_product_id(&self) -> String {
        next_record_id(&self.products, &self.quarantined.products, "product")
    }

    pub fn next_order_id(&self) -> String {
        next_record_id(&self.orders, &self.quarantined.orders, "order")
    }

    pub fn next_lead_id(&self) -> String {
        next_record_id(&self.leads, &self.quarantined.leads, "lead")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_orders: usize,
    /// Orders still `new` or `confirmed`.
    pub pending_orders: usize,
    pub total_products: usize,
    /// Sum of `totalAmount` over completed orders, in naira.
    pub total_revenue: i64,
}

fn post_date(post: &Value) -> Option<OffsetDateTime> {
    let raw = post.get("createdAt")?.as_str()?;
    OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight().assume_utc())
    })
}

fn next_record_id<T: Identified>(records: &[T], raw: &[Value], default_prefix: &str) -> String {
    let typed = records.iter().map(Identified::id);
    let untyped = raw
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_str));
    next_id(typed.chain(untyped), default_prefix)
}
