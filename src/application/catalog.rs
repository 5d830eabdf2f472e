//! Product queries with a process-local, TTL-bounded list snapshot.
//!
//! List queries are answered from a snapshot of the product collection that is reused
//! until it is older than the configured TTL or until a mutation invalidates it. Single
//! product lookups and the derived views always read through the store, whose own memo
//! already avoids disk access.

use std::{
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};

use metrics::counter;
use tracing::{debug, info};

use crate::{
    application::{
        clock::Clock,
        pagination::{PageRequest, Paginated},
    },
    domain::entities::ProductRecord,
    infra::store::{JsonDocumentStore, StoreError},
};

pub const DEFAULT_FEATURED_LIMIT: usize = 4;

const TARGET: &str = "poshpoule::catalog";

/// Conjunctive product filter. Blank strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    category: Option<String>,
    featured: Option<bool>,
    available: Option<bool>,
    search: Option<String>,
}

impl ProductFilter {
    pub fn new(
        category: Option<String>,
        featured: Option<bool>,
        available: Option<bool>,
        search: Option<String>,
    ) -> Self {
        Self {
            category: category.filter(|value| !value.trim().is_empty()),
            featured,
            available,
            search: search
                .map(|value| value.trim().to_lowercase())
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn matches(&self, product: &ProductRecord) -> bool {
        if let Some(category) = self.category.as_deref() {
            if product.category != category {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.featured != featured {
                return false;
            }
        }
        if let Some(available) = self.available {
            if product.is_in_stock() != available {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref() {
            let hit = [&product.name, &product.description, &product.category]
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
struct SnapshotState {
    products: Option<Arc<Vec<ProductRecord>>>,
    refreshed_at: Option<Instant>,
    /// Bumped by every invalidation so a reload that raced with a write is discarded.
    generation: u64,
}

pub struct ProductCatalog {
    store: Arc<JsonDocumentStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: RwLock<SnapshotState>,
}

impl ProductCatalog {
    pub fn new(store: Arc<JsonDocumentStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl,
            state: RwLock::new(SnapshotState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the snapshot eagerly, typically at startup.
    pub async fn init(&self) -> Result<(), StoreError> {
        let products = self.refresh().await?;
        info!(
            target = TARGET,
            op = "catalog::init",
            products,
            ttl_seconds = self.ttl.as_secs(),
            "Product catalog warmed"
        );
        Ok(())
    }

    /// Reload the snapshot from the store, returning the number of products loaded.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let generation = self.read_state().generation;
        let products = self.reload(generation).await?;
        Ok(products.len())
    }

    /// Drop the snapshot so the next list query reloads it. Calling it repeatedly is harmless.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.products = None;
        state.refreshed_at = None;
        state.generation = state.generation.wrapping_add(1);
        counter!("poshpoule_catalog_cache_invalidate_total").increment(1);
        debug!(target = TARGET, op = "catalog::invalidate", "Product snapshot dropped");
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<ProductRecord>, StoreError> {
        let products = self.snapshot().await?;
        let matching: Vec<ProductRecord> = products
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        Ok(page.apply(&matching))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, StoreError> {
        let document = self.store.read().await?;
        Ok(document.find_product(slug).cloned())
    }

    /// Featured products that are offered for sale, in stored order.
    pub async fn featured(&self, limit: Option<usize>) -> Result<Vec<ProductRecord>, StoreError> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
        let document = self.store.read().await?;
        Ok(document
            .products
            .iter()
            .filter(|product| product.featured && product.available)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Distinct non-empty categories in first-seen order.
    pub async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let document = self.store.read().await?;
        let mut categories: Vec<String> = Vec::new();
        for product in &document.products {
            if product.category.is_empty() || categories.contains(&product.category) {
                continue;
            }
            categories.push(product.category.clone());
        }
        Ok(categories)
    }

    async fn snapshot(&self) -> Result<Arc<Vec<ProductRecord>>, StoreError> {
        let now = self.clock.now();
        let generation = {
            let state = self.read_state();
            if let (Some(products), Some(refreshed_at)) = (&state.products, state.refreshed_at) {
                if now.saturating_duration_since(refreshed_at) <= self.ttl {
                    counter!("poshpoule_catalog_cache_hit_total").increment(1);
                    return Ok(products.clone());
                }
            }
            state.generation
        };

        counter!("poshpoule_catalog_cache_miss_total").increment(1);
        self.reload(generation).await
    }

    async fn reload(&self, generation: u64) -> Result<Arc<Vec<ProductRecord>>, StoreError> {
        let document = self.store.read().await?;
        let products = Arc::new(document.products.clone());

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation == generation {
            state.products = Some(products.clone());
            state.refreshed_at = Some(self.clock.now());
        } else {
            debug!(
                target = TARGET,
                op = "catalog::reload",
                "Discarded snapshot loaded across an invalidation"
            );
        }
        Ok(products)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SnapshotState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Map;
    use time::macros::datetime;

    fn product(name: &str, category: &str, stock: i64, available: bool) -> ProductRecord {
        ProductRecord {
            id: format!("product-{name}"),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: format!("Farm fresh {name}"),
            price_naira: 1_000,
            base_price_naira: 1_000,
            category: category.to_string(),
            stock,
            image: String::new(),
            images: Vec::new(),
            featured: false,
            available,
            created_at: Some(datetime!(2024-05-01 08:00 UTC)),
            updated_at: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ProductFilter::new(Some(String::new()), None, None, Some("  ".into()));
        assert_eq!(filter, ProductFilter::default());
        assert!(filter.matches(&product("Eggs", "Food", 0, false)));
    }

    #[test]
    fn available_means_flagged_and_in_stock() {
        let available = ProductFilter::new(None, None, Some(true), None);
        assert!(available.matches(&product("Eggs", "Food", 3, true)));
        assert!(!available.matches(&product("Eggs", "Food", 0, true)));
        assert!(!available.matches(&product("Eggs", "Food", 3, false)));

        let unavailable = ProductFilter::new(None, None, Some(false), None);
        assert!(unavailable.matches(&product("Eggs", "Food", 0, true)));
    }

    #[test]
    fn search_is_case_insensitive_over_name_description_and_category() {
        let filter = ProductFilter::new(None, None, None, Some("FRESH".into()));
        assert!(filter.matches(&product("Eggs", "Food", 1, true)));

        let filter = ProductFilter::new(None, None, None, Some("poultry".into()));
        assert!(filter.matches(&product("Hen", "Poultry", 1, true)));
        assert!(!filter.matches(&product("Eggs", "Food", 1, true)));
    }

    #[test]
    fn criteria_compose_with_and() {
        let filter = ProductFilter::new(Some("Food".into()), Some(false), None, Some("eggs".into()));
        assert!(filter.matches(&product("Eggs", "Food", 1, true)));
        assert!(!filter.matches(&product("Eggs", "Poultry", 1, true)));
        assert!(!filter.matches(&product("Milk", "Food", 1, true)));
    }
}
