use std::{sync::Arc, time::Duration};

use crate::application::{
    catalog::ProductCatalog, clock::Clock, currency::CurrencyService, leads::LeadService,
    notify::NotificationDispatcher, orders::OrderService, products::ProductService,
};
use crate::infra::http::preference::{CurrencyPreference, QueryOrCookie};
use crate::infra::store::JsonDocumentStore;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<JsonDocumentStore>,
    pub catalog: Arc<ProductCatalog>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub leads: Arc<LeadService>,
    pub currencies: Arc<CurrencyService>,
    pub preference: Arc<dyn CurrencyPreference>,
}

impl ApiState {
    /// Wire every service around one store, catalog and clock.
    pub fn assemble(
        store: Arc<JsonDocumentStore>,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
        notifier: NotificationDispatcher,
    ) -> Self {
        let catalog = Arc::new(ProductCatalog::new(store.clone(), cache_ttl, clock.clone()));
        let products = Arc::new(ProductService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
        ));
        let orders = Arc::new(OrderService::new(
            store.clone(),
            catalog.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let leads = Arc::new(LeadService::new(store.clone(), notifier, clock));
        let currencies = Arc::new(CurrencyService::new(store.clone()));

        Self {
            store,
            catalog,
            products,
            orders,
            leads,
            currencies,
            preference: Arc::new(QueryOrCookie),
        }
    }
}
