//! Product create, update and delete.

use std::sync::Arc;

use serde_json::Map;
use thiserror::Error;
use tracing::info;

use crate::{
    application::{
        catalog::ProductCatalog,
        clock::Clock,
        validation::{non_negative, optional_text, require, require_text},
    },
    domain::{entities::ProductRecord, slug::ensure_url_safe},
    infra::store::{JsonDocumentStore, StoreError},
};

pub const DEFAULT_PRODUCT_IMAGE: &str = "/optimized/images/products/eggs/organicFarmEggs.webp";

const TARGET: &str = "poshpoule::products";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),
    #[error("A product with slug `{0}` already exists")]
    DuplicateSlug(String),
    #[error("Product not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateProductCommand {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_naira: Option<i64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub available: Option<bool>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductCommand {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_naira: Option<i64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub available: Option<bool>,
}

pub struct ProductService {
    store: Arc<JsonDocumentStore>,
    catalog: Arc<ProductCatalog>,
    clock: Arc<dyn Clock>,
}

impl ProductService {
    pub fn new(
        store: Arc<JsonDocumentStore>,
        catalog: Arc<ProductCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    pub async fn create(&self, command: CreateProductCommand) -> Result<ProductRecord, ProductError> {
        let name = require_text(command.name, "name").map_err(ProductError::Validation)?;
        let slug = require_text(command.slug, "slug").map_err(ProductError::Validation)?;
        let description =
            require_text(command.description, "description").map_err(ProductError::Validation)?;
        let price_naira = require(command.price_naira, "priceNaira")
            .and_then(|price| non_negative(price, "priceNaira"))
            .map_err(ProductError::Validation)?;
        let category =
            require_text(command.category, "category").map_err(ProductError::Validation)?;
        let stock = require(command.stock, "stock")
            .and_then(|stock| non_negative(stock, "stock"))
            .map_err(ProductError::Validation)?;
        ensure_url_safe(&slug).map_err(|err| ProductError::Validation(err.to_string()))?;

        let now = self.clock.now_utc();
        let product = self
            .store
            .mutate(|document| {
                if document.find_product(&slug).is_some() {
                    return Err(ProductError::DuplicateSlug(slug.clone()));
                }

                let product = ProductRecord {
                    id: document.next_product_id(),
                    name,
                    slug: slug.clone(),
                    description,
                    price_naira,
                    base_price_naira: price_naira,
                    category,
                    stock,
                    image: optional_text(command.image)
                        .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()),
                    images: command.images.unwrap_or_default(),
                    featured: command.featured.unwrap_or(false),
                    available: command.available.unwrap_or(true),
                    created_at: Some(now),
                    updated_at: None,
                    extra: Map::new(),
                };
                document.products.push(product.clone());
                Ok(product)
            })
            .await?;

        self.catalog.invalidate();
        info!(
            target = TARGET,
            op = "products::create",
            result = "ok",
            id = %product.id,
            slug = %product.slug,
            "Product created"
        );
        Ok(product)
    }

    pub async fn update(
        &self,
        slug: &str,
        command: UpdateProductCommand,
    ) -> Result<ProductRecord, ProductError> {
        let new_slug = match command.slug {
            Some(value) => {
                let value = require_text(Some(value), "slug").map_err(ProductError::Validation)?;
                ensure_url_safe(&value).map_err(|err| ProductError::Validation(err.to_string()))?;
                Some(value)
            }
            None => None,
        };
        if let Some(price) = command.price_naira {
            non_negative(price, "priceNaira").map_err(ProductError::Validation)?;
        }
        if let Some(stock) = command.stock {
            non_negative(stock, "stock").map_err(ProductError::Validation)?;
        }

        let now = self.clock.now_utc();
        let product = self
            .store
            .mutate(|document| {
                let index = document
                    .products
                    .iter()
                    .position(|product| product.slug == slug)
                    .ok_or(ProductError::NotFound)?;

                if let Some(candidate) = new_slug.as_deref() {
                    let taken = document
                        .products
                        .iter()
                        .enumerate()
                        .any(|(other, product)| other != index && product.slug == candidate);
                    if taken {
                        return Err(ProductError::DuplicateSlug(candidate.to_string()));
                    }
                }

                let product = &mut document.products[index];
                if let Some(value) = optional_text(command.name) {
                    product.name = value;
                }
                if let Some(value) = new_slug {
                    product.slug = value;
                }
                if let Some(value) = optional_text(command.description) {
                    product.description = value;
                }
                if let Some(value) = command.price_naira {
                    product.price_naira = value;
                }
                if let Some(value) = optional_text(command.category) {
                    product.category = value;
                }
                if let Some(value) = command.stock {
                    product.stock = value;
                }
                if let Some(value) = optional_text(command.image) {
                    product.image = value;
                }
                if let Some(value) = command.images {
                    product.images = value;
                }
                if let Some(value) = command.featured {
                    product.featured = value;
                }
                if let Some(value) = command.available {
                    product.available = value;
                }
                product.updated_at = Some(now);
                Ok(product.clone())
            })
            .await?;

        self.catalog.invalidate();
        info!(
            target = TARGET,
            op = "products::update",
            result = "ok",
            id = %product.id,
            slug = %product.slug,
            "Product created"
        );
        Ok(product)
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ProductError> {
        let removed = self
            .store
            .mutate(|document| {
                let index = document
                    .products
                    .iter()
                    .position(|product| product.slug == slug)
                    .ok_or(ProductError::NotFound)?;
                Ok::<_, ProductError>(document.products.remove(index))
            })
            .await?;

        self.catalog.invalidate();
        info!(
            target = TARGET,
            op = "products::delete",
            result = "ok",
            id = %removed.id,
            slug = %removed.slug,
            "Product deleted"
        );
        Ok(())
    }
}
