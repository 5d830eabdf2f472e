//! Order placement and administration.
//!
//! Placing an order prices every line from the stored product, checks the client's total
//! against the recomputed one and takes the ordered quantities out of stock, all inside a
//! single document write.

use std::sync::Arc;

use serde_json::Map;
use thiserror::Error;
use tracing::info;

use crate::{
    application::{
        catalog::ProductCatalog,
        clock::Clock,
        notify::NotificationDispatcher,
        validation::{looks_like_email, missing, optional_text, require, require_text},
    },
    domain::{
        currency::{Currency, format_naira},
        document::Database,
        entities::{DEFAULT_ORDER_CURRENCY, OrderLine, OrderRecord, ProductRecord},
        types::{OrderStatus, OrderType},
    },
    infra::store::{JsonDocumentStore, StoreError},
};

const TARGET: &str = "poshpoule::orders";

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),
    #[error("Order not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct OrderLineCommand {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceOrderCommand {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub products: Option<Vec<OrderLineCommand>>,
    /// Naira total the client expects to pay.
    pub total_amount: Option<i64>,
    pub currency: Option<String>,
    pub order_type: Option<OrderType>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrderCommand {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

pub struct OrderService {
    store: Arc<JsonDocumentStore>,
    catalog: Arc<ProductCatalog>,
    notifier: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        store: Arc<JsonDocumentStore>,
        catalog: Arc<ProductCatalog>,
        notifier: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            notifier,
            clock,
        }
    }

    pub async fn place(&self, command: PlaceOrderCommand) -> Result<OrderRecord, OrderError> {
        let customer_name =
            require_text(command.customer_name, "customerName").map_err(OrderError::Validation)?;
        let customer_email = require_text(command.customer_email, "customerEmail")
            .map_err(OrderError::Validation)?;
        let customer_phone = require_text(command.customer_phone, "customerPhone")
            .map_err(OrderError::Validation)?;
        let lines = require(command.products, "products").map_err(OrderError::Validation)?;
        if lines.is_empty() {
            return Err(OrderError::Validation(
                "At least one product is required".to_string(),
            ));
        }
        let total_amount =
            require(command.total_amount, "totalAmount").map_err(OrderError::Validation)?;

        if !looks_like_email(&customer_email) {
            return Err(OrderError::Validation(
                "customerEmail must be a valid email address".to_string(),
            ));
        }
        let currency = match optional_text(command.currency) {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|err| OrderError::Validation(err.to_string()))?
                .code()
                .to_string(),
            None => DEFAULT_ORDER_CURRENCY.to_string(),
        };
        let order_type = command.order_type.unwrap_or_default();
        let delivery_address = optional_text(command.delivery_address);
        if order_type == OrderType::Delivery && delivery_address.is_none() {
            return Err(OrderError::Validation(missing("deliveryAddress")));
        }
        for line in &lines {
            if line.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "Quantity for product {} must be at least 1",
                    line.product_id
                )));
            }
        }

        let now = self.clock.now_utc();
        let order = self
            .store
            .mutate(|document| {
                let mut priced = Vec::with_capacity(lines.len());
                let mut computed_total: i64 = 0;

                for line in &lines {
                    let product = document
                        .products
                        .iter_mut()
                        .find(|product| product.id == line.product_id)
                        .ok_or_else(|| {
                            OrderError::Validation(format!("Unknown product {}", line.product_id))
                        })?;

                    if !product.available {
                        return Err(OrderError::Validation(format!(
                            "{} is not available",
                            product.name
                        )));
                    }
                    if product.stock < line.quantity {
                        return Err(OrderError::Validation(format!(
                            "Insufficient stock for {}: {} left",
                            product.name, product.stock
                        )));
                    }
                    product.stock -= line.quantity;

                    let priced_line = OrderLine {
                        product_id: product.id.clone(),
                        name: product.name.clone(),
                        quantity: line.quantity,
                        price_naira: product.price_naira,
                    };
                    computed_total = priced_line
                        .line_total()
                        .and_then(|subtotal| computed_total.checked_add(subtotal))
                        .ok_or_else(|| {
                            OrderError::Validation("Order total is too large".to_string())
                        })?;
                    priced.push(priced_line);
                }

                if computed_total != total_amount {
                    return Err(OrderError::Validation(format!(
                        "totalAmount {} does not match the order total {}",
                        format_naira(total_amount),
                        format_naira(computed_total)
                    )));
                }

                let order = OrderRecord {
                    id: document.next_order_id(),
                    customer_name,
                    customer_email,
                    customer_phone,
                    products: priced,
                    total_amount: computed_total,
                    currency,
                    status: OrderStatus::New,
                    order_type,
                    scheduled_date: optional_text(command.scheduled_date).unwrap_or_default(),
                    scheduled_time: optional_text(command.scheduled_time),
                    delivery_address,
                    notes: optional_text(command.notes),
                    created_at: Some(now),
                    updated_at: None,
                    extra: Map::new(),
                };
                document.orders.push(order.clone());
                Ok(order)
            })
            .await?;

        // Stock moved, so the list snapshot is stale.
        self.catalog.invalidate();
        info!(
            target = TARGET,
            op = "orders::place",
            result = "ok",
            id = %order.id,
            lines = order.products.len(),
            total = order.total_amount,
            "Order placed"
        );
        self.notifier.order_placed(&order);
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Result<Vec<OrderRecord>, OrderError> {
        let document = self.store.read().await?;
        let mut orders = document.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn get(&self, id: &str) -> Result<OrderRecord, OrderError> {
        let document = self.store.read().await?;
        document.find_order(id).cloned().ok_or(OrderError::NotFound)
    }

    /// Merge the supplied fields. Any status may follow any other; moving into `cancelled`
    /// returns the ordered quantities to stock and moving out of it takes them again.
    pub async fn update(
        &self,
        id: &str,
        command: UpdateOrderCommand,
    ) -> Result<OrderRecord, OrderError> {
        let now = self.clock.now_utc();
        let (order, stock_moved) = self
            .store
            .mutate(|document| {
                let Database {
                    orders, products, ..
                } = document;
                let order = orders
                    .iter_mut()
                    .find(|order| order.id == id)
                    .ok_or(OrderError::NotFound)?;
                let was_cancelled = order.status == OrderStatus::Cancelled;

                if let Some(status) = command.status {
                    order.status = status;
                }
                if let Some(order_type) = command.order_type {
                    order.order_type = order_type;
                }
                if let Some(date) = optional_text(command.scheduled_date) {
                    order.scheduled_date = date;
                }
                if command.scheduled_time.is_some() {
                    order.scheduled_time = optional_text(command.scheduled_time);
                }
                if command.delivery_address.is_some() {
                    order.delivery_address = optional_text(command.delivery_address);
                }
                if command.notes.is_some() {
                    order.notes = optional_text(command.notes);
                }
                if order.order_type == OrderType::Delivery && order.delivery_address.is_none() {
                    return Err(OrderError::Validation(missing("deliveryAddress")));
                }

                let stock_moved = match (was_cancelled, order.status == OrderStatus::Cancelled) {
                    (false, true) => return_to_stock(products, &order.products),
                    (true, false) => take_from_stock(products, &order.products)?,
                    _ => false,
                };
                order.updated_at = Some(now);
                Ok((order.clone(), stock_moved))
            })
            .await?;

        if stock_moved {
            self.catalog.invalidate();
        }
        info!(
            target = TARGET,
            op = "orders::update",
            result = "ok",
            id = %order.id,
            status = order.status.as_str(),
            stock_moved,
            "Order updated"
        );
        Ok(order)
    }
}

/// Adds each line's quantity back to its product. Lines whose product has since been
/// deleted are skipped. Returns whether any product changed.
fn return_to_stock(products: &mut [ProductRecord], lines: &[OrderLine]) -> bool {
    let mut moved = false;
    for line in lines {
        if let Some(product) = products.iter_mut().find(|p| p.id == line.product_id) {
            product.stock = product.stock.saturating_add(line.quantity);
            moved = true;
        }
    }
    moved
}

/// Takes each line's quantity off its product again, failing when the shelf no longer
/// holds enough.
fn take_from_stock(
    products: &mut [ProductRecord],
    lines: &[OrderLine],
) -> Result<bool, OrderError> {
    let mut moved = false;
    for line in lines {
        let Some(product) = products.iter_mut().find(|p| p.id == line.product_id) else {
            continue;
        };
        if product.stock < line.quantity {
            return Err(OrderError::Validation(format!(
                "Insufficient stock for {}: {} left",
                product.name, product.stock
            )));
        }
        product.stock -= line.quantity;
        moved = true;
    }
    Ok(moved)
}
