use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::order::{NewOrder, NewOrderItem, Order, OrderLine, OrderStatus, PlaceOrder, order_number};
use crate::order_store::OrderStore;
use crate::validate;

/// Order placement and status changes on top of an [`OrderStore`].
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate, price and persist a new order.
    ///
    /// `placed_by` is the authenticated account placing the order.
    pub async fn place_order(
        &self,
        placed_by: Option<Uuid>,
        request: PlaceOrder,
    ) -> Result<Order, AppError> {
        let lines = merge_lines(&request.items)?;

        if let Some(customer_id) = request.customer_id
            && !self.store.customer_exists(customer_id).await?
        {
            return Err(AppError::not_found("Customer", customer_id));
        }

        let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
        let products: HashMap<Uuid, _> = self
            .store
            .products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in &lines {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| AppError::not_found("Product", line.product_id))?;

            if !product.is_orderable() {
                return Err(AppError::Validation(format!(
                    "Product {} is not available for ordering",
                    product.name
                )));
            }
            if product.stock < line.quantity {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            let line_total = product.price * Decimal::from(line.quantity);
            total += line_total;
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                line_total,
            });
        }

        validate::within_max_amount("Order total", total)?;

        let shipping_address = request
            .shipping_address
            .map(|a| a.normalized())
            .transpose()?;

        let order = NewOrder {
            order_number: order_number(Uuid::new_v4(), Utc::now()),
            user_id: placed_by,
            customer_id: request.customer_id,
            total_amount: total,
            shipping_address,
            notes: validate::optional(request.notes),
            items,
        };

        let order = self.store.insert_order(order).await?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    /// Move an order to `next`, restocking its items on cancellation.
    pub async fn change_status(&self, id: Uuid, next: OrderStatus) -> Result<Order, AppError> {
        let order = self
            .store
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;

        if order.status == next {
            return Ok(order);
        }
        if !order.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot change order {} from {} to {}",
                order.order_number, order.status, next
            )));
        }

        let restock = next == OrderStatus::Cancelled;
        let updated = self
            .store
            .transition_status(id, order.status, next, restock)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Order {} was modified concurrently, retry the request",
                    order.order_number
                ))
            })?;

        tracing::info!(
            order_id = %id,
            from = %order.status,
            to = %next,
            restocked = restock,
            "Order status changed"
        );
        Ok(updated)
    }
}

/// Reject empty orders and non-positive quantities; sum duplicate products
/// into one line, keeping first-seen order.
fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "Order must contain at least one item".into(),
        ));
    }

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Quantity for product {} must be at least 1",
                line.product_id
            )));
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(
                    || AppError::Validation("Requested quantity is too large".into()),
                )?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}
