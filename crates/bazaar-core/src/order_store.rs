use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::order::{NewOrder, Order, OrderStatus};
use crate::product::Product;

/// Persistence needed by [`OrderService`](crate::order_service::OrderService).
///
/// Implementations must make `insert_order` and `transition_status` atomic:
/// either every stock change and the order row land together, or none do.
pub trait OrderStore: Send + Sync + Clone {
    /// Load the given products. Unknown ids are simply absent from the result.
    fn products_by_ids(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Product>, AppError>> + Send;

    fn customer_exists(&self, id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Insert the order and its items, decrementing stock for every item.
    ///
    /// Fails with [`AppError::InsufficientStock`] and persists nothing when
    /// any product no longer covers its quantity.
    fn insert_order(&self, order: NewOrder)
    -> impl Future<Output = Result<Order, AppError>> + Send;

    fn get_order(&self, id: Uuid) -> impl Future<Output = Result<Option<Order>, AppError>> + Send;

    /// Move an order from `from` to `to`, returning `None` when the order is
    /// no longer in `from`. When `restock` is set the item quantities are
    /// returned to their products in the same transaction.
    fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        restock: bool,
    ) -> impl Future<Output = Result<Option<Order>, AppError>> + Send;
}
