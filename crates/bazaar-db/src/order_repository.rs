use std::collections::HashMap;

use bazaar_core::address::Address;
use bazaar_core::order::{NewOrder, Order, OrderFilter, OrderItem, OrderStatus};
use bazaar_core::order_store::OrderStore;
use bazaar_core::product::Product;
use bazaar_core::{AppError, Page, PageRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::db_error;
use crate::pagination::{ListFilter, paginate};
use crate::product_repository::ProductRow;

/// PostgreSQL-backed order storage.
///
/// Stock changes and the order rows they belong to are written in one
/// transaction; each decrement is conditional on `stock >= quantity`, so
/// concurrent orders for the same product cannot oversell it.
#[derive(Clone)]
pub struct OrderRepository {
    pool: Pool<Postgres>,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(r#"SELECT * FROM orders WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut items = fetch_items(&self.pool, &[row.id]).await?;
        let items = items.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_order(items)))
    }

    pub async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>, AppError> {
        let rows = paginate::<OrderRow, _>(&self.pool, "orders", filter, page).await?;
        let ids: Vec<Uuid> = rows.items.iter().map(|r| r.id).collect();
        let mut items = fetch_items(&self.pool, &ids).await?;

        Ok(rows.map(|row| {
            let row_items = items.remove(&row.id).unwrap_or_default();
            row.into_order(row_items)
        }))
    }

    /// Replace the free-text notes. Returns `None` when the order does not exist.
    pub async fn update_notes(&self, id: Uuid, notes: Option<&str>) -> Result<Option<Order>, AppError> {
        let updated = sqlx::query(r#"UPDATE orders SET notes = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(notes)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Returns `true` when a row was deleted. Stock is left as is.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM orders WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl ListFilter for OrderFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(user_id) = self.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(customer_id) = self.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(from) = self.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = self.created_to {
            qb.push(" AND created_at <= ").push_bind(to);
        }
    }
}

/// Load the items of `order_ids`, grouped by order and in line order.
async fn fetch_items<'e, E>(
    executor: E,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderItem>>, AppError>
where
    E: PgExecutor<'e>,
{
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT * FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY order_id, line_no
        "#,
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await
    .map_err(db_error)?;

    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.into());
    }
    Ok(grouped)
}

impl OrderStore for OrderRepository {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, ProductRow>(r#"SELECT * FROM products WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn customer_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(exists)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Lock rows in a fixed order so concurrent orders cannot deadlock.
        let mut by_product: Vec<_> = order.items.iter().collect();
        by_product.sort_by_key(|item| item.product_id);

        for item in by_product {
            let decremented: Option<(i32,)> = sqlx::query_as(
                r#"
                UPDATE products
                SET stock = stock - $2, updated_at = NOW()
                WHERE id = $1 AND stock >= $2
                RETURNING stock
                "#,
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;

            if decremented.is_none() {
                let current: Option<(i32,)> =
                    sqlx::query_as(r#"SELECT stock FROM products WHERE id = $1"#)
                        .bind(item.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(db_error)?;

                tracing::warn!(
                    product_id = %item.product_id,
                    requested = item.quantity,
                    "Stock decrement failed, rolling back order"
                );
                // Dropping `tx` rolls back the decrements made so far.
                return Err(match current {
                    Some((available,)) => AppError::InsufficientStock {
                        product: item.product_name.clone(),
                        available,
                        requested: item.quantity,
                    },
                    None => AppError::not_found("Product", item.product_id),
                });
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (order_number, user_id, customer_id, total_amount, shipping_address, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.customer_id)
        .bind(order.total_amount)
        .bind(order.shipping_address.clone().map(Json))
        .bind(&order.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        let mut items = Vec::with_capacity(order.items.len());
        for (line_no, item) in order.items.iter().enumerate() {
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                r#"
                INSERT INTO order_items (order_id, line_no, product_id, product_name, unit_price, quantity, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(row.id)
            .bind(line_no as i32)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;
            items.push(item_row.into());
        }

        tx.commit().await.map_err(db_error)?;
        Ok(row.into_order(items))
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        self.get(id).await
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        restock: bool,
    ) -> Result<Option<Order>, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = fetch_items(&mut *tx, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        if restock {
            let mut returned: Vec<(Uuid, i32)> = items
                .iter()
                .filter_map(|item| item.product_id.map(|pid| (pid, item.quantity)))
                .collect();
            returned.sort_by_key(|(pid, _)| *pid);

            for (product_id, quantity) in returned {
                sqlx::query(
                    r#"UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1"#,
                )
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            }
        }

        tx.commit().await.map_err(db_error)?;
        Ok(Some(row.into_order(items)))
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Option<Uuid>,
    customer_id: Option<Uuid>,
    status: String,
    total_amount: Decimal,
    shipping_address: Option<Json<Address>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            customer_id: self.customer_id,
            status: self.status.parse().unwrap_or(OrderStatus::Pending),
            total_amount: self.total_amount,
            shipping_address: self.shipping_address.map(|a| a.0),
            notes: self.notes,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Option<Uuid>,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
    line_total: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            line_total: row.line_total,
        }
    }
}
