use bazaar_core::product::{NewProduct, Product, ProductFilter, ProductStatus, ProductUpdate};
use bazaar_core::{AppError, Page, PageRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::db_error;
use crate::pagination::{ListFilter, paginate, push_search};

/// Repository for the product catalog.
#[derive(Clone)]
pub struct ProductRepository {
    pool: Pool<Postgres>,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, description, sku, category, price, stock, status, vendor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.status.as_str())
        .bind(product.vendor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(r#"SELECT * FROM products WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, AppError> {
        let rows = paginate::<ProductRow, _>(&self.pool, "products", filter, page).await?;
        Ok(rows.map(Into::into))
    }

    /// Apply a partial update. Returns `None` when the product does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                sku = COALESCE($4, sku),
                category = COALESCE($5, category),
                price = COALESCE($6, price),
                stock = COALESCE($7, stock),
                status = COALESCE($8, status),
                vendor_id = COALESCE($9, vendor_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.sku)
        .bind(&update.category)
        .bind(update.price)
        .bind(update.stock)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.vendor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    /// Returns `true` when a row was deleted. Past order lines keep their
    /// name and price snapshots.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM products WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl ListFilter for ProductFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            push_search(qb, &["name", "sku"], search);
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            qb.push(" AND LOWER(category) = LOWER(")
                .push_bind(category.trim().to_string())
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(vendor_id) = self.vendor_id {
            qb.push(" AND vendor_id = ").push_bind(vendor_id);
        }
        if let Some(min_price) = self.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = self.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(threshold) = self.low_stock {
            qb.push(" AND stock <= ").push_bind(threshold);
        }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    sku: String,
    category: Option<String>,
    price: Decimal,
    stock: i32,
    status: String,
    vendor_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            sku: row.sku,
            category: row.category,
            price: row.price,
            stock: row.stock,
            status: row.status.parse().unwrap_or(ProductStatus::Inactive),
            vendor_id: row.vendor_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
