use bazaar_core::address::Address;
use bazaar_core::customer::{Customer, CustomerFilter, CustomerStatus, CustomerUpdate, NewCustomer};
use bazaar_core::{AppError, Page, PageRequest};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::db_error;
use crate::pagination::{ListFilter, paginate, push_search};

/// Repository for storefront customers.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: Pool<Postgres>,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, AppError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            INSERT INTO customers (name, email, phone, address, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.address.clone().map(Json))
        .bind(customer.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query_as::<_, CustomerRow>(r#"SELECT * FROM customers WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, AppError> {
        let rows = paginate::<CustomerRow, _>(&self.pool, "customers", filter, page).await?;
        Ok(rows.map(Into::into))
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: &CustomerUpdate,
    ) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.address.clone().map(Json))
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM customers WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl ListFilter for CustomerFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            push_search(qb, &["name", "email"], search);
        }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<Json<Address>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address.map(|a| a.0),
            status: row.status.parse().unwrap_or(CustomerStatus::Active),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
