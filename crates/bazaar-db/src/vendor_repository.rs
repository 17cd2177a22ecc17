use bazaar_core::address::Address;
use bazaar_core::vendor::{NewVendor, Vendor, VendorFilter, VendorStatus, VendorUpdate};
use bazaar_core::{AppError, Page, PageRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::db_error;
use crate::pagination::{ListFilter, paginate, push_search};

/// Repository for marketplace vendors.
#[derive(Clone)]
pub struct VendorRepository {
    pool: Pool<Postgres>,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, vendor: &NewVendor) -> Result<Vendor, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            INSERT INTO vendors (name, email, phone, company_name, status, commission_rate, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&vendor.name)
        .bind(&vendor.email)
        .bind(&vendor.phone)
        .bind(&vendor.company_name)
        .bind(vendor.status.as_str())
        .bind(vendor.commission_rate)
        .bind(vendor.address.clone().map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Vendor>, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(r#"SELECT * FROM vendors WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM vendors WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(exists)
    }

    pub async fn list(
        &self,
        filter: &VendorFilter,
        page: PageRequest,
    ) -> Result<Page<Vendor>, AppError> {
        let rows = paginate::<VendorRow, _>(&self.pool, "vendors", filter, page).await?;
        Ok(rows.map(Into::into))
    }

    pub async fn update(&self, id: Uuid, update: &VendorUpdate) -> Result<Option<Vendor>, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            UPDATE vendors
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                company_name = COALESCE($5, company_name),
                status = COALESCE($6, status),
                commission_rate = COALESCE($7, commission_rate),
                address = COALESCE($8, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.company_name)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.commission_rate)
        .bind(update.address.clone().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    /// Returns `true` when a row was deleted. The vendor's products are kept
    /// and become unassigned.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM vendors WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl ListFilter for VendorFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            push_search(qb, &["name", "email", "company_name"], search);
        }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    company_name: Option<String>,
    status: String,
    commission_rate: Decimal,
    address: Option<Json<Address>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VendorRow> for Vendor {
    fn from(row: VendorRow) -> Self {
        Vendor {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company_name: row.company_name,
            status: row.status.parse().unwrap_or(VendorStatus::Pending),
            commission_rate: row.commission_rate,
            address: row.address.map(|a| a.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
