use bazaar_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::analytics_repository::AnalyticsRepository;
use crate::config::DatabaseConfig;
use crate::customer_repository::CustomerRepository;
use crate::order_repository::OrderRepository;
use crate::product_repository::ProductRepository;
use crate::user_repository::UserRepository;
use crate::vendor_repository::VendorRepository;

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn product_repo(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn order_repo(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn customer_repo(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn vendor_repo(&self) -> VendorRepository {
        VendorRepository::new(self.pool.clone())
    }

    pub fn analytics_repo(&self) -> AnalyticsRepository {
        AnalyticsRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// SQLSTATE for a value too large for its `NUMERIC` column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Translate a sqlx error into the domain error callers see.
///
/// Constraint violations are the caller's fault and keep a readable message;
/// everything else is an opaque database failure.
pub(crate) fn db_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::Conflict(duplicate_message(db.constraint()));
        }
        if db.is_foreign_key_violation() {
            return AppError::Validation("Referenced record does not exist".into());
        }
        if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return AppError::Validation("Numeric value out of range".into());
        }
        if db.is_check_violation() {
            return AppError::Validation(format!(
                "Value rejected by constraint {}",
                db.constraint().unwrap_or("unknown")
            ));
        }
    }
    AppError::DatabaseError(e.to_string())
}

fn duplicate_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("email") => "Email is already in use".into(),
        Some(c) if c.contains("sku") => "SKU is already in use".into(),
        Some(c) if c.contains("order_number") => "Order number collision, retry the request".into(),
        _ => "Record already exists".into(),
    }
}
