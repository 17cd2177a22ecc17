use std::time::Duration;

use bazaar_core::AppError;

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        let url = std::env::var("DATABASE_URL").map_err(|_| {
            AppError::ConfigError("DATABASE_URL not set. Required for database operations.".into())
        })?;

        Ok(Self {
            url,
            max_connections: positive_var("DATABASE_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(positive_var(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                5,
            )?
            .into()),
        })
    }
}

fn positive_var(name: &str, default: u32) -> Result<u32, AppError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(0) => Err(AppError::ConfigError(format!("{name} must be at least 1"))),
        Ok(value) => Ok(value),
        Err(_) => Err(AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a positive integer"
        ))),
    }
}
