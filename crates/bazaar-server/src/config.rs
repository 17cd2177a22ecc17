use bazaar_core::AppError;

/// Listener settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    /// Read `BAZAAR_SERVER_PORT` (optional, defaults to 3000).
    pub fn from_env() -> Result<Self, AppError> {
        let port = match std::env::var("BAZAAR_SERVER_PORT") {
            Err(_) => 3000,
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid BAZAAR_SERVER_PORT '{raw}'"))
            })?,
        };
        Ok(Self { port })
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
