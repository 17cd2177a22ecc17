//! Password hashing and bearer-token issuing/verification.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::user::{Role, User};

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Hash a password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Check `password` against a stored hash. A mismatch is `Ok(false)`.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {e}"
        ))),
    }
}

/// Checked on logins for unknown emails, so they cost as much as a real one.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("bazaar-dummy-password").ok());

/// Verify `password` against a fixed hash and discard the outcome.
pub fn verify_dummy_password(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(hash, password);
    }
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: TimeDelta,
}

impl TokenConfig {
    /// Read configuration from environment variables.
    ///
    /// - `BAZAAR_JWT_SECRET` (required, at least 32 bytes)
    /// - `BAZAAR_TOKEN_TTL_HOURS` (optional, defaults to 24)
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("BAZAAR_JWT_SECRET").map_err(|_| {
            AppError::ConfigError("BAZAAR_JWT_SECRET not set. Required to sign tokens.".into())
        })?;

        let ttl_hours = match std::env::var("BAZAAR_TOKEN_TTL_HOURS") {
            Err(_) => 24,
            Ok(raw) => {
                let parsed: i64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid BAZAAR_TOKEN_TTL_HOURS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed < 1 {
                    return Err(AppError::ConfigError(
                        "BAZAAR_TOKEN_TTL_HOURS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Self::new(secret, TimeDelta::hours(ttl_hours))
    }

    pub fn new(secret: impl Into<String>, ttl: TimeDelta) -> Result<Self, AppError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::ConfigError(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self { secret, ttl })
    }
}

/// Signs and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: config.ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `user`, valid for the configured TTL.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".into())
                }
                _ => AppError::Unauthorized("Invalid token".into()),
            })
    }
}
