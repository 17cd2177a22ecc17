use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use bazaar_core::AppError;
use bazaar_core::user::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Reject the request with 403 unless the caller's role is in `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.role.is_allowed(allowed) {
            return Ok(());
        }
        tracing::warn!(user_id = %self.id, role = %self.role, "Role not permitted");
        Err(AppError::Forbidden(format!(
            "Role '{}' is not permitted to perform this action",
            self.role
        ))
        .into())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()).into())
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Malformed Authorization header. Expected: Bearer <token>".into(),
            )
        })
}

/// Middleware that verifies the bearer token and loads the caller.
///
/// The account must still exist and be active; its current role (not the
/// one in the token) is what route guards see.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.tokens.verify(bearer_token(request.headers())?)?;

    let user = state
        .db
        .user_repo()
        .get(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthorized("Account not found or disabled".into()))?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}
