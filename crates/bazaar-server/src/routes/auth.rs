use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use bazaar_core::auth::{hash_password, verify_dummy_password, verify_password};
use bazaar_core::user::{NewUser, Role, User, UserUpdate};
use bazaar_core::{AppError, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UserResponse,
};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token = state.tokens.issue(&user)?;
    Ok(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens.ttl().num_seconds(),
        user: user.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate::required("Name", &body.name)?;
    let email = validate::email(&body.email)?;
    validate::password(&body.password)?;

    let user = state
        .db
        .user_repo()
        .create(&NewUser {
            name,
            email,
            password_hash: hash_password(&body.password)?,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    let response = auth_response(&state, user)?;
    Ok((StatusCode::CREATED, axum::Json(ApiResponse::ok(response))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let email = body.email.trim().to_lowercase();
    let repo = state.db.user_repo();
    let Some(user) = repo.find_by_email(&email).await? else {
        verify_dummy_password(&body.password);
        return Err(invalid().into());
    };

    if !verify_password(&user.password_hash, &body.password)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(invalid().into());
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".into()).into());
    }

    repo.record_login(user.id).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    let response = auth_response(&state, user)?;
    Ok(axum::Json(ApiResponse::ok(response)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated account", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_repo()
        .get(current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User", current.id))?;

    Ok(axum::Json(ApiResponse::ok(UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<UserResponse>),
        (status = 400, description = "Current password is wrong or new one too short", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = state.db.user_repo();
    let user = repo
        .get(current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User", current.id))?;

    if !verify_password(&user.password_hash, &body.current_password)? {
        return Err(AppError::Validation("Current password is incorrect".into()).into());
    }
    validate::password(&body.new_password)?;

    let update = UserUpdate {
        password_hash: Some(hash_password(&body.new_password)?),
        ..Default::default()
    };
    let user = repo
        .update(current.id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", current.id))?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(axum::Json(ApiResponse::ok(UserResponse::from(user))))
}
