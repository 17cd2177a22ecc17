use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use bazaar_core::auth::hash_password;
use bazaar_core::user::{NewUser, Role, UserFilter, UserUpdate};
use bazaar_core::{AppError, PageRequest, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, CreateUserRequest, DeletedResponse, ListUsersQuery, UpdateUserRequest,
    UserResponse,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::routes::parse_opt;
use crate::state::AppState;

const ALLOWED: &[Role] = &[Role::Admin];

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(ALLOWED)?;

    let filter = UserFilter {
        role: parse_opt(query.role.as_deref())?,
        is_active: query.is_active,
        search: query.search,
    };
    let page = state
        .db
        .user_repo()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(axum::Json(ApiResponse::<Vec<UserResponse>>::page(page)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(ALLOWED)?;

    validate::password(&body.password)?;
    let new_user = NewUser {
        name: validate::required("Name", &body.name)?,
        email: validate::email(&body.email)?,
        password_hash: hash_password(&body.password)?,
        role: parse_opt(body.role.as_deref())?.unwrap_or(Role::User),
    };

    let user = state.db.user_repo().create(&new_user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, created_by = %current.id, "User created");

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::ok(UserResponse::from(user))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(ALLOWED)?;

    let user = state
        .db
        .user_repo()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    Ok(axum::Json(ApiResponse::ok(UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(ALLOWED)?;

    let password_hash = match body.password.as_deref() {
        Some(password) => {
            validate::password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };
    let update = UserUpdate {
        name: body
            .name
            .as_deref()
            .map(|n| validate::required("Name", n))
            .transpose()?,
        email: body.email.as_deref().map(validate::email).transpose()?,
        password_hash,
        role: parse_opt(body.role.as_deref())?,
        is_active: body.is_active,
    };

    let user = state
        .db
        .user_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(user_id = %id, updated_by = %current.id, "User updated");
    Ok(axum::Json(ApiResponse::ok(UserResponse::from(user))))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeletedResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Cannot delete own account", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(ALLOWED)?;

    if id == current.id {
        return Err(AppError::Conflict("You cannot delete your own account".into()).into());
    }
    if !state.db.user_repo().delete(id).await? {
        return Err(AppError::not_found("User", id).into());
    }

    tracing::info!(user_id = %id, deleted_by = %current.id, "User deleted");
    Ok(axum::Json(ApiResponse::ok(DeletedResponse { id })))
}
