use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use bazaar_core::customer::{CustomerFilter, CustomerStatus, CustomerUpdate, NewCustomer};
use bazaar_core::user::Role;
use bazaar_core::{Address, AppError, PageRequest, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, CreateCustomerRequest, CustomerResponse, DeletedResponse, ListCustomersQuery,
    UpdateCustomerRequest,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::routes::parse_opt;
use crate::state::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Manager];

#[utoipa::path(
    get,
    path = "/api/customers",
    params(ListCustomersQuery),
    responses(
        (status = 200, description = "One page of customers", body = ApiResponse<Vec<CustomerResponse>>),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<ListCustomersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let filter = CustomerFilter {
        status: parse_opt(query.status.as_deref())?,
        search: query.search,
    };
    let page = state
        .db
        .customer_repo()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(axum::Json(ApiResponse::<Vec<CustomerResponse>>::page(page)))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<CustomerResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let customer = NewCustomer {
        name: validate::required("Name", &body.name)?,
        email: validate::email(&body.email)?,
        phone: validate::optional(body.phone),
        address: body
            .address
            .map(|a| Address::from(a).normalized())
            .transpose()?,
        status: parse_opt(body.status.as_deref())?.unwrap_or(CustomerStatus::Active),
    };

    let customer = state.db.customer_repo().create(&customer).await?;
    tracing::info!(customer_id = %customer.id, "Customer created");

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::ok(CustomerResponse::from(customer))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer details", body = ApiResponse<CustomerResponse>),
        (status = 404, description = "Customer not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let customer = state
        .db
        .customer_repo()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    Ok(axum::Json(ApiResponse::ok(CustomerResponse::from(customer))))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<CustomerResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let update = CustomerUpdate {
        name: body
            .name
            .as_deref()
            .map(|n| validate::required("Name", n))
            .transpose()?,
        email: body.email.as_deref().map(validate::email).transpose()?,
        phone: validate::optional(body.phone),
        address: body
            .address
            .map(|a| Address::from(a).normalized())
            .transpose()?,
        status: parse_opt(body.status.as_deref())?,
    };

    let customer = state
        .db
        .customer_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    Ok(axum::Json(ApiResponse::ok(CustomerResponse::from(customer))))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted", body = ApiResponse<DeletedResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin])?;

    if !state.db.customer_repo().delete(id).await? {
        return Err(AppError::not_found("Customer", id).into());
    }

    tracing::info!(customer_id = %id, deleted_by = %current.id, "Customer deleted");
    Ok(axum::Json(ApiResponse::ok(DeletedResponse { id })))
}
