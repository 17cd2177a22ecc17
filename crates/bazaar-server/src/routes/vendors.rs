use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use bazaar_core::user::Role;
use bazaar_core::vendor::{
    DEFAULT_COMMISSION_RATE, NewVendor, VendorFilter, VendorStatus, VendorUpdate,
};
use bazaar_core::{Address, AppError, PageRequest, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, CreateVendorRequest, DeletedResponse, ListVendorsQuery, UpdateVendorRequest,
    VendorResponse,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::routes::parse_opt;
use crate::state::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Manager];

#[utoipa::path(
    get,
    path = "/api/vendors",
    params(ListVendorsQuery),
    responses(
        (status = 200, description = "One page of vendors", body = ApiResponse<Vec<VendorResponse>>),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<ListVendorsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let filter = VendorFilter {
        status: parse_opt(query.status.as_deref())?,
        search: query.search,
    };
    let page = state
        .db
        .vendor_repo()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(axum::Json(ApiResponse::<Vec<VendorResponse>>::page(page)))
}

#[utoipa::path(
    post,
    path = "/api/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let vendor = NewVendor {
        name: validate::required("Name", &body.name)?,
        email: validate::email(&body.email)?,
        phone: validate::optional(body.phone),
        company_name: validate::optional(body.company_name),
        status: parse_opt(body.status.as_deref())?.unwrap_or(VendorStatus::Pending),
        commission_rate: validate::percentage(
            "Commission rate",
            body.commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE),
        )?,
        address: body
            .address
            .map(|a| Address::from(a).normalized())
            .transpose()?,
    };

    let vendor = state.db.vendor_repo().create(&vendor).await?;
    tracing::info!(vendor_id = %vendor.id, "Vendor created");

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::ok(VendorResponse::from(vendor))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor details", body = ApiResponse<VendorResponse>),
        (status = 404, description = "Vendor not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let vendor = state
        .db
        .vendor_repo()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor", id))?;

    Ok(axum::Json(ApiResponse::ok(VendorResponse::from(vendor))))
}

#[utoipa::path(
    put,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(STAFF)?;

    let update = VendorUpdate {
        name: body
            .name
            .as_deref()
            .map(|n| validate::required("Name", n))
            .transpose()?,
        email: body.email.as_deref().map(validate::email).transpose()?,
        phone: validate::optional(body.phone),
        company_name: validate::optional(body.company_name),
        status: parse_opt(body.status.as_deref())?,
        commission_rate: body
            .commission_rate
            .map(|rate| validate::percentage("Commission rate", rate))
            .transpose()?,
        address: body
            .address
            .map(|a| Address::from(a).normalized())
            .transpose()?,
    };

    let vendor = state
        .db
        .vendor_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor", id))?;

    tracing::info!(vendor_id = %id, status = %vendor.status, "Vendor updated");
    Ok(axum::Json(ApiResponse::ok(VendorResponse::from(vendor))))
}

#[utoipa::path(
    delete,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deleted; its products are unlinked", body = ApiResponse<DeletedResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin])?;

    if !state.db.vendor_repo().delete(id).await? {
        return Err(AppError::not_found("Vendor", id).into());
    }

    tracing::info!(vendor_id = %id, deleted_by = %current.id, "Vendor deleted");
    Ok(axum::Json(ApiResponse::ok(DeletedResponse { id })))
}
