use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use bazaar_core::product::{NewProduct, ProductFilter, ProductStatus, ProductUpdate};
use bazaar_core::user::Role;
use bazaar_core::{AppError, PageRequest, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, CreateProductRequest, DeletedResponse, ListProductsQuery, ProductResponse,
    UpdateProductRequest,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::routes::parse_opt;
use crate::state::AppState;

const EDITORS: &[Role] = &[Role::Admin, Role::Manager];

/// Products may only point at vendors that exist.
async fn ensure_vendor(state: &AppState, vendor_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(vendor_id) = vendor_id
        && !state.db.vendor_repo().exists(vendor_id).await?
    {
        return Err(AppError::not_found("Vendor", vendor_id));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "One page of products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 400, description = "Invalid filter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        status: parse_opt(query.status.as_deref())?,
        vendor_id: query.vendor_id,
        min_price: query.min_price,
        max_price: query.max_price,
        low_stock: query.low_stock,
    };
    let page = state
        .db
        .product_repo()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(axum::Json(ApiResponse::<Vec<ProductResponse>>::page(page)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(EDITORS)?;

    let product = NewProduct {
        name: validate::required("Name", &body.name)?,
        description: validate::optional(body.description),
        sku: validate::required("SKU", &body.sku)?,
        category: validate::optional(body.category),
        price: validate::non_negative_price(body.price)?,
        stock: validate::non_negative_stock(body.stock.unwrap_or(0))?,
        status: parse_opt(body.status.as_deref())?.unwrap_or(ProductStatus::Active),
        vendor_id: body.vendor_id,
    };
    ensure_vendor(&state, product.vendor_id).await?;

    let product = state.db.product_repo().create(&product).await?;
    tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::ok(ProductResponse::from(product))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .db
        .product_repo()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    Ok(axum::Json(ApiResponse::ok(ProductResponse::from(product))))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Product or vendor not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(EDITORS)?;

    let update = ProductUpdate {
        name: body
            .name
            .as_deref()
            .map(|n| validate::required("Name", n))
            .transpose()?,
        description: validate::optional(body.description),
        sku: body
            .sku
            .as_deref()
            .map(|s| validate::required("SKU", s))
            .transpose()?,
        category: validate::optional(body.category),
        price: body.price.map(validate::non_negative_price).transpose()?,
        stock: body.stock.map(validate::non_negative_stock).transpose()?,
        status: parse_opt(body.status.as_deref())?,
        vendor_id: body.vendor_id,
    };
    ensure_vendor(&state, update.vendor_id).await?;

    let product = state
        .db
        .product_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    tracing::info!(product_id = %id, updated_by = %current.id, "Product updated");
    Ok(axum::Json(ApiResponse::ok(ProductResponse::from(product))))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<DeletedResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin])?;

    if !state.db.product_repo().delete(id).await? {
        return Err(AppError::not_found("Product", id).into());
    }

    tracing::info!(product_id = %id, deleted_by = %current.id, "Product deleted");
    Ok(axum::Json(ApiResponse::ok(DeletedResponse { id })))
}
