use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use bazaar_core::order::{Order, OrderFilter, OrderLine, OrderStatus, PlaceOrder};
use bazaar_core::user::Role;
use bazaar_core::{AppError, PageRequest, validate};

use crate::auth::CurrentUser;
use crate::dto::{
    ApiResponse, CreateOrderRequest, DeletedResponse, ListOrdersQuery, OrderResponse,
    UpdateOrderRequest,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::routes::parse_opt;
use crate::state::AppState;

/// Load an order the caller may see. Plain users only see their own; other
/// users' orders are reported as missing.
async fn visible_order(state: &AppState, current: &CurrentUser, id: Uuid) -> Result<Order, AppError> {
    state
        .db
        .order_repo()
        .get(id)
        .await?
        .filter(|order| current.role.is_staff() || order.user_id == Some(current.id))
        .ok_or_else(|| AppError::not_found("Order", id))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "One page of orders", body = ApiResponse<Vec<OrderResponse>>),
        (status = 400, description = "Invalid filter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = if current.role.is_staff() {
        query.user_id
    } else {
        Some(current.id)
    };

    let filter = OrderFilter {
        status: parse_opt(query.status.as_deref())?,
        user_id,
        customer_id: query.customer_id,
        created_from: query.from,
        created_to: query.to,
    };
    let page = state
        .db
        .order_repo()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(axum::Json(ApiResponse::<Vec<OrderResponse>>::page(page)))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid items or inactive product", body = crate::dto::ErrorResponse),
        (status = 404, description = "Product or customer not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Insufficient stock", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PlaceOrder {
        customer_id: body.customer_id,
        items: body
            .items
            .into_iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect(),
        shipping_address: body.shipping_address.map(Into::into),
        notes: body.notes,
    };

    let order = state.orders().place_order(Some(current.id), request).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::ok(OrderResponse::from(order))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = visible_order(&state, &current, id).await?;
    Ok(axum::Json(ApiResponse::ok(OrderResponse::from(order))))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Nothing to update or unknown status", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Illegal status transition", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin, Role::Manager])?;

    let status: Option<OrderStatus> = parse_opt(body.status.as_deref())?;
    if status.is_none() && body.notes.is_none() {
        return Err(AppError::Validation("Provide a status or notes to update".into()).into());
    }

    let mut order = None;
    if let Some(status) = status {
        order = Some(state.orders().change_status(id, status).await?);
    }
    if let Some(notes) = body.notes {
        let notes = validate::optional(Some(notes));
        order = state.db.order_repo().update_notes(id, notes.as_deref()).await?;
    }
    let order = order.ok_or_else(|| AppError::not_found("Order", id))?;

    tracing::info!(order_id = %id, updated_by = %current.id, "Order updated");
    Ok(axum::Json(ApiResponse::ok(OrderResponse::from(order))))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted; stock is not returned", body = ApiResponse<DeletedResponse>),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin])?;

    if !state.db.order_repo().delete(id).await? {
        return Err(AppError::not_found("Order", id).into());
    }

    tracing::info!(order_id = %id, deleted_by = %current.id, "Order deleted");
    Ok(axum::Json(ApiResponse::ok(DeletedResponse { id })))
}
