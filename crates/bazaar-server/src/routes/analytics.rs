use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use bazaar_core::analytics::DashboardQuery;
use bazaar_core::user::Role;

use crate::auth::CurrentUser;
use crate::dto::{ApiResponse, DashboardParams, DashboardResponse};
use crate::error::ApiError;
use crate::extract::Query;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    params(DashboardParams),
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<DashboardResponse>),
        (status = 403, description = "Admins and managers only", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "analytics"
)]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    current.require(&[Role::Admin, Role::Manager])?;

    let query = DashboardQuery::new(params.low_stock_threshold, params.top_products, params.months);
    let stats = state.db.analytics_repo().dashboard(query).await?;

    Ok(axum::Json(ApiResponse::ok(DashboardResponse::from(stats))))
}
