use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::DashboardSummary,
    error::AppResult,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Entity counts, total revenue, recent orders and books", body = ApiResponse<DashboardSummary>)
    ),
    tag = "Dashboard"
)]
pub async fn summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let resp = dashboard_service::summary(&state).await?;
    Ok(Json(resp))
}
