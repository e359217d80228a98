//! Dashboard endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::dashboard::DashboardStats};

use super::AuthenticatedUser;

/// Dashboard statistics: counts, recent borrowings, popular books
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}
