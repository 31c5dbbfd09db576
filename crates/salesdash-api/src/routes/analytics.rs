//! Analytics endpoints - dashboard aggregates over non-deleted sales

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use salesdash_core::reports::{self, MonthlySales, OverviewStats};
use salesdash_core::CustomerSummary;

use crate::{session_user, ApiResult, AppState};

/// Total revenue, sale count, and active customer count
pub async fn api_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<OverviewStats>> {
    session_user(&state, &headers)?;
    Ok(Json(reports::overview(&state.repo).await?))
}

/// Monthly sales totals, oldest month first
pub async fn api_monthly_sales(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<MonthlySales>>> {
    session_user(&state, &headers)?;
    Ok(Json(reports::monthly_sales(&state.repo).await?))
}

/// Per-customer totals, covering customers with no sales
pub async fn api_customer_summaries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<CustomerSummary>>> {
    session_user(&state, &headers)?;
    Ok(Json(reports::customer_summaries(&state.repo).await?))
}
