//! Settings endpoint - read-only configuration display

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::{session_user, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub currency: salesdash_config::CurrencyConfig,
    pub pagination: salesdash_config::PaginationConfig,
    pub log_level: String,
}

/// Effective configuration, without server binding details
pub async fn api_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SettingsResponse>> {
    session_user(&state, &headers)?;
    Ok(Json(SettingsResponse {
        currency: state.config.currency.clone(),
        pagination: state.config.pagination.clone(),
        log_level: state.config.logging.level.clone(),
    }))
}

/// Field-type metadata for the settings display
pub async fn api_settings_metadata() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "currency": {
            "default_currency": "string",
            "decimal_places": "number",
            "symbol_position": "string"
        },
        "pagination": {
            "records_per_page": "number"
        },
        "log_level": "string"
    }))
}
