//! Admin endpoints - user role management (admin-only)
//!
//! Endpoints:
//! - api_users: Every account with its resolved role
//! - api_set_user_role: Assign admin or user by upsert

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use salesdash_core::{roles, Role, UserWithRole};
use serde::Deserialize;

use crate::{admin_user, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// List every account with its resolved role
pub async fn api_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<UserWithRole>>> {
    admin_user(&state, &headers).await?;
    Ok(Json(roles::users_with_roles(&state.store).await?))
}

/// Assign a role to an account
pub async fn api_set_user_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RoleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = admin_user(&state, &headers).await?;
    roles::set_user_role(&state.store, &id, req.role).await?;
    log::info!("{} set role {} for user {}", actor.email, req.role, id);
    Ok(Json(serde_json::json!({ "success": true })))
}
