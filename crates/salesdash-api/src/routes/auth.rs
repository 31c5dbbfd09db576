//! Auth endpoints - account and session lifecycle
//!
//! Endpoints:
//! - api_sign_up: Register a new account
//! - api_sign_in: Open a session, returns the bearer token
//! - api_sign_out: Tear down the current session
//! - api_session: Current user and resolved role

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use salesdash_core::{roles, Role, SessionUser};
use serde::{Deserialize, Serialize};

use crate::{bearer_token, session_user, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub role: Role,
}

/// Register a new account (no session is opened)
pub async fn api_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<Json<SessionUser>> {
    let user = state.auth.sign_up(&req.name, &req.email, &req.password).await?;
    Ok(Json(user))
}

/// Sign in with email and password
pub async fn api_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let (token, user) = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(SignInResponse { token, user }))
}

/// Sign out the current session; a missing session is still a success
pub async fn api_sign_out(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.sign_out(token);
    }
    Json(serde_json::json!({ "success": true }))
}

/// Current user and role for the presented token
pub async fn api_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let user = session_user(&state, &headers)?;
    let role = roles::resolve_role(&state.store, &user.id).await;
    Ok(Json(SessionResponse { user, role }))
}
