//! Customer endpoints - CRUD over the customer table
//!
//! Endpoints:
//! - api_customers: Full customer list
//! - api_customer_detail: Single customer
//! - api_customer_create / api_customer_update / api_customer_delete

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use salesdash_core::{CoreError, Customer};

use crate::{session_user, ApiResult, AppState};

pub async fn api_customers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Customer>>> {
    session_user(&state, &headers)?;
    Ok(Json(state.store.customers().await?))
}

pub async fn api_customer_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(custno): Path<String>,
) -> ApiResult<Json<Customer>> {
    session_user(&state, &headers)?;
    let customer = state
        .store
        .customer(&custno)
        .await?
        .ok_or(CoreError::CustomerNotFound { custno })?;
    Ok(Json(customer))
}

pub async fn api_customer_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(customer): Json<Customer>,
) -> ApiResult<Json<Customer>> {
    session_user(&state, &headers)?;
    if customer.custno.trim().is_empty() {
        return Err(CoreError::validation("custno", "customer number is required").into());
    }
    state.store.insert_customer(customer.clone()).await?;
    Ok(Json(customer))
}

pub async fn api_customer_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(custno): Path<String>,
    Json(mut customer): Json<Customer>,
) -> ApiResult<Json<Customer>> {
    session_user(&state, &headers)?;
    customer.custno = custno;
    state.store.update_customer(customer.clone()).await?;
    Ok(Json(customer))
}

pub async fn api_customer_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(custno): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    session_user(&state, &headers)?;
    state.store.delete_customer(&custno).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
