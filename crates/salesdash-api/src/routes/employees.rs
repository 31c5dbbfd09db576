//! Employee endpoints - CRUD over the employee table

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use salesdash_core::{CoreError, Employee};

use crate::{session_user, ApiResult, AppState};

pub async fn api_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Employee>>> {
    session_user(&state, &headers)?;
    Ok(Json(state.store.employees().await?))
}

pub async fn api_employee_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(empno): Path<String>,
) -> ApiResult<Json<Employee>> {
    session_user(&state, &headers)?;
    let employee = state
        .store
        .employee(&empno)
        .await?
        .ok_or(CoreError::EmployeeNotFound { empno })?;
    Ok(Json(employee))
}

pub async fn api_employee_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(employee): Json<Employee>,
) -> ApiResult<Json<Employee>> {
    session_user(&state, &headers)?;
    if employee.empno.trim().is_empty() {
        return Err(CoreError::validation("empno", "employee number is required").into());
    }
    state.store.insert_employee(employee.clone()).await?;
    Ok(Json(employee))
}

pub async fn api_employee_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(empno): Path<String>,
    Json(mut employee): Json<Employee>,
) -> ApiResult<Json<Employee>> {
    session_user(&state, &headers)?;
    employee.empno = empno;
    state.store.update_employee(employee.clone()).await?;
    Ok(Json(employee))
}

pub async fn api_employee_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(empno): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    session_user(&state, &headers)?;
    state.store.delete_employee(&empno).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
