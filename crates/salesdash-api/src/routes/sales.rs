//! Sales endpoints - list, detail, create, update, soft delete
//!
//! Endpoints:
//! - api_sales: Sale list, newest first (?include_deleted=true is admin-only)
//! - api_sale_detail: Single sale with resolved names and totals
//! - api_sale_create: Create a sale from a draft
//! - api_sale_update: Replace a sale's header and lines
//! - api_sale_delete: Soft delete with a required reason (admin-only)

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use salesdash_core::{
    execute_delete, DeleteWorkflow, DeletionLog, DraftLine, SaleDraft, SaleView,
};
use serde::{Deserialize, Serialize};

use crate::{admin_user, session_user, session_with_role, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default)]
    pub include_deleted: bool,
    /// Page size; the configured records_per_page when absent
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub sales: Vec<SaleView>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub salesdate: NaiveDate,
    pub custno: String,
    pub empno: String,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub prodcode: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub reason: String,
}

impl SaleRequest {
    fn into_draft(self) -> SaleDraft {
        SaleDraft {
            salesdate: self.salesdate,
            custno: self.custno,
            empno: self.empno,
            lines: self
                .lines
                .into_iter()
                .map(|l| DraftLine {
                    prodcode: l.prodcode,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

/// Sale list, newest first, paginated by the configured page size.
/// Deleted sales are only included for admins asking for them
/// explicitly.
pub async fn api_sales(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Json<SalesResponse>> {
    let (user, role) = session_with_role(&state, &headers).await?;
    let include_deleted = query.include_deleted && role == salesdash_core::Role::Admin;
    if query.include_deleted && !include_deleted {
        log::warn!("{} asked for deleted sales without admin role", user.email);
    }

    let limit = query
        .limit
        .unwrap_or(state.config.pagination.records_per_page)
        .max(1);
    let sales = state.repo.list_sales(include_deleted).await?;
    let total_count = sales.len();
    let sales = page_slice(sales, limit, query.offset);

    Ok(Json(SalesResponse {
        sales,
        total_count,
        page: query.offset / limit + 1,
        page_size: limit,
    }))
}

/// One page out of the full (already sorted) listing
fn page_slice<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

/// Single sale detail
pub async fn api_sale_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transno): Path<String>,
) -> ApiResult<Json<SaleView>> {
    session_user(&state, &headers)?;
    let view = state.repo.sale_view(&transno).await?;
    Ok(Json(view))
}

/// Create a sale; the transaction number is assigned server-side
pub async fn api_sale_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaleRequest>,
) -> ApiResult<Json<SaleView>> {
    session_user(&state, &headers)?;
    let view = state.repo.create_sale(req.into_draft()).await?;
    Ok(Json(view))
}

/// Replace a sale's header and lines
pub async fn api_sale_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transno): Path<String>,
    Json(req): Json<SaleRequest>,
) -> ApiResult<Json<SaleView>> {
    session_user(&state, &headers)?;
    let view = state.repo.update_sale(&transno, req.into_draft()).await?;
    Ok(Json(view))
}

/// Soft delete a sale. The role check runs here regardless of what the
/// client claims, and the reason is required.
pub async fn api_sale_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transno): Path<String>,
    Json(req): Json<DeleteRequest>,
) -> ApiResult<Json<DeletionLog>> {
    let user = admin_user(&state, &headers).await?;

    let mut workflow = DeleteWorkflow::begin(&transno, salesdash_core::Role::Admin)?;
    workflow.provide_reason(&req.reason)?;
    let log = execute_delete(&state.repo, &workflow, &user).await?;
    Ok(Json(log))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::page_slice;

    #[test]
    fn test_page_slice_windows() {
        let items: Vec<i32> = (1..=5).collect();
        assert_eq!(page_slice(items.clone(), 2, 0), vec![1, 2]);
        assert_eq!(page_slice(items.clone(), 2, 2), vec![3, 4]);
        assert_eq!(page_slice(items.clone(), 2, 4), vec![5]);
        assert_eq!(page_slice(items, 2, 6), Vec::<i32>::new());
    }

    #[test]
    fn test_page_slice_oversized_limit() {
        let items: Vec<i32> = (1..=3).collect();
        assert_eq!(page_slice(items, 50, 0), vec![1, 2, 3]);
    }
}
