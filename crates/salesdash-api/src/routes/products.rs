//! Product endpoints - CRUD and price history
//!
//! Endpoints:
//! - api_products: Product list with the current price resolved
//! - api_product_detail / api_product_create / api_product_update / api_product_delete
//! - api_prices: Price history for a product, newest first
//! - api_price_create: Append a price row effective from a date

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdash_core::{CoreError, PriceHist, PricedProduct, Product};
use serde::Deserialize;

use crate::{session_user, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub effdate: NaiveDate,
    pub unitprice: Decimal,
}

/// Product list with each product's current price resolved from its
/// latest price history row
pub async fn api_products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<PricedProduct>>> {
    session_user(&state, &headers)?;
    let reference = state.repo.load_reference().await?;
    Ok(Json(reference.products))
}

pub async fn api_product_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prodcode): Path<String>,
) -> ApiResult<Json<Product>> {
    session_user(&state, &headers)?;
    let product = state
        .store
        .product(&prodcode)
        .await?
        .ok_or(CoreError::ProductNotFound { prodcode })?;
    Ok(Json(product))
}

pub async fn api_product_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(product): Json<Product>,
) -> ApiResult<Json<Product>> {
    session_user(&state, &headers)?;
    if product.prodcode.trim().is_empty() {
        return Err(CoreError::validation("prodcode", "product code is required").into());
    }
    state.store.insert_product(product.clone()).await?;
    Ok(Json(product))
}

pub async fn api_product_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prodcode): Path<String>,
    Json(mut product): Json<Product>,
) -> ApiResult<Json<Product>> {
    session_user(&state, &headers)?;
    product.prodcode = prodcode;
    state.store.update_product(product.clone()).await?;
    Ok(Json(product))
}

pub async fn api_product_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prodcode): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    session_user(&state, &headers)?;
    state.store.delete_product(&prodcode).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Price history for one product, newest effective date first
pub async fn api_prices(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prodcode): Path<String>,
) -> ApiResult<Json<Vec<PriceHist>>> {
    session_user(&state, &headers)?;
    let mut history = state.store.price_history(&prodcode).await?;
    history.sort_by(|a, b| b.effdate.cmp(&a.effdate));
    Ok(Json(history))
}

/// Append a price row for a product
pub async fn api_price_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prodcode): Path<String>,
    Json(req): Json<PriceRequest>,
) -> ApiResult<Json<PriceHist>> {
    session_user(&state, &headers)?;
    let row = PriceHist {
        prodcode,
        effdate: req.effdate,
        unitprice: req.unitprice,
    };
    state.store.add_price(row.clone()).await?;
    Ok(Json(row))
}
