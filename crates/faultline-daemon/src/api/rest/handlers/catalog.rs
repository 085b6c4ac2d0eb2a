//! Catalog handlers

use crate::api::rest::state::AppState;
use crate::catalog::Item;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

/// Landing page payload
#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub featured_items: Vec<Item>,
}

/// Product listing payload
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub items: Vec<Item>,
}

/// Featured items for the landing page
pub async fn landing(State(state): State<AppState>) -> ApiResult<Json<LandingResponse>> {
    let featured_items = state.catalog.featured(state.featured_limit).await?;
    Ok(Json(LandingResponse { featured_items }))
}

/// Every product
pub async fn products(State(state): State<AppState>) -> ApiResult<Json<ProductsResponse>> {
    let items = state.catalog.list_items().await?;
    Ok(Json(ProductsResponse { items }))
}

/// List items
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.catalog.list_items().await?))
}

/// Get an item by id
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<Item>> {
    let item = state
        .catalog
        .get_item(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Item {}", id)))?;

    Ok(Json(item))
}
