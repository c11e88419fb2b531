use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::menu::{MenuItem, MenuPatch};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub menu_id: String,
    #[serde(flatten)]
    pub fields: MenuPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnabledRequest {
    pub is_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub order: i32,
}

/// GET /api/menu/items - Every item, enabled or not
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Vec<MenuItem>> {
    Ok(ApiResponse::success(state.query.all_items().await?))
}

/// POST /api/menu/items - Strict create; 409 if the id exists
pub async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> ApiResult<MenuItem> {
    let item = state.admin.create(&body.menu_id, body.fields).await?;
    Ok(ApiResponse::created(item))
}

/// GET /api/menu/items/:menu_id
pub async fn get_item(State(state): State<AppState>, Path(menu_id): Path<String>) -> ApiResult<MenuItem> {
    Ok(ApiResponse::success(state.admin.get(&menu_id).await?))
}

/// PUT /api/menu/items/:menu_id - Create or edit a definition
pub async fn put_item(
    State(state): State<AppState>,
    Path(menu_id): Path<String>,
    Json(fields): Json<MenuPatch>,
) -> ApiResult<MenuItem> {
    let outcome = state.admin.upsert_definition(&menu_id, fields).await?;
    Ok(outcome.into())
}

/// PATCH /api/menu/items/:menu_id/enabled
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(menu_id): Path<String>,
    Json(body): Json<EnabledRequest>,
) -> ApiResult<MenuItem> {
    Ok(ApiResponse::success(state.admin.set_enabled(&menu_id, body.is_enabled).await?))
}

/// PATCH /api/menu/items/:menu_id/order
pub async fn set_order(
    State(state): State<AppState>,
    Path(menu_id): Path<String>,
    Json(body): Json<OrderRequest>,
) -> ApiResult<MenuItem> {
    Ok(ApiResponse::success(state.admin.reorder(&menu_id, body.order).await?))
}

/// DELETE /api/menu/items/:menu_id - Hard delete
pub async fn delete_item(State(state): State<AppState>, Path(menu_id): Path<String>) -> ApiResult<()> {
    state.admin.remove(&menu_id).await?;
    Ok(ApiResponse::no_content())
}
