//! HTTP handlers for warehouse master data

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::Warehouse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::warehouse::{CreateWarehouseInput, WarehouseService};
use crate::AppState;

/// Register a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    current_user.0.require_permission("warehouse", "create")?;
    let service = WarehouseService::new(state.db);
    let warehouse = service.create_warehouse(&current_user.0, input).await?;
    Ok(Json(warehouse))
}

/// List warehouses in the caller's branch
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    current_user.0.require_permission("warehouse", "read")?;
    let service = WarehouseService::new(state.db);
    let warehouses = service.list_warehouses(&current_user.0).await?;
    Ok(Json(warehouses))
}

/// Get a single warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    current_user.0.require_permission("warehouse", "read")?;
    let service = WarehouseService::new(state.db);
    let warehouse = service.get_warehouse(&current_user.0, warehouse_id).await?;
    Ok(Json(warehouse))
}
