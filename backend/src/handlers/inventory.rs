//! HTTP handlers for inventory ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::TransactionType;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    CreateExportInput, CreateImportInput, CreateTransferInput, CreatedTransaction,
    InventoryService, TransactionView, WarehouseBalance,
};
use crate::AppState;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub limit: Option<i64>,
}

/// Query parameters for a warehouse balance view
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    #[serde(default)]
    pub show_all: bool,
}

/// Create an import document (goods entering a warehouse)
pub async fn create_import(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateImportInput>,
) -> AppResult<Json<CreatedTransaction>> {
    current_user.0.require_permission("inventory", "create")?;
    let service = InventoryService::new(state.db);
    let created = service.create_import(&current_user.0, input).await?;
    Ok(Json(created))
}

/// Create an export document (goods leaving a warehouse)
pub async fn create_export(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateExportInput>,
) -> AppResult<Json<CreatedTransaction>> {
    current_user.0.require_permission("inventory", "create")?;
    let service = InventoryService::new(state.db);
    let created = service.create_export(&current_user.0, input).await?;
    Ok(Json(created))
}

/// Create a transfer document (goods moving between warehouses)
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<CreatedTransaction>> {
    current_user.0.require_permission("inventory", "create")?;
    let service = InventoryService::new(state.db);
    let created = service.create_transfer(&current_user.0, input).await?;
    Ok(Json(created))
}

/// Get one transaction with its detail lines
pub async fn get_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionView>> {
    current_user.0.require_permission("inventory", "read")?;
    let service = InventoryService::new(state.db);
    let transaction = service.get_transaction(transaction_id).await?;
    Ok(Json(transaction))
}

/// List transactions, newest first, optionally filtered by type
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListTransactionsQuery>,
) -> AppResult<Json<Vec<TransactionView>>> {
    current_user.0.require_permission("inventory", "read")?;

    let transaction_type = match query.transaction_type.as_deref() {
        None => None,
        Some(s) => Some(TransactionType::from_str(s).ok_or_else(|| AppError::Validation {
            field: "type".to_string(),
            message: format!("Unknown transaction type: {}", s),
            message_vi: "Loại phiếu không hợp lệ".to_string(),
        })?),
    };

    let service = InventoryService::new(state.db);
    let transactions = service
        .list_transactions(transaction_type, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(transactions))
}

/// Get the stock balance of a warehouse
pub async fn get_warehouse_balance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<WarehouseBalance>> {
    current_user.0.require_permission("inventory", "read")?;
    let service = InventoryService::new(state.db);
    let balance = service
        .get_balance(&current_user.0, warehouse_id, query.show_all)
        .await?;
    Ok(Json(balance))
}
