//! HTTP handlers for debt and payment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Debt, DebtPayment, DebtType};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::debt::{CreateDebtInput, DebtService, PayDebtInput};
use crate::AppState;

/// Query parameters for listing debts
#[derive(Debug, Deserialize)]
pub struct ListDebtsQuery {
    #[serde(rename = "type")]
    pub debt_type: Option<String>,
    pub limit: Option<i64>,
}

/// Create a debt record
pub async fn create_debt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDebtInput>,
) -> AppResult<Json<Debt>> {
    current_user.0.require_permission("debt", "create")?;
    let service = DebtService::new(state.db);
    let debt = service.create_debt(&current_user.0, input).await?;
    Ok(Json(debt))
}

/// Get a single debt record
pub async fn get_debt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(debt_id): Path<Uuid>,
) -> AppResult<Json<Debt>> {
    current_user.0.require_permission("debt", "read")?;
    let service = DebtService::new(state.db);
    let debt = service.get_debt(debt_id).await?;
    Ok(Json(debt))
}

/// List debts, optionally filtered by type
pub async fn list_debts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListDebtsQuery>,
) -> AppResult<Json<Vec<Debt>>> {
    current_user.0.require_permission("debt", "read")?;

    let debt_type = match query.debt_type.as_deref() {
        None => None,
        Some(s) => Some(DebtType::from_str(s).ok_or_else(|| AppError::Validation {
            field: "type".to_string(),
            message: format!("Unknown debt type: {}", s),
            message_vi: "Loại công nợ không hợp lệ".to_string(),
        })?),
    };

    let service = DebtService::new(state.db);
    let debts = service
        .list_debts(debt_type, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(debts))
}

/// Record a payment against one debt
pub async fn pay_debt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(debt_id): Path<Uuid>,
    Json(input): Json<PayDebtInput>,
) -> AppResult<Json<DebtPayment>> {
    current_user.0.require_permission("debt", "pay")?;
    let service = DebtService::new(state.db);
    let payment = service.pay_debt(&current_user.0, debt_id, input).await?;
    Ok(Json(payment))
}

/// List payments recorded against a debt
pub async fn list_debt_payments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(debt_id): Path<Uuid>,
) -> AppResult<Json<Vec<DebtPayment>>> {
    current_user.0.require_permission("debt", "read")?;
    let service = DebtService::new(state.db);
    let payments = service.list_payments(debt_id).await?;
    Ok(Json(payments))
}
