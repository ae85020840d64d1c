//! HTTP handlers for partner-level payment and summary endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{PartnerSummary, PartnerType};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::partner::{AllocatePaymentInput, AllocationResult, PartnerService};
use crate::AppState;

/// Query parameters for the debt summary
#[derive(Debug, Deserialize)]
pub struct DebtSummaryQuery {
    pub partner_type: String,
}

/// Allocate a lump payment across a partner's outstanding orders
pub async fn allocate_partner_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(partner_id): Path<Uuid>,
    Json(input): Json<AllocatePaymentInput>,
) -> AppResult<Json<AllocationResult>> {
    current_user.0.require_permission("debt", "pay")?;
    let service = PartnerService::new(state.db);
    let result = service
        .allocate_payment(&current_user.0, partner_id, input)
        .await?;
    Ok(Json(result))
}

/// Aggregate debt summary per partner
pub async fn get_debt_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DebtSummaryQuery>,
) -> AppResult<Json<Vec<PartnerSummary>>> {
    current_user.0.require_permission("debt", "read")?;

    let partner_type =
        PartnerType::from_str(&query.partner_type).ok_or_else(|| AppError::Validation {
            field: "partner_type".to_string(),
            message: format!("Unknown partner type: {}", query.partner_type),
            message_vi: "Loại đối tác không hợp lệ".to_string(),
        })?;

    let service = PartnerService::new(state.db);
    let summary = service.get_debt_summary(partner_type).await?;
    Ok(Json(summary))
}
