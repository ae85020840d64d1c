//! Partner (customer/supplier) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::DebtType;

/// Which side of the books a partner sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerType {
    Customer,
    Supplier,
}

impl PartnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerType::Customer => "CUSTOMER",
            PartnerType::Supplier => "SUPPLIER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(PartnerType::Customer),
            "SUPPLIER" => Some(PartnerType::Supplier),
            _ => None,
        }
    }

    /// The debt side this partner's orders sit on
    pub fn debt_type(&self) -> DebtType {
        match self {
            PartnerType::Customer => DebtType::Receivable,
            PartnerType::Supplier => DebtType::Payable,
        }
    }
}

/// Aggregate debt position of one partner
///
/// Recomputed from order history on every request; there is no cached
/// materialized view behind this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub partner_type: PartnerType,
    pub total_orders: i64,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    /// Orders whose payment status is not PAID
    pub unpaid_orders: i64,
}

/// Order summaries heaviest outstanding amount first
pub fn sort_summaries_by_remaining(summaries: &mut [PartnerSummary]) {
    summaries.sort_by(|a, b| b.remaining_amount.cmp(&a.remaining_amount));
}
