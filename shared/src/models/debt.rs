//! Debt and payment models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of a debt record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtType {
    /// Money a customer owes us
    Receivable,
    /// Money we owe a supplier
    Payable,
}

impl DebtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::Receivable => "RECEIVABLE",
            DebtType::Payable => "PAYABLE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "RECEIVABLE" => Some(DebtType::Receivable),
            "PAYABLE" => Some(DebtType::Payable),
            _ => None,
        }
    }

    /// Signed bank-balance movement a payment of `amount` causes
    ///
    /// Collecting a receivable brings money in; settling a payable
    /// sends money out.
    pub fn bank_delta(&self, amount: Decimal) -> Decimal {
        match self {
            DebtType::Receivable => amount,
            DebtType::Payable => -amount,
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Bank => "BANK",
            PaymentMethod::Transfer => "TRANSFER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(PaymentMethod::Cash),
            "BANK" => Some(PaymentMethod::Bank),
            "TRANSFER" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }

    /// Non-cash payments move money through a bank account
    pub fn requires_bank_account(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

/// Payment status of an order or purchase order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PARTIAL" => Some(PaymentStatus::Partial),
            "PAID" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }

    /// Derive the status from the stored amounts
    ///
    /// The single source of truth for payment status: re-deriving from
    /// persisted amounts always reproduces the stored status.
    pub fn derive(paid: Decimal, total: Decimal) -> Self {
        if paid >= total {
            PaymentStatus::Paid
        } else if paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }
}

/// Status of a debt record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "PENDING",
            DebtStatus::Partial => "PARTIAL",
            DebtStatus::Paid => "PAID",
            DebtStatus::Overdue => "OVERDUE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(DebtStatus::Pending),
            "PARTIAL" => Some(DebtStatus::Partial),
            "PAID" => Some(DebtStatus::Paid),
            "OVERDUE" => Some(DebtStatus::Overdue),
            _ => None,
        }
    }

    /// Derive the status from stored amounts and the due date
    ///
    /// A settled debt is `Paid` regardless of its due date; an unsettled
    /// debt past due is `Overdue`; otherwise the status reflects whether
    /// any payment has been applied yet.
    pub fn derive(
        paid: Decimal,
        remaining: Decimal,
        due_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if remaining <= Decimal::ZERO {
            return DebtStatus::Paid;
        }
        if let Some(due) = due_date {
            if today > due {
                return DebtStatus::Overdue;
            }
        }
        if paid > Decimal::ZERO {
            DebtStatus::Partial
        } else {
            DebtStatus::Pending
        }
    }
}

/// A receivable or payable debt record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub code: String,
    pub debt_type: DebtType,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub original_amount: Decimal,
    pub paid_amount: Decimal,
    /// Always equals `original_amount - paid_amount`
    pub remaining_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: DebtStatus,
    /// Optional link to the order or purchase order the debt came from
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment applied to a debt
///
/// Immutable once created; each payment strictly decreases the debt's
/// remaining amount by `payment_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub payment_amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
