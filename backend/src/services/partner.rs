//! Partner payment allocation and debt summary service
//!
//! A lump payment from a customer (or to a supplier) is spread across
//! that partner's outstanding orders oldest-first until the payment is
//! used up. The distribution, every order update and the single bank
//! adjustment commit together or not at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::allocation::{plan_allocation, AllocationLine, OutstandingOrder};
use shared::models::{sort_summaries_by_remaining, PartnerSummary, PartnerType};
use shared::validation::{validate_amount, validate_payment_within_remaining};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Partner-level payment and summary service
#[derive(Clone)]
pub struct PartnerService {
    db: PgPool,
}

/// Input for allocating a lump payment over a partner's orders
#[derive(Debug, Deserialize)]
pub struct AllocatePaymentInput {
    pub partner_type: PartnerType,
    pub payment_amount: Decimal,
    pub bank_account_id: Option<Uuid>,
}

/// Result of a lump-payment allocation
#[derive(Debug, Clone, Serialize)]
pub struct AllocationResult {
    pub orders_updated: usize,
    pub total_allocated: Decimal,
    pub details: Vec<AllocationLine>,
}

#[derive(Debug, FromRow)]
struct OutstandingRow {
    id: Uuid,
    total_amount: Decimal,
    paid_amount: Decimal,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    partner_id: Uuid,
    partner_name: String,
    total_orders: i64,
    total_amount: Decimal,
    paid_amount: Decimal,
    unpaid_orders: i64,
}

impl PartnerService {
    /// Create a new PartnerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Distribute a lump payment over a partner's outstanding orders
    ///
    /// Orders are taken oldest-created first; each is settled in full
    /// before the next receives anything. A payment larger than the
    /// partner's total outstanding amount is rejected outright so no
    /// money is ever silently dropped.
    pub async fn allocate_payment(
        &self,
        caller: &AuthUser,
        partner_id: Uuid,
        input: AllocatePaymentInput,
    ) -> AppResult<AllocationResult> {
        validate_amount(input.payment_amount).map_err(|e| AppError::Validation {
            field: "payment_amount".to_string(),
            message: e.to_string(),
            message_vi: "Số tiền thanh toán phải lớn hơn 0".to_string(),
        })?;

        let (partner_table, order_table, partner_column, partner_label) = match input.partner_type
        {
            PartnerType::Customer => ("customers", "orders", "customer_id", "Customer"),
            PartnerType::Supplier => ("suppliers", "purchase_orders", "supplier_id", "Supplier"),
        };

        let mut tx = self.db.begin().await?;

        let partner_exists = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM {partner_table} WHERE id = $1"
        ))
        .bind(partner_id)
        .fetch_optional(&mut *tx)
        .await?;
        if partner_exists.is_none() {
            return Err(AppError::NotFound(partner_label.to_string()));
        }

        // Outstanding orders, oldest first, locked for the whole update
        let rows = sqlx::query_as::<_, OutstandingRow>(&format!(
            r#"
            SELECT id, total_amount, paid_amount
            FROM {order_table}
            WHERE {partner_column} = $1
              AND status <> 'CANCELLED'
              AND paid_amount < total_amount
            ORDER BY created_at ASC
            FOR UPDATE
            "#
        ))
        .bind(partner_id)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NothingToAllocate);
        }

        let outstanding: Vec<OutstandingOrder> = rows
            .iter()
            .map(|r| OutstandingOrder {
                order_id: r.id,
                total_amount: r.total_amount,
                paid_amount: r.paid_amount,
            })
            .collect();

        let total_outstanding: Decimal =
            outstanding.iter().map(|o| o.remaining_amount()).sum();
        if validate_payment_within_remaining(input.payment_amount, total_outstanding).is_err() {
            return Err(AppError::Overpayment(format!(
                "Payment {} exceeds total outstanding {} of the partner",
                input.payment_amount, total_outstanding
            )));
        }

        let plan = plan_allocation(input.payment_amount, &outstanding);

        for line in &plan.lines {
            sqlx::query(&format!(
                r#"
                UPDATE {order_table}
                SET paid_amount = $2, payment_status = $3, updated_at = now()
                WHERE id = $1
                "#
            ))
            .bind(line.order_id)
            .bind(line.new_paid_amount)
            .bind(line.new_status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        // One bank adjustment for the whole lump sum, not per order
        if let Some(bank_account_id) = input.bank_account_id {
            let delta = input.partner_type.debt_type().bank_delta(input.payment_amount);
            let locked = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM bank_accounts WHERE id = $1 FOR UPDATE",
            )
            .bind(bank_account_id)
            .fetch_optional(&mut *tx)
            .await?;
            if locked.is_none() {
                return Err(AppError::NotFound("Bank account".to_string()));
            }
            sqlx::query(
                "UPDATE bank_accounts SET balance = balance + $2, updated_at = now() WHERE id = $1",
            )
            .bind(bank_account_id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let total_allocated = plan.allocated_amount();
        tracing::info!(
            partner = %partner_id,
            caller = %caller.user_id,
            amount = %input.payment_amount,
            orders = plan.lines.len(),
            "partner payment allocated"
        );

        Ok(AllocationResult {
            orders_updated: plan.lines.len(),
            total_allocated,
            details: plan.lines,
        })
    }

    /// Aggregate debt position per partner, heaviest debtors first
    ///
    /// Recomputed from the order history on every call; only partners
    /// with at least one non-cancelled order appear.
    pub async fn get_debt_summary(
        &self,
        partner_type: PartnerType,
    ) -> AppResult<Vec<PartnerSummary>> {
        let (partner_table, order_table, partner_column) = match partner_type {
            PartnerType::Customer => ("customers", "orders", "customer_id"),
            PartnerType::Supplier => ("suppliers", "purchase_orders", "supplier_id"),
        };

        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            r#"
            SELECT p.id AS partner_id, p.name AS partner_name,
                   COUNT(o.id) AS total_orders,
                   COALESCE(SUM(o.total_amount), 0) AS total_amount,
                   COALESCE(SUM(o.paid_amount), 0) AS paid_amount,
                   COUNT(o.id) FILTER (WHERE o.payment_status <> 'PAID') AS unpaid_orders
            FROM {partner_table} p
            JOIN {order_table} o ON o.{partner_column} = p.id AND o.status <> 'CANCELLED'
            GROUP BY p.id, p.name
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        let mut summaries: Vec<PartnerSummary> = rows
            .into_iter()
            .map(|r| PartnerSummary {
                partner_id: r.partner_id,
                partner_name: r.partner_name,
                partner_type,
                total_orders: r.total_orders,
                total_amount: r.total_amount,
                paid_amount: r.paid_amount,
                remaining_amount: r.total_amount - r.paid_amount,
                unpaid_orders: r.unpaid_orders,
            })
            .collect();
        sort_summaries_by_remaining(&mut summaries);
        Ok(summaries)
    }
}
