//! FIFO payment allocation
//!
//! A lump payment from (or to) a partner is distributed across that
//! partner's outstanding orders oldest-first, fully settling each order
//! before any money reaches the next one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PaymentStatus;

/// Snapshot of one outstanding order, ordered oldest-first by the caller
#[derive(Debug, Clone)]
pub struct OutstandingOrder {
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
}

impl OutstandingOrder {
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }
}

/// One order's share of an allocated payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationLine {
    pub order_id: Uuid,
    pub applied_amount: Decimal,
    pub new_paid_amount: Decimal,
    pub new_remaining_amount: Decimal,
    pub new_status: PaymentStatus,
}

/// Result of planning a lump payment over a set of outstanding orders
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    pub lines: Vec<AllocationLine>,
    /// Payment left after every outstanding order is settled
    pub unallocated_amount: Decimal,
}

impl AllocationPlan {
    pub fn allocated_amount(&self) -> Decimal {
        self.lines.iter().map(|l| l.applied_amount).sum()
    }
}

/// Plan a FIFO distribution of `total_payment` over `orders`
///
/// `orders` must already be sorted oldest-created first. Each order
/// receives `min(remaining payment, order remaining)`; the loop stops as
/// soon as the payment is exhausted. Orders that receive nothing do not
/// appear in the plan. The planner never mutates anything; callers decide
/// what to do with a non-zero `unallocated_amount`.
pub fn plan_allocation(total_payment: Decimal, orders: &[OutstandingOrder]) -> AllocationPlan {
    let mut remaining = total_payment;
    let mut lines = Vec::new();

    for order in orders {
        if remaining <= Decimal::ZERO {
            break;
        }
        let outstanding = order.remaining_amount();
        if outstanding <= Decimal::ZERO {
            continue;
        }

        let applied = remaining.min(outstanding);
        let new_paid = order.paid_amount + applied;
        let new_remaining = order.total_amount - new_paid;

        lines.push(AllocationLine {
            order_id: order.order_id,
            applied_amount: applied,
            new_paid_amount: new_paid,
            new_remaining_amount: new_remaining,
            new_status: PaymentStatus::derive(new_paid, order.total_amount),
        });

        remaining -= applied;
    }

    AllocationPlan {
        lines,
        unallocated_amount: remaining,
    }
}
