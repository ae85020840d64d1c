//! Payment allocation tests
//!
//! Tests for spreading a lump partner payment across outstanding orders:
//! oldest order first, each settled in full before the next receives
//! anything, and nothing allocated beyond what the payment covers.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::allocation::{plan_allocation, OutstandingOrder};
use shared::models::PaymentStatus;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn order(total: &str, paid: &str) -> OutstandingOrder {
    OutstandingOrder {
        order_id: Uuid::new_v4(),
        total_amount: dec(total),
        paid_amount: dec(paid),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A lump payment settles older orders before newer ones
    #[test]
    fn test_lump_payment_settles_oldest_first() {
        // Customer owes 500 + 800 + 300; pays 1000
        let orders = vec![order("500", "0"), order("800", "0"), order("300", "0")];
        let plan = plan_allocation(dec("1000"), &orders);

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].order_id, orders[0].order_id);
        assert_eq!(plan.lines[0].applied_amount, dec("500"));
        assert_eq!(plan.lines[0].new_status, PaymentStatus::Paid);
        assert_eq!(plan.lines[1].order_id, orders[1].order_id);
        assert_eq!(plan.lines[1].applied_amount, dec("500"));
        assert_eq!(plan.lines[1].new_status, PaymentStatus::Partial);
        // Third order untouched
        assert_eq!(plan.unallocated_amount, Decimal::ZERO);
    }

    /// Exact payment of the full outstanding amount settles everything
    #[test]
    fn test_exact_payment_settles_all_orders() {
        let orders = vec![order("500", "100"), order("800", "0")];
        let plan = plan_allocation(dec("1200"), &orders);

        assert_eq!(plan.lines.len(), 2);
        for line in &plan.lines {
            assert_eq!(line.new_remaining_amount, Decimal::ZERO);
            assert_eq!(line.new_status, PaymentStatus::Paid);
        }
        assert_eq!(plan.unallocated_amount, Decimal::ZERO);
    }

    /// A payment above the total outstanding leaves a remainder the
    /// caller must reject rather than silently drop
    #[test]
    fn test_overpayment_is_visible_to_caller() {
        let orders = vec![order("500", "0")];
        let plan = plan_allocation(dec("700"), &orders);

        assert_eq!(plan.allocated_amount(), dec("500"));
        assert_eq!(plan.unallocated_amount, dec("200"));
    }

    /// Fully paid orders receive nothing even when listed
    #[test]
    fn test_settled_orders_receive_nothing() {
        let orders = vec![order("400", "400"), order("600", "0")];
        let plan = plan_allocation(dec("600"), &orders);

        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].order_id, orders[1].order_id);
    }

    /// A partially paid order only absorbs its own remainder
    #[test]
    fn test_partial_order_absorbs_only_remainder() {
        let orders = vec![order("1000", "750"), order("500", "0")];
        let plan = plan_allocation(dec("400"), &orders);

        assert_eq!(plan.lines[0].applied_amount, dec("250"));
        assert_eq!(plan.lines[0].new_status, PaymentStatus::Paid);
        assert_eq!(plan.lines[1].applied_amount, dec("150"));
        assert_eq!(plan.lines[1].new_status, PaymentStatus::Partial);
    }

    /// With no outstanding orders the whole payment stays unallocated
    #[test]
    fn test_no_orders_nothing_allocated() {
        let plan = plan_allocation(dec("100"), &[]);
        assert!(plan.lines.is_empty());
        assert_eq!(plan.unallocated_amount, dec("100"));
    }

    /// Payment status follows the new paid amount
    #[test]
    fn test_status_per_line() {
        assert_eq!(PaymentStatus::derive(dec("0"), dec("100")), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(dec("40"), dec("100")), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::derive(dec("100"), dec("100")), PaymentStatus::Paid);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for an outstanding order: total in [1, 10000], paid in [0, total)
    fn order_strategy() -> impl Strategy<Value = OutstandingOrder> {
        (1i64..=10000i64)
            .prop_flat_map(|total| (Just(total), 0i64..total))
            .prop_map(|(total, paid)| OutstandingOrder {
                order_id: Uuid::new_v4(),
                total_amount: Decimal::from(total),
                paid_amount: Decimal::from(paid),
            })
    }

    fn orders_strategy() -> impl Strategy<Value = Vec<OutstandingOrder>> {
        prop::collection::vec(order_strategy(), 1..10)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Money is conserved: allocated + unallocated == payment
        #[test]
        fn prop_payment_conserved(orders in orders_strategy(), payment in 1i64..20000i64) {
            let payment = Decimal::from(payment);
            let plan = plan_allocation(payment, &orders);
            prop_assert_eq!(plan.allocated_amount() + plan.unallocated_amount, payment);
        }

        /// No order is ever paid past its total
        #[test]
        fn prop_no_line_exceeds_order_total(orders in orders_strategy(), payment in 1i64..20000i64) {
            let plan = plan_allocation(Decimal::from(payment), &orders);
            for line in &plan.lines {
                let order = orders.iter().find(|o| o.order_id == line.order_id).unwrap();
                prop_assert!(line.new_paid_amount <= order.total_amount);
                prop_assert!(line.new_remaining_amount >= Decimal::ZERO);
                prop_assert!(line.applied_amount > Decimal::ZERO);
            }
        }

        /// Every line except possibly the last settles its order in full
        #[test]
        fn prop_fifo_settles_each_order_before_the_next(
            orders in orders_strategy(),
            payment in 1i64..20000i64,
        ) {
            let plan = plan_allocation(Decimal::from(payment), &orders);
            if let Some((last, earlier)) = plan.lines.split_last() {
                for line in earlier {
                    prop_assert_eq!(line.new_status, PaymentStatus::Paid);
                }
                prop_assert_ne!(last.new_status, PaymentStatus::Unpaid);
            }
        }

        /// Paying exactly the total outstanding settles every order
        #[test]
        fn prop_exact_total_settles_everything(orders in orders_strategy()) {
            let total: Decimal = orders.iter().map(|o| o.remaining_amount()).sum();
            let plan = plan_allocation(total, &orders);

            prop_assert_eq!(plan.unallocated_amount, Decimal::ZERO);
            let open_orders = orders
                .iter()
                .filter(|o| o.remaining_amount() > Decimal::ZERO)
                .count();
            prop_assert_eq!(plan.lines.len(), open_orders);
            for line in &plan.lines {
                prop_assert_eq!(line.new_status, PaymentStatus::Paid);
            }
        }

        /// Lines appear in the same order as the input orders
        #[test]
        fn prop_lines_preserve_input_order(orders in orders_strategy(), payment in 1i64..20000i64) {
            let plan = plan_allocation(Decimal::from(payment), &orders);
            let positions: Vec<usize> = plan
                .lines
                .iter()
                .map(|l| orders.iter().position(|o| o.order_id == l.order_id).unwrap())
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            prop_assert_eq!(positions, sorted);
        }
    }
}
