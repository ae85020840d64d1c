//! Debt and payment tests
//!
//! Tests for debt status derivation and the payment lifecycle: paying
//! never exceeds the remaining amount, amounts stay consistent and the
//! status always reflects the numbers and the due date.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{
    sort_summaries_by_remaining, DebtStatus, DebtType, PartnerSummary, PartnerType, PaymentMethod,
    PaymentStatus,
};
use shared::validation::{
    validate_amount, validate_debt_code, validate_debt_partner, validate_payment_bank_account,
    validate_payment_within_remaining,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A fully paid debt is PAID regardless of the due date
    #[test]
    fn test_paid_wins_over_overdue() {
        let status = DebtStatus::derive(
            dec("1000"),
            Decimal::ZERO,
            Some(date(2025, 1, 1)),
            date(2025, 6, 1),
        );
        assert_eq!(status, DebtStatus::Paid);
    }

    /// An unpaid debt past its due date is OVERDUE
    #[test]
    fn test_overdue_when_past_due_date() {
        let status = DebtStatus::derive(
            Decimal::ZERO,
            dec("1000"),
            Some(date(2025, 1, 1)),
            date(2025, 1, 2),
        );
        assert_eq!(status, DebtStatus::Overdue);

        // Partially paid but late is still overdue
        let status = DebtStatus::derive(
            dec("400"),
            dec("600"),
            Some(date(2025, 1, 1)),
            date(2025, 2, 1),
        );
        assert_eq!(status, DebtStatus::Overdue);
    }

    /// On the due date itself the debt is not yet overdue
    #[test]
    fn test_due_date_itself_not_overdue() {
        let status = DebtStatus::derive(
            Decimal::ZERO,
            dec("1000"),
            Some(date(2025, 1, 1)),
            date(2025, 1, 1),
        );
        assert_eq!(status, DebtStatus::Pending);
    }

    /// Partial payment before the due date gives PARTIAL
    #[test]
    fn test_partial_before_due_date() {
        let status = DebtStatus::derive(
            dec("300"),
            dec("700"),
            Some(date(2025, 12, 31)),
            date(2025, 6, 1),
        );
        assert_eq!(status, DebtStatus::Partial);
    }

    /// No payment and no due date gives PENDING
    #[test]
    fn test_pending_without_due_date() {
        let status = DebtStatus::derive(Decimal::ZERO, dec("500"), None, date(2025, 6, 1));
        assert_eq!(status, DebtStatus::Pending);
    }

    /// A payment above the remaining amount must be rejected
    #[test]
    fn test_overpayment_detection() {
        let remaining = dec("250");
        assert!(validate_payment_within_remaining(dec("250.01"), remaining).is_err());

        // Settling the exact remaining amount is allowed
        assert!(validate_payment_within_remaining(dec("250"), remaining).is_ok());
        assert!(validate_payment_within_remaining(dec("100"), remaining).is_ok());
    }

    /// Receivables belong to customers, payables to suppliers
    #[test]
    fn test_debt_partner_matches_type() {
        let id = Uuid::new_v4();
        assert_eq!(
            validate_debt_partner(DebtType::Receivable, Some(id), None),
            Ok(id)
        );
        assert_eq!(
            validate_debt_partner(DebtType::Payable, None, Some(id)),
            Ok(id)
        );
        assert!(validate_debt_partner(DebtType::Receivable, None, Some(id)).is_err());
        assert!(validate_debt_partner(DebtType::Payable, Some(id), None).is_err());
        assert!(validate_debt_partner(DebtType::Receivable, Some(id), Some(id)).is_err());
        assert!(validate_debt_partner(DebtType::Receivable, None, None).is_err());
    }

    /// Non-cash payments need a bank account, cash does not
    #[test]
    fn test_bank_account_requirement() {
        let id = Uuid::new_v4();
        assert!(validate_payment_bank_account(PaymentMethod::Cash, None).is_ok());
        assert!(validate_payment_bank_account(PaymentMethod::Bank, None).is_err());
        assert!(validate_payment_bank_account(PaymentMethod::Transfer, None).is_err());
        assert!(validate_payment_bank_account(PaymentMethod::Bank, Some(id)).is_ok());
    }

    /// Receiving money raises the bank balance; paying a supplier lowers it
    #[test]
    fn test_bank_delta_sign_per_debt_type() {
        let amount = dec("500");
        assert_eq!(DebtType::Receivable.bank_delta(amount), dec("500"));
        assert_eq!(DebtType::Payable.bank_delta(amount), dec("-500"));

        // Lump partner payments move the bank the same way as the debt
        // side the partner sits on
        assert_eq!(PartnerType::Customer.debt_type(), DebtType::Receivable);
        assert_eq!(PartnerType::Supplier.debt_type(), DebtType::Payable);
        assert_eq!(
            PartnerType::Supplier.debt_type().bank_delta(amount),
            dec("-500")
        );
    }

    /// Debt codes are uppercase alphanumeric with dashes, 3-30 chars
    #[test]
    fn test_debt_code_validation() {
        assert!(validate_debt_code("CN-2025-001").is_ok());
        assert!(validate_debt_code("ABC").is_ok());
        assert!(validate_debt_code("ab").is_err());
        assert!(validate_debt_code("lowercase-code").is_err());
        assert!(validate_debt_code("HAS SPACE").is_err());
    }

    fn summary(name: &str, total: Decimal, paid: Decimal) -> PartnerSummary {
        PartnerSummary {
            partner_id: Uuid::new_v4(),
            partner_name: name.to_string(),
            partner_type: PartnerType::Customer,
            total_orders: 1,
            total_amount: total,
            paid_amount: paid,
            remaining_amount: total - paid,
            unpaid_orders: 1,
        }
    }

    /// The debt summary lists the heaviest debtors first
    #[test]
    fn test_summary_sorted_by_remaining_descending() {
        let mut summaries = vec![
            summary("A", dec("1000"), dec("900")), // remaining 100
            summary("B", dec("5000"), dec("0")),   // remaining 5000
            summary("C", dec("2000"), dec("500")), // remaining 1500
        ];

        sort_summaries_by_remaining(&mut summaries);

        let names: Vec<&str> = summaries.iter().map(|s| s.partner_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    /// Amounts must be strictly positive
    #[test]
    fn test_amount_validation() {
        assert!(validate_amount(dec("0.01")).is_ok());
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(dec("-5")).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Status is a pure function of the amounts and dates, and the
        /// four cases cover every combination exactly once
        #[test]
        fn prop_status_consistent_with_amounts(
            original in 1i64..100000,
            paid in 0i64..100000,
            due_offset in -100i64..100,
        ) {
            let original = Decimal::from(original);
            let paid = Decimal::from(paid).min(original);
            let remaining = original - paid;
            let due = today() + chrono::Duration::days(due_offset);

            let status = DebtStatus::derive(paid, remaining, Some(due), today());

            if remaining <= Decimal::ZERO {
                prop_assert_eq!(status, DebtStatus::Paid);
            } else if due < today() {
                prop_assert_eq!(status, DebtStatus::Overdue);
            } else if paid > Decimal::ZERO {
                prop_assert_eq!(status, DebtStatus::Partial);
            } else {
                prop_assert_eq!(status, DebtStatus::Pending);
            }
        }

        /// Payment status never disagrees with the paid/total pair
        #[test]
        fn prop_payment_status_matches_amounts(total in 1i64..100000, paid in 0i64..100000) {
            let total = Decimal::from(total);
            let paid = Decimal::from(paid);
            let status = PaymentStatus::derive(paid, total);

            match status {
                PaymentStatus::Paid => prop_assert!(paid >= total),
                PaymentStatus::Partial => prop_assert!(paid > Decimal::ZERO && paid < total),
                PaymentStatus::Unpaid => prop_assert_eq!(paid, Decimal::ZERO),
            }
        }
    }
}

// ============================================================================
// Payment Lifecycle Simulation
// ============================================================================

#[cfg(test)]
mod simulation_tests {
    use super::*;

    /// In-memory stand-in for one debt record
    struct Debt {
        original: Decimal,
        paid: Decimal,
    }

    impl Debt {
        fn remaining(&self) -> Decimal {
            self.original - self.paid
        }

        /// Applies the same overpayment rule as the service
        fn pay(&mut self, amount: Decimal) -> Result<(), ()> {
            if amount <= Decimal::ZERO || amount > self.remaining() {
                return Err(());
            }
            self.paid += amount;
            Ok(())
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Across any payment sequence the invariant
        /// original = paid + remaining holds and remaining never goes
        /// negative
        #[test]
        fn prop_payment_sequence_preserves_amounts(
            original in 1i64..100000,
            payments in prop::collection::vec(1i64..5000, 1..40),
        ) {
            let mut debt = Debt {
                original: Decimal::from(original),
                paid: Decimal::ZERO,
            };

            for p in payments {
                let _ = debt.pay(Decimal::from(p));
                prop_assert!(debt.remaining() >= Decimal::ZERO);
                prop_assert_eq!(debt.paid + debt.remaining(), debt.original);
            }
        }

        /// Once settled, every further payment is rejected
        #[test]
        fn prop_settled_debt_rejects_payments(original in 1i64..10000, extra in 1i64..10000) {
            let mut debt = Debt {
                original: Decimal::from(original),
                paid: Decimal::ZERO,
            };
            debt.pay(Decimal::from(original)).unwrap();
            prop_assert_eq!(debt.remaining(), Decimal::ZERO);
            prop_assert!(debt.pay(Decimal::from(extra)).is_err());
        }
    }
}
