//! Validation rules for ERP inputs
//!
//! Pure checks shared by the backend services and their tests.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{DebtType, ItemRef, PaymentMethod};

// ============================================================================
// Amount and quantity validations
// ============================================================================

/// Movement quantities must be strictly positive
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Unit prices may be zero but never negative
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), &'static str> {
    if unit_price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}

/// Money amounts (debts, payments) must be strictly positive
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    Ok(())
}

/// A payment may never exceed what is still owed
///
/// Used for single-debt payments against the debt's remaining amount
/// and for lump payments against a partner's total outstanding amount.
pub fn validate_payment_within_remaining(
    payment: Decimal,
    remaining: Decimal,
) -> Result<(), &'static str> {
    if payment > remaining {
        return Err("Payment exceeds the remaining amount");
    }
    Ok(())
}

// ============================================================================
// Reference validations
// ============================================================================

/// Resolve the product/material pair of an input line into an item reference
///
/// Exactly one of the two ids must be set.
pub fn validate_item_ref(
    product_id: Option<Uuid>,
    material_id: Option<Uuid>,
) -> Result<ItemRef, &'static str> {
    ItemRef::from_columns(product_id, material_id)
        .ok_or("Exactly one of product_id or material_id must be set")
}

/// Check that a debt's partner reference matches its type
///
/// Receivables belong to a customer, payables to a supplier; the other
/// reference must be absent.
pub fn validate_debt_partner(
    debt_type: DebtType,
    customer_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
) -> Result<Uuid, &'static str> {
    match (debt_type, customer_id, supplier_id) {
        (DebtType::Receivable, Some(id), None) => Ok(id),
        (DebtType::Payable, None, Some(id)) => Ok(id),
        (DebtType::Receivable, _, _) => {
            Err("A receivable debt requires a customer and no supplier")
        }
        (DebtType::Payable, _, _) => Err("A payable debt requires a supplier and no customer"),
    }
}

/// Non-cash payments must name the bank account the money moves through
pub fn validate_payment_bank_account(
    method: PaymentMethod,
    bank_account_id: Option<Uuid>,
) -> Result<(), &'static str> {
    if method.requires_bank_account() && bank_account_id.is_none() {
        return Err("Bank account is required for non-cash payments");
    }
    Ok(())
}

// ============================================================================
// Code format validations
// ============================================================================

/// Validate warehouse code format (3-10 uppercase alphanumeric)
pub fn validate_warehouse_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Warehouse code must be at least 3 characters");
    }
    if code.len() > 10 {
        return Err("Warehouse code must be at most 10 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err("Warehouse code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate a user-supplied debt code (uppercase alphanumeric with dashes)
pub fn validate_debt_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 || code.len() > 30 {
        return Err("Debt code must be 3-30 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Debt code must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // Amount validation tests
    // ========================================================================

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(dec("0.5")).is_ok());
        assert!(validate_quantity(dec("100")).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec("12.50")).is_ok());
        assert!(validate_unit_price(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec("1")).is_ok());
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(dec("-500")).is_err());
    }

    #[test]
    fn test_validate_payment_within_remaining() {
        assert!(validate_payment_within_remaining(dec("250"), dec("250")).is_ok());
        assert!(validate_payment_within_remaining(dec("100"), dec("250")).is_ok());
        assert!(validate_payment_within_remaining(dec("250.01"), dec("250")).is_err());
    }

    // ========================================================================
    // Reference validation tests
    // ========================================================================

    #[test]
    fn test_validate_item_ref_product() {
        let id = Uuid::new_v4();
        assert_eq!(
            validate_item_ref(Some(id), None).unwrap(),
            ItemRef::Product(id)
        );
    }

    #[test]
    fn test_validate_item_ref_material() {
        let id = Uuid::new_v4();
        assert_eq!(
            validate_item_ref(None, Some(id)).unwrap(),
            ItemRef::Material(id)
        );
    }

    #[test]
    fn test_validate_item_ref_invalid() {
        let id = Uuid::new_v4();
        assert!(validate_item_ref(None, None).is_err());
        assert!(validate_item_ref(Some(id), Some(id)).is_err());
    }

    #[test]
    fn test_validate_debt_partner_receivable() {
        let customer = Uuid::new_v4();
        assert_eq!(
            validate_debt_partner(DebtType::Receivable, Some(customer), None).unwrap(),
            customer
        );
        assert!(validate_debt_partner(DebtType::Receivable, None, Some(customer)).is_err());
        assert!(validate_debt_partner(DebtType::Receivable, None, None).is_err());
    }

    #[test]
    fn test_validate_debt_partner_payable() {
        let supplier = Uuid::new_v4();
        assert_eq!(
            validate_debt_partner(DebtType::Payable, None, Some(supplier)).unwrap(),
            supplier
        );
        assert!(validate_debt_partner(DebtType::Payable, Some(supplier), None).is_err());
        assert!(
            validate_debt_partner(DebtType::Payable, Some(supplier), Some(supplier)).is_err()
        );
    }

    #[test]
    fn test_validate_payment_bank_account() {
        let account = Uuid::new_v4();
        assert!(validate_payment_bank_account(PaymentMethod::Cash, None).is_ok());
        assert!(validate_payment_bank_account(PaymentMethod::Bank, Some(account)).is_ok());
        assert!(validate_payment_bank_account(PaymentMethod::Bank, None).is_err());
        assert!(validate_payment_bank_account(PaymentMethod::Transfer, None).is_err());
    }

    // ========================================================================
    // Code format tests
    // ========================================================================

    #[test]
    fn test_validate_warehouse_code_valid() {
        assert!(validate_warehouse_code("KHO").is_ok());
        assert!(validate_warehouse_code("KHO01").is_ok());
        assert!(validate_warehouse_code("NVL1234567").is_ok());
    }

    #[test]
    fn test_validate_warehouse_code_invalid() {
        assert!(validate_warehouse_code("KH").is_err()); // Too short
        assert!(validate_warehouse_code("KHO12345678").is_err()); // Too long
        assert!(validate_warehouse_code("kho").is_err()); // Lowercase
        assert!(validate_warehouse_code("KH-1").is_err()); // Special char
    }

    #[test]
    fn test_validate_debt_code() {
        assert!(validate_debt_code("CN-2025-001").is_ok());
        assert!(validate_debt_code("PT001").is_ok());
        assert!(validate_debt_code("cn").is_err());
        assert!(validate_debt_code("CN 001").is_err());
    }

    // ========================================================================
    // Status derivation tests
    // ========================================================================

    #[test]
    fn test_payment_status_derivation() {
        use crate::models::PaymentStatus;

        assert_eq!(
            PaymentStatus::derive(Decimal::ZERO, dec("100")),
            PaymentStatus::Unpaid
        );
        assert_eq!(
            PaymentStatus::derive(dec("40"), dec("100")),
            PaymentStatus::Partial
        );
        assert_eq!(
            PaymentStatus::derive(dec("100"), dec("100")),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_debt_status_derivation() {
        use crate::models::DebtStatus;
        use chrono::NaiveDate;

        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();

        assert_eq!(
            DebtStatus::derive(Decimal::ZERO, dec("500"), None, today),
            DebtStatus::Pending
        );
        assert_eq!(
            DebtStatus::derive(dec("200"), dec("300"), Some(tomorrow), today),
            DebtStatus::Partial
        );
        assert_eq!(
            DebtStatus::derive(dec("500"), Decimal::ZERO, Some(yesterday), today),
            DebtStatus::Paid
        );
        assert_eq!(
            DebtStatus::derive(dec("200"), dec("300"), Some(yesterday), today),
            DebtStatus::Overdue
        );
        // Due exactly today is not overdue yet
        assert_eq!(
            DebtStatus::derive(Decimal::ZERO, dec("500"), Some(today), today),
            DebtStatus::Pending
        );
    }
}
