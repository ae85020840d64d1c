//! Debt management service
//!
//! Tracks receivable/payable debt records and the payments applied to
//! them. Every mutation keeps three things consistent in one database
//! transaction: the debt's paid/remaining amounts, the partner's
//! aggregate debt figure, and (for non-cash payments) the bank account
//! balance.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{Debt, DebtPayment, DebtStatus, DebtType, PaymentMethod};
use shared::validation::{
    validate_amount, validate_debt_code, validate_debt_partner, validate_payment_bank_account,
    validate_payment_within_remaining,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Debt service for managing debt records and payments
#[derive(Clone)]
pub struct DebtService {
    db: PgPool,
}

/// Input for creating a debt record
#[derive(Debug, Deserialize)]
pub struct CreateDebtInput {
    pub code: String,
    pub debt_type: DebtType,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub original_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
}

/// Input for paying down a debt
#[derive(Debug, Deserialize)]
pub struct PayDebtInput {
    pub payment_amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
struct DebtRow {
    id: Uuid,
    code: String,
    debt_type: String,
    customer_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    original_amount: Decimal,
    paid_amount: Decimal,
    remaining_amount: Decimal,
    due_date: Option<NaiveDate>,
    status: String,
    reference_id: Option<Uuid>,
    reference_type: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    debt_id: Uuid,
    payment_amount: Decimal,
    payment_date: NaiveDate,
    payment_method: String,
    bank_account_id: Option<Uuid>,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

const DEBT_COLUMNS: &str = "id, code, debt_type, customer_id, supplier_id, original_amount, \
     paid_amount, remaining_amount, due_date, status, reference_id, reference_type, notes, \
     created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, debt_id, payment_amount, payment_date, payment_method, \
     bank_account_id, notes, created_by, created_at";

impl DebtService {
    /// Create a new DebtService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a debt record and raise the partner's aggregate debt
    pub async fn create_debt(&self, caller: &AuthUser, input: CreateDebtInput) -> AppResult<Debt> {
        validate_debt_code(&input.code).map_err(|e| AppError::Validation {
            field: "code".to_string(),
            message: e.to_string(),
            message_vi: "Mã công nợ không hợp lệ".to_string(),
        })?;
        validate_amount(input.original_amount).map_err(|e| AppError::Validation {
            field: "original_amount".to_string(),
            message: e.to_string(),
            message_vi: "Số tiền phải lớn hơn 0".to_string(),
        })?;
        let partner_id =
            validate_debt_partner(input.debt_type, input.customer_id, input.supplier_id).map_err(
                |e| AppError::Validation {
                    field: "customer_id/supplier_id".to_string(),
                    message: e.to_string(),
                    message_vi: "Đối tác không khớp với loại công nợ".to_string(),
                },
            )?;

        let partner_table = match input.debt_type {
            DebtType::Receivable => "customers",
            DebtType::Payable => "suppliers",
        };

        let mut tx = self.db.begin().await?;

        // Lock the partner row; its aggregate moves with the debt
        let partner_exists = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM {partner_table} WHERE id = $1 FOR UPDATE"
        ))
        .bind(partner_id)
        .fetch_optional(&mut *tx)
        .await?;
        if partner_exists.is_none() {
            return Err(AppError::NotFound(
                match input.debt_type {
                    DebtType::Receivable => "Customer",
                    DebtType::Payable => "Supplier",
                }
                .to_string(),
            ));
        }

        let inserted = sqlx::query_as::<_, DebtRow>(&format!(
            r#"
            INSERT INTO debts
                (code, debt_type, customer_id, supplier_id, original_amount, paid_amount,
                 remaining_amount, due_date, status, reference_id, reference_type, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, 0, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {DEBT_COLUMNS}
            "#
        ))
        .bind(&input.code)
        .bind(input.debt_type.as_str())
        .bind(input.customer_id)
        .bind(input.supplier_id)
        .bind(input.original_amount)
        .bind(input.due_date)
        .bind(DebtStatus::Pending.as_str())
        .bind(input.reference_id)
        .bind(&input.reference_type)
        .bind(&input.notes)
        .bind(caller.user_id)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(err) if AppError::is_unique_violation(&err) => {
                return Err(AppError::DuplicateCode(input.code));
            }
            Err(err) => return Err(err.into()),
        };

        sqlx::query(&format!(
            "UPDATE {partner_table} SET debt_amount = debt_amount + $2, updated_at = now() WHERE id = $1"
        ))
        .bind(partner_id)
        .bind(input.original_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(code = %row.code, amount = %row.original_amount, "debt created");
        Self::to_debt(row)
    }

    /// Apply a payment to a debt
    ///
    /// Rejects amounts above the debt's remaining amount; otherwise
    /// inserts the immutable payment row, moves the debt's amounts and
    /// status, lowers the partner aggregate and adjusts the bank balance
    /// for non-cash payments, all in one transaction.
    pub async fn pay_debt(
        &self,
        caller: &AuthUser,
        debt_id: Uuid,
        input: PayDebtInput,
    ) -> AppResult<DebtPayment> {
        validate_amount(input.payment_amount).map_err(|e| AppError::Validation {
            field: "payment_amount".to_string(),
            message: e.to_string(),
            message_vi: "Số tiền thanh toán phải lớn hơn 0".to_string(),
        })?;
        validate_payment_bank_account(input.payment_method, input.bank_account_id).map_err(
            |e| AppError::Validation {
                field: "bank_account_id".to_string(),
                message: e.to_string(),
                message_vi: "Thanh toán không dùng tiền mặt cần tài khoản ngân hàng".to_string(),
            },
        )?;

        let mut tx = self.db.begin().await?;

        let debt = sqlx::query_as::<_, DebtRow>(&format!(
            "SELECT {DEBT_COLUMNS} FROM debts WHERE id = $1 FOR UPDATE"
        ))
        .bind(debt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Debt".to_string()))?;

        if validate_payment_within_remaining(input.payment_amount, debt.remaining_amount).is_err()
        {
            return Err(AppError::Overpayment(format!(
                "Payment {} exceeds remaining amount {} of debt {}",
                input.payment_amount, debt.remaining_amount, debt.code
            )));
        }

        let debt_type = DebtType::from_str(&debt.debt_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown debt type {}", debt.debt_type)))?;

        let payment = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            INSERT INTO debt_payments
                (debt_id, payment_amount, payment_date, payment_method, bank_account_id, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(debt_id)
        .bind(input.payment_amount)
        .bind(input.payment_date)
        .bind(input.payment_method.as_str())
        .bind(input.bank_account_id)
        .bind(&input.notes)
        .bind(caller.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let new_paid = debt.paid_amount + input.payment_amount;
        let new_remaining = debt.original_amount - new_paid;
        let new_status = DebtStatus::derive(
            new_paid,
            new_remaining,
            debt.due_date,
            Utc::now().date_naive(),
        );

        sqlx::query(
            r#"
            UPDATE debts
            SET paid_amount = $2, remaining_amount = $3, status = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(debt_id)
        .bind(new_paid)
        .bind(new_remaining)
        .bind(new_status.as_str())
        .execute(&mut *tx)
        .await?;

        let (partner_table, partner_id) = match debt_type {
            DebtType::Receivable => ("customers", debt.customer_id),
            DebtType::Payable => ("suppliers", debt.supplier_id),
        };
        if let Some(partner_id) = partner_id {
            sqlx::query(&format!(
                "UPDATE {partner_table} SET debt_amount = debt_amount - $2, updated_at = now() WHERE id = $1"
            ))
            .bind(partner_id)
            .bind(input.payment_amount)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(bank_account_id) = input.bank_account_id {
            let delta = debt_type.bank_delta(input.payment_amount);
            Self::adjust_bank_balance(&mut tx, bank_account_id, delta).await?;
        }

        tx.commit().await?;

        tracing::info!(
            debt = %debt.code,
            amount = %input.payment_amount,
            status = new_status.as_str(),
            "debt payment recorded"
        );
        Self::to_payment(payment)
    }

    /// Get a debt by id
    pub async fn get_debt(&self, debt_id: Uuid) -> AppResult<Debt> {
        let row = sqlx::query_as::<_, DebtRow>(&format!(
            "SELECT {DEBT_COLUMNS} FROM debts WHERE id = $1"
        ))
        .bind(debt_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Debt".to_string()))?;
        Self::to_debt(row)
    }

    /// List debts, optionally filtered by type, newest first
    pub async fn list_debts(
        &self,
        debt_type: Option<DebtType>,
        limit: i64,
    ) -> AppResult<Vec<Debt>> {
        let rows = sqlx::query_as::<_, DebtRow>(&format!(
            r#"
            SELECT {DEBT_COLUMNS} FROM debts
            WHERE ($1::text IS NULL OR debt_type = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(debt_type.map(|t| t.as_str()))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Self::to_debt).collect()
    }

    /// List payments of a debt, newest first
    pub async fn list_payments(&self, debt_id: Uuid) -> AppResult<Vec<DebtPayment>> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM debts WHERE id = $1)")
            .bind(debt_id)
            .fetch_one(&self.db)
            .await?;
        if !exists {
            return Err(AppError::NotFound("Debt".to_string()));
        }

        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM debt_payments
            WHERE debt_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(debt_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Self::to_payment).collect()
    }

    /// Lock a bank account row and move its balance
    async fn adjust_bank_balance(
        tx: &mut Transaction<'_, Postgres>,
        bank_account_id: Uuid,
        delta: Decimal,
    ) -> AppResult<()> {
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM bank_accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(bank_account_id)
        .fetch_optional(&mut **tx)
        .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Bank account".to_string()));
        }

        sqlx::query(
            "UPDATE bank_accounts SET balance = balance + $2, updated_at = now() WHERE id = $1",
        )
        .bind(bank_account_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    fn to_debt(row: DebtRow) -> AppResult<Debt> {
        let debt_type = DebtType::from_str(&row.debt_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown debt type {}", row.debt_type)))?;
        let status = DebtStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown debt status {}", row.status)))?;
        Ok(Debt {
            id: row.id,
            code: row.code,
            debt_type,
            customer_id: row.customer_id,
            supplier_id: row.supplier_id,
            original_amount: row.original_amount,
            paid_amount: row.paid_amount,
            remaining_amount: row.remaining_amount,
            due_date: row.due_date,
            status,
            reference_id: row.reference_id,
            reference_type: row.reference_type,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn to_payment(row: PaymentRow) -> AppResult<DebtPayment> {
        let payment_method = PaymentMethod::from_str(&row.payment_method).ok_or_else(|| {
            AppError::Internal(format!("Unknown payment method {}", row.payment_method))
        })?;
        Ok(DebtPayment {
            id: row.id,
            debt_id: row.debt_id,
            payment_amount: row.payment_amount,
            payment_date: row.payment_date,
            payment_method,
            bank_account_id: row.bank_account_id,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}
