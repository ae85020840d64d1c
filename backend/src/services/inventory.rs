//! Inventory ledger service
//!
//! Records import/export/transfer documents and keeps per-warehouse item
//! balances consistent. Every mutating operation runs in a single
//! database transaction: either the header, all detail lines and all
//! balance changes commit together, or nothing does.
//!
//! Balances are applied at creation time for every transaction type;
//! the approval workflow only changes the document status and never
//! moves stock a second time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use shared::codes::{code_date_prefix, next_transaction_code};
use shared::models::{ItemRef, TransactionStatus, TransactionType};
use shared::validation::{validate_item_ref, validate_quantity, validate_unit_price};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Attempts before a document-code race surfaces as `DuplicateCode`
const CODE_RETRY_ATTEMPTS: u32 = 3;

/// Inventory service for managing stock movements and balances
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// One line of a movement request
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    pub product_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity: Decimal,
    /// Only meaningful for imports; defaults to zero
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for creating an import document
#[derive(Debug, Deserialize)]
pub struct CreateImportInput {
    pub to_warehouse_id: Uuid,
    pub items: Vec<ItemInput>,
    pub notes: Option<String>,
}

/// Input for creating an export document
#[derive(Debug, Deserialize)]
pub struct CreateExportInput {
    pub from_warehouse_id: Uuid,
    pub items: Vec<ItemInput>,
    pub notes: Option<String>,
}

/// Input for creating a transfer document
#[derive(Debug, Deserialize)]
pub struct CreateTransferInput {
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub items: Vec<ItemInput>,
    pub notes: Option<String>,
}

/// Reference to a freshly created document
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTransaction {
    pub id: Uuid,
    pub transaction_code: String,
}

/// A transaction header with its detail lines
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub code: String,
    pub transaction_type: TransactionType,
    pub from_warehouse_id: Option<Uuid>,
    pub to_warehouse_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetailView>,
}

/// A detail line of a transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetailView {
    pub id: Uuid,
    pub item: ItemRef,
    pub item_code: String,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

/// One balance row of a warehouse
#[derive(Debug, Clone, Serialize)]
pub struct BalanceDetail {
    pub item: ItemRef,
    pub item_code: String,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_value: Decimal,
}

/// Aggregate over one item kind in a warehouse
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    pub item_kind: String,
    pub item_count: i64,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
}

/// Balance view of a warehouse
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseBalance {
    pub warehouse_id: Uuid,
    pub details: Vec<BalanceDetail>,
    pub summary: Vec<BalanceSummary>,
}

/// Resolved movement line, validated and priced
struct ResolvedLine {
    item: ItemRef,
    item_code: String,
    item_name: String,
    quantity: Decimal,
    unit_price: Decimal,
    notes: Option<String>,
}

#[derive(Debug, FromRow)]
struct HeaderRow {
    id: Uuid,
    code: String,
    transaction_type: String,
    from_warehouse_id: Option<Uuid>,
    to_warehouse_id: Option<Uuid>,
    status: String,
    notes: Option<String>,
    created_by: Uuid,
    approved_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct DetailRow {
    id: Uuid,
    item_kind: String,
    item_id: Uuid,
    item_code: String,
    item_name: String,
    quantity: Decimal,
    unit_price: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
}

#[derive(Debug, FromRow)]
struct BalanceRow {
    item_kind: String,
    item_id: Uuid,
    item_code: String,
    item_name: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an import document (phiếu nhập) and increase balances
    pub async fn create_import(
        &self,
        caller: &AuthUser,
        input: CreateImportInput,
    ) -> AppResult<CreatedTransaction> {
        self.check_warehouse(input.to_warehouse_id, caller).await?;
        let lines = self.resolve_items(&input.items).await?;

        self.create_transaction(
            caller,
            TransactionType::Nhap,
            None,
            Some(input.to_warehouse_id),
            lines,
            input.notes,
        )
        .await
    }

    /// Create an export document (phiếu xuất), checking and decreasing
    /// source balances
    pub async fn create_export(
        &self,
        caller: &AuthUser,
        input: CreateExportInput,
    ) -> AppResult<CreatedTransaction> {
        self.check_warehouse(input.from_warehouse_id, caller).await?;
        let lines = self.resolve_items(&input.items).await?;

        self.create_transaction(
            caller,
            TransactionType::Xuat,
            Some(input.from_warehouse_id),
            None,
            lines,
            input.notes,
        )
        .await
    }

    /// Create a transfer document (phiếu chuyển kho) moving stock
    /// between two warehouses
    pub async fn create_transfer(
        &self,
        caller: &AuthUser,
        input: CreateTransferInput,
    ) -> AppResult<CreatedTransaction> {
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(AppError::Validation {
                field: "to_warehouse_id".to_string(),
                message: "Source and destination warehouses must differ".to_string(),
                message_vi: "Kho nguồn và kho đích phải khác nhau".to_string(),
            });
        }
        self.check_warehouse(input.from_warehouse_id, caller).await?;
        self.check_warehouse(input.to_warehouse_id, caller).await?;
        let lines = self.resolve_items(&input.items).await?;

        self.create_transaction(
            caller,
            TransactionType::Chuyen,
            Some(input.from_warehouse_id),
            Some(input.to_warehouse_id),
            lines,
            input.notes,
        )
        .await
    }

    /// Create the header, detail lines and balance effects atomically
    ///
    /// The document code is computed inside the transaction from the
    /// lexicographically last code of the day; the unique index on the
    /// code column turns a concurrent race into a retry.
    async fn create_transaction(
        &self,
        caller: &AuthUser,
        transaction_type: TransactionType,
        from_warehouse_id: Option<Uuid>,
        to_warehouse_id: Option<Uuid>,
        lines: Vec<ResolvedLine>,
        notes: Option<String>,
    ) -> AppResult<CreatedTransaction> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.db.begin().await?;

            let code = Self::next_code(&mut tx, transaction_type).await?;

            let inserted = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO inventory_transactions
                    (code, transaction_type, from_warehouse_id, to_warehouse_id, status, notes, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(&code)
            .bind(transaction_type.as_str())
            .bind(from_warehouse_id)
            .bind(to_warehouse_id)
            .bind(TransactionStatus::Pending.as_str())
            .bind(&notes)
            .bind(caller.user_id)
            .fetch_one(&mut *tx)
            .await;

            let transaction_id = match inserted {
                Ok(id) => id,
                Err(err) if AppError::is_unique_violation(&err) => {
                    tx.rollback().await?;
                    if attempt < CODE_RETRY_ATTEMPTS {
                        continue;
                    }
                    return Err(AppError::DuplicateCode(code));
                }
                Err(err) => return Err(err.into()),
            };

            for line in &lines {
                sqlx::query(
                    r#"
                    INSERT INTO inventory_transaction_details
                        (transaction_id, item_kind, item_id, quantity, unit_price, total_amount, notes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(transaction_id)
                .bind(line.item.kind())
                .bind(line.item.id())
                .bind(line.quantity)
                .bind(line.unit_price)
                .bind(line.quantity * line.unit_price)
                .bind(&line.notes)
                .execute(&mut *tx)
                .await?;
            }

            // Balance effects: out side first so an insufficient line
            // aborts before anything is credited
            if let Some(warehouse_id) = from_warehouse_id {
                Self::debit_balances(&mut tx, warehouse_id, &lines).await?;
            }
            if let Some(warehouse_id) = to_warehouse_id {
                Self::credit_balances(&mut tx, warehouse_id, &lines).await?;
            }

            tx.commit().await?;

            tracing::info!(
                code = %code,
                transaction_type = transaction_type.as_str(),
                lines = lines.len(),
                "inventory transaction created"
            );

            return Ok(CreatedTransaction {
                id: transaction_id,
                transaction_code: code,
            });
        }
    }

    /// Compute the next document code for today inside the transaction
    async fn next_code(
        tx: &mut Transaction<'_, Postgres>,
        transaction_type: TransactionType,
    ) -> AppResult<String> {
        let today = Utc::now().date_naive();
        let prefix = transaction_type.code_prefix();
        let pattern = format!("{}%", code_date_prefix(prefix, today));

        let last_code = sqlx::query_scalar::<_, String>(
            "SELECT code FROM inventory_transactions WHERE code LIKE $1 ORDER BY code DESC LIMIT 1",
        )
        .bind(&pattern)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(next_transaction_code(prefix, today, last_code.as_deref()))
    }

    /// Check stock and subtract each line from the warehouse balance
    ///
    /// Balance rows are locked before the check so concurrent exports of
    /// the same item serialize instead of racing into negative stock.
    async fn debit_balances(
        tx: &mut Transaction<'_, Postgres>,
        warehouse_id: Uuid,
        lines: &[ResolvedLine],
    ) -> AppResult<()> {
        for line in lines {
            let on_hand = sqlx::query_scalar::<_, Decimal>(
                r#"
                SELECT quantity FROM stock_balances
                WHERE warehouse_id = $1 AND item_kind = $2 AND item_id = $3
                FOR UPDATE
                "#,
            )
            .bind(warehouse_id)
            .bind(line.item.kind())
            .bind(line.item.id())
            .fetch_optional(&mut **tx)
            .await?
            .unwrap_or(Decimal::ZERO);

            if on_hand < line.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "{} ({}) has {} on hand, requested {}",
                    line.item_name, line.item_code, on_hand, line.quantity
                )));
            }

            sqlx::query(
                r#"
                UPDATE stock_balances
                SET quantity = quantity - $4, updated_at = now()
                WHERE warehouse_id = $1 AND item_kind = $2 AND item_id = $3
                "#,
            )
            .bind(warehouse_id)
            .bind(line.item.kind())
            .bind(line.item.id())
            .bind(line.quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Add each line to the warehouse balance, creating rows lazily
    async fn credit_balances(
        tx: &mut Transaction<'_, Postgres>,
        warehouse_id: Uuid,
        lines: &[ResolvedLine],
    ) -> AppResult<()> {
        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO stock_balances (warehouse_id, item_kind, item_id, quantity)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (warehouse_id, item_kind, item_id)
                DO UPDATE SET quantity = stock_balances.quantity + EXCLUDED.quantity,
                              updated_at = now()
                "#,
            )
            .bind(warehouse_id)
            .bind(line.item.kind())
            .bind(line.item.id())
            .bind(line.quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Get the balance view of a warehouse
    ///
    /// `show_all` lists every master item of the warehouse's kind with
    /// zero-filled quantities; otherwise only rows with stock on hand.
    pub async fn get_balance(
        &self,
        caller: &AuthUser,
        warehouse_id: Uuid,
        show_all: bool,
    ) -> AppResult<WarehouseBalance> {
        let warehouse_type = self.check_warehouse(warehouse_id, caller).await?;

        let rows = if show_all {
            let (table, kind) = match warehouse_type.as_str() {
                "MATERIAL" => ("materials", "material"),
                _ => ("products", "product"),
            };
            sqlx::query_as::<_, BalanceRow>(&format!(
                r#"
                SELECT '{kind}' AS item_kind, i.id AS item_id, i.code AS item_code,
                       i.name AS item_name, COALESCE(b.quantity, 0) AS quantity, i.unit_price
                FROM {table} i
                LEFT JOIN stock_balances b
                       ON b.item_kind = '{kind}' AND b.item_id = i.id AND b.warehouse_id = $1
                WHERE i.branch_id = $2
                ORDER BY i.code
                "#
            ))
            .bind(warehouse_id)
            .bind(caller.branch_id)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, BalanceRow>(
                r#"
                SELECT b.item_kind, b.item_id,
                       COALESCE(p.code, m.code) AS item_code,
                       COALESCE(p.name, m.name) AS item_name,
                       b.quantity,
                       COALESCE(p.unit_price, m.unit_price, 0) AS unit_price
                FROM stock_balances b
                LEFT JOIN products p ON b.item_kind = 'product' AND p.id = b.item_id
                LEFT JOIN materials m ON b.item_kind = 'material' AND m.id = b.item_id
                WHERE b.warehouse_id = $1 AND b.quantity > 0
                ORDER BY 3
                "#,
            )
            .bind(warehouse_id)
            .fetch_all(&self.db)
            .await?
        };

        let details: Vec<BalanceDetail> = rows
            .into_iter()
            .filter_map(|r| {
                let item = match r.item_kind.as_str() {
                    "product" => ItemRef::Product(r.item_id),
                    "material" => ItemRef::Material(r.item_id),
                    _ => return None,
                };
                Some(BalanceDetail {
                    item,
                    item_code: r.item_code,
                    item_name: r.item_name,
                    quantity: r.quantity,
                    unit_price: r.unit_price,
                    total_value: r.quantity * r.unit_price,
                })
            })
            .collect();

        let mut by_kind: HashMap<&'static str, BalanceSummary> = HashMap::new();
        for detail in &details {
            let entry = by_kind
                .entry(detail.item.kind())
                .or_insert_with(|| BalanceSummary {
                    item_kind: detail.item.kind().to_string(),
                    item_count: 0,
                    total_quantity: Decimal::ZERO,
                    total_value: Decimal::ZERO,
                });
            entry.item_count += 1;
            entry.total_quantity += detail.quantity;
            entry.total_value += detail.total_value;
        }
        let mut summary: Vec<BalanceSummary> = by_kind.into_values().collect();
        summary.sort_by(|a, b| a.item_kind.cmp(&b.item_kind));

        Ok(WarehouseBalance {
            warehouse_id,
            details,
            summary,
        })
    }

    /// Get a transaction with its detail lines
    pub async fn get_transaction(&self, transaction_id: Uuid) -> AppResult<TransactionView> {
        let header = sqlx::query_as::<_, HeaderRow>(
            r#"
            SELECT id, code, transaction_type, from_warehouse_id, to_warehouse_id,
                   status, notes, created_by, approved_by, created_at
            FROM inventory_transactions
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory transaction".to_string()))?;

        let details = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT d.id, d.item_kind, d.item_id,
                   COALESCE(p.code, m.code) AS item_code,
                   COALESCE(p.name, m.name) AS item_name,
                   d.quantity, d.unit_price, d.total_amount, d.notes
            FROM inventory_transaction_details d
            LEFT JOIN products p ON d.item_kind = 'product' AND p.id = d.item_id
            LEFT JOIN materials m ON d.item_kind = 'material' AND m.id = d.item_id
            WHERE d.transaction_id = $1
            ORDER BY d.id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.db)
        .await?;

        Self::build_view(header, details)
    }

    /// List recent transactions, newest first
    pub async fn list_transactions(
        &self,
        transaction_type: Option<TransactionType>,
        limit: i64,
    ) -> AppResult<Vec<TransactionView>> {
        let headers = sqlx::query_as::<_, HeaderRow>(
            r#"
            SELECT id, code, transaction_type, from_warehouse_id, to_warehouse_id,
                   status, notes, created_by, approved_by, created_at
            FROM inventory_transactions
            WHERE ($1::text IS NULL OR transaction_type = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(transaction_type.map(|t| t.as_str()))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let mut views = Vec::with_capacity(headers.len());
        for header in headers {
            let details = sqlx::query_as::<_, DetailRow>(
                r#"
                SELECT d.id, d.item_kind, d.item_id,
                       COALESCE(p.code, m.code) AS item_code,
                       COALESCE(p.name, m.name) AS item_name,
                       d.quantity, d.unit_price, d.total_amount, d.notes
                FROM inventory_transaction_details d
                LEFT JOIN products p ON d.item_kind = 'product' AND p.id = d.item_id
                LEFT JOIN materials m ON d.item_kind = 'material' AND m.id = d.item_id
                WHERE d.transaction_id = $1
                ORDER BY d.id
                "#,
            )
            .bind(header.id)
            .fetch_all(&self.db)
            .await?;
            views.push(Self::build_view(header, details)?);
        }
        Ok(views)
    }

    fn build_view(header: HeaderRow, details: Vec<DetailRow>) -> AppResult<TransactionView> {
        let transaction_type = TransactionType::from_str(&header.transaction_type)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Unknown transaction type {}",
                    header.transaction_type
                ))
            })?;
        let status = TransactionStatus::from_str(&header.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown status {}", header.status)))?;

        let details = details
            .into_iter()
            .map(|d| {
                let item = match d.item_kind.as_str() {
                    "product" => ItemRef::Product(d.item_id),
                    "material" => ItemRef::Material(d.item_id),
                    other => {
                        return Err(AppError::Internal(format!("Unknown item kind {}", other)))
                    }
                };
                Ok(TransactionDetailView {
                    id: d.id,
                    item,
                    item_code: d.item_code,
                    item_name: d.item_name,
                    quantity: d.quantity,
                    unit_price: d.unit_price,
                    total_amount: d.total_amount,
                    notes: d.notes,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(TransactionView {
            id: header.id,
            code: header.code,
            transaction_type,
            from_warehouse_id: header.from_warehouse_id,
            to_warehouse_id: header.to_warehouse_id,
            status,
            notes: header.notes,
            created_by: header.created_by,
            approved_by: header.approved_by,
            created_at: header.created_at,
            details,
        })
    }

    /// Check that the warehouse exists in the caller's branch
    ///
    /// Returns the warehouse type; cross-branch warehouses are reported
    /// as not found.
    async fn check_warehouse(&self, warehouse_id: Uuid, caller: &AuthUser) -> AppResult<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT warehouse_type FROM warehouses WHERE id = $1 AND branch_id = $2",
        )
        .bind(warehouse_id)
        .bind(caller.branch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Validate the request lines and resolve item names
    ///
    /// Fails fast on an empty document, a bad product/material pair, a
    /// non-positive quantity or an unknown item.
    async fn resolve_items(&self, items: &[ItemInput]) -> AppResult<Vec<ResolvedLine>> {
        if items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one item is required".to_string(),
                message_vi: "Cần ít nhất một mặt hàng".to_string(),
            });
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let item_ref = validate_item_ref(item.product_id, item.material_id).map_err(|e| {
                AppError::Validation {
                    field: "items".to_string(),
                    message: e.to_string(),
                    message_vi: "Mỗi dòng phải chỉ định đúng một sản phẩm hoặc nguyên liệu"
                        .to_string(),
                }
            })?;
            validate_quantity(item.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_vi: "Số lượng phải lớn hơn 0".to_string(),
            })?;
            let unit_price = item.unit_price.unwrap_or(Decimal::ZERO);
            validate_unit_price(unit_price).map_err(|e| AppError::Validation {
                field: "unit_price".to_string(),
                message: e.to_string(),
                message_vi: "Đơn giá không được âm".to_string(),
            })?;

            let (table, label) = match item_ref {
                ItemRef::Product(_) => ("products", "Product"),
                ItemRef::Material(_) => ("materials", "Material"),
            };
            let row = sqlx::query_as::<_, (String, String)>(&format!(
                "SELECT code, name FROM {table} WHERE id = $1"
            ))
            .bind(item_ref.id())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(label.to_string()))?;

            lines.push(ResolvedLine {
                item: item_ref,
                item_code: row.0,
                item_name: row.1,
                quantity: item.quantity,
                unit_price,
                notes: item.notes.clone(),
            });
        }
        Ok(lines)
    }
}
