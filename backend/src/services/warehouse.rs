//! Warehouse master data service

use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{Warehouse, WarehouseType};
use shared::validation::validate_warehouse_code;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Input for registering a warehouse
///
/// The type is set here once and never changes afterwards.
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub code: String,
    pub name: String,
    pub warehouse_type: WarehouseType,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    code: String,
    name: String,
    warehouse_type: String,
    branch_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

const WAREHOUSE_COLUMNS: &str =
    "id, code, name, warehouse_type, branch_id, created_at, updated_at";

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a warehouse under the caller's branch
    pub async fn create_warehouse(
        &self,
        caller: &AuthUser,
        input: CreateWarehouseInput,
    ) -> AppResult<Warehouse> {
        validate_warehouse_code(&input.code).map_err(|e| AppError::Validation {
            field: "code".to_string(),
            message: e.to_string(),
            message_vi: "Mã kho không hợp lệ".to_string(),
        })?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Warehouse name must not be empty".to_string(),
                message_vi: "Tên kho không được để trống".to_string(),
            });
        }

        let row = sqlx::query_as::<_, WarehouseRow>(&format!(
            r#"
            INSERT INTO warehouses (id, code, name, warehouse_type, branch_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.code)
        .bind(input.name.trim())
        .bind(input.warehouse_type.as_str())
        .bind(caller.branch_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if AppError::is_unique_violation(&e) {
                AppError::DuplicateCode(input.code.clone())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tracing::info!(code = %row.code, caller = %caller.user_id, "warehouse created");
        Self::to_warehouse(row)
    }

    /// List warehouses in the caller's branch
    pub async fn list_warehouses(&self, caller: &AuthUser) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE branch_id = $1 ORDER BY code"
        ))
        .bind(caller.branch_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Self::to_warehouse).collect()
    }

    /// Get a single warehouse scoped to the caller's branch
    pub async fn get_warehouse(&self, caller: &AuthUser, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1 AND branch_id = $2"
        ))
        .bind(warehouse_id)
        .bind(caller.branch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        Self::to_warehouse(row)
    }

    fn to_warehouse(row: WarehouseRow) -> AppResult<Warehouse> {
        let warehouse_type = WarehouseType::from_str(&row.warehouse_type).ok_or_else(|| {
            AppError::Internal(format!("unknown warehouse type: {}", row.warehouse_type))
        })?;
        Ok(Warehouse {
            id: row.id,
            code: row.code,
            name: row.name,
            warehouse_type,
            branch_id: row.branch_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
