//! Warehouse models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of goods a warehouse holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseType {
    Material,
    FinishedGood,
}

impl WarehouseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseType::Material => "MATERIAL",
            WarehouseType::FinishedGood => "FINISHED_GOOD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MATERIAL" => Some(WarehouseType::Material),
            "FINISHED_GOOD" => Some(WarehouseType::FinishedGood),
            _ => None,
        }
    }
}

/// A warehouse belonging to a branch
///
/// The warehouse type is fixed at creation; a material warehouse never
/// becomes a finished-good warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub warehouse_type: WarehouseType,
    pub branch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
