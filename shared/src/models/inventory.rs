//! Inventory movement models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to the item a movement or balance row is about
///
/// A line always points at exactly one of a product or a material,
/// never both and never neither.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Product(Uuid),
    Material(Uuid),
}

impl ItemRef {
    /// Build from the two nullable foreign-key columns of a row
    pub fn from_columns(product_id: Option<Uuid>, material_id: Option<Uuid>) -> Option<Self> {
        match (product_id, material_id) {
            (Some(id), None) => Some(ItemRef::Product(id)),
            (None, Some(id)) => Some(ItemRef::Material(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ItemRef::Product(id) | ItemRef::Material(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemRef::Product(_) => "product",
            ItemRef::Material(_) => "material",
        }
    }
}

/// Types of inventory transactions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Goods received into a warehouse (phiếu nhập)
    Nhap,
    /// Goods issued out of a warehouse (phiếu xuất)
    Xuat,
    /// Goods moved between warehouses (phiếu chuyển)
    Chuyen,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Nhap => "NHAP",
            TransactionType::Xuat => "XUAT",
            TransactionType::Chuyen => "CHUYEN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NHAP" => Some(TransactionType::Nhap),
            "XUAT" => Some(TransactionType::Xuat),
            "CHUYEN" => Some(TransactionType::Chuyen),
            _ => None,
        }
    }

    /// Document code prefix for this transaction type
    pub fn code_prefix(&self) -> &'static str {
        match self {
            TransactionType::Nhap => "PN",
            TransactionType::Xuat => "PX",
            TransactionType::Chuyen => "CK",
        }
    }
}

/// Approval status of an inventory transaction
///
/// The ledger only ever creates `Pending` transactions; approval is a
/// separate workflow step that does not move stock again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "APPROVED" => Some(TransactionStatus::Approved),
            "REJECTED" => Some(TransactionStatus::Rejected),
            _ => None,
        }
    }
}
