//! Business logic services for the ERP core

pub mod debt;
pub mod inventory;
pub mod partner;
pub mod warehouse;

pub use debt::DebtService;
pub use inventory::InventoryService;
pub use partner::PartnerService;
pub use warehouse::WarehouseService;
