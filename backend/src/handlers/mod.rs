//! HTTP handlers for the ERP core API

pub mod debt;
pub mod health;
pub mod inventory;
pub mod partner;
pub mod warehouse;

pub use debt::*;
pub use health::*;
pub use inventory::*;
pub use partner::*;
pub use warehouse::*;
