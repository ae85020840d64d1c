//! Domain models for the ERP platform

mod debt;
mod inventory;
mod partner;
mod warehouse;

pub use debt::*;
pub use inventory::*;
pub use partner::*;
pub use warehouse::*;
