//! Shared types and models for the ERP platform
//!
//! This crate contains the domain model and the pure business rules
//! (status derivation, payment allocation, document code generation)
//! shared between the backend and its tests.

pub mod allocation;
pub mod codes;
pub mod models;
pub mod validation;

pub use allocation::*;
pub use codes::*;
pub use models::*;
pub use validation::*;
