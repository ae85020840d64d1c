//! Route definitions for the ERP core API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - warehouse master data
        .nest("/warehouses", warehouse_routes())
        // Protected routes - inventory ledger
        .nest("/inventory", inventory_routes())
        // Protected routes - debts and payments
        .nest("/finance", finance_routes())
}

/// Warehouse master data routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route("/:warehouse_id", get(handlers::get_warehouse))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory ledger routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Movement documents
        .route("/imports", post(handlers::create_import))
        .route("/exports", post(handlers::create_export))
        .route("/transfers", post(handlers::create_transfer))
        // Transaction history
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/:transaction_id", get(handlers::get_transaction))
        // Balances
        .route(
            "/warehouses/:warehouse_id/balance",
            get(handlers::get_warehouse_balance),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Debt and payment routes (protected)
fn finance_routes() -> Router<AppState> {
    Router::new()
        // Debt records
        .route("/debts", get(handlers::list_debts).post(handlers::create_debt))
        .route("/debts/:debt_id", get(handlers::get_debt))
        .route(
            "/debts/:debt_id/payments",
            get(handlers::list_debt_payments).post(handlers::pay_debt),
        )
        // Lump payments spread across a partner's orders
        .route(
            "/partners/:partner_id/payments",
            post(handlers::allocate_partner_payment),
        )
        // Aggregate position per partner
        .route("/debt-summary", get(handlers::get_debt_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}
