//! HTTP surface of the salary tracker
//!
//! Thin axum handlers over [`budget::BudgetService`]. All accounting,
//! cycle and alert rules live in the `budget` crate.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use state::AppState;
