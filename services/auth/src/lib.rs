//! Account onboarding for the salary tracker
//!
//! One-time-code signup, password login and push token registration. A
//! successful signup goes through [`budget::BudgetService::register_account`]
//! so every account starts with an open salary cycle.

pub mod config;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod password;
pub mod rate_limiter;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::AuthConfig;
pub use state::AppState;
