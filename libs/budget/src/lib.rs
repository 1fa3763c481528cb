//! Salary-cycle expense accounting and budget alerts
//!
//! Every expense is bound, at insertion time, to the cycle that is current
//! for its owner. Totals are always computed over the current cycle only,
//! and each alert level fires at most once per cycle.
//!
//! [`BudgetService`] is the entry point the HTTP services talk to. Storage
//! sits behind [`store::BudgetStore`] with a PostgreSQL implementation for
//! production and an in-memory one for tests.

pub mod accounting;
pub mod alert;
pub mod error;
pub mod locks;
pub mod models;
pub mod notify;
pub mod service;
pub mod store;

pub use accounting::CycleSummary;
pub use alert::AlertLevel;
pub use error::{BudgetError, BudgetResult};
pub use service::{BudgetService, ExpenseReceipt};
