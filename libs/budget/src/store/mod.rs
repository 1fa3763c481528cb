//! Cycle store and expense ledger persistence
//!
//! Two write paths carry the atomicity the accounting relies on:
//! - [`BudgetStore::open_cycle`] inserts a cycle and retargets the owner's
//!   pointer as one unit.
//! - [`BudgetStore::insert_expense`] reads the pointer and inserts the expense
//!   stamped with it as one unit.
//!
//! Implementations must also make [`BudgetStore::record_alert`] a
//! compare-and-raise on the cycle's alert watermark.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::alert::AlertLevel;
use crate::error::BudgetResult;
use crate::models::{
    AlertRecord, Expense, NewAccount, NewExpense, NewNotification, SalaryCycle, UserAccount,
};

pub use memory::InMemoryStore;
pub use postgres::PgBudgetStore;

#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered
    async fn create_user(&self, account: &NewAccount) -> BudgetResult<UserAccount>;

    /// Remove a user with everything they own
    async fn delete_user(&self, user_id: Uuid) -> BudgetResult<()>;

    async fn find_user(&self, user_id: Uuid) -> BudgetResult<Option<UserAccount>>;

    async fn find_user_by_email(&self, email: &str) -> BudgetResult<Option<UserAccount>>;

    /// Returns false for an unknown user
    async fn update_push_token(&self, user_id: Uuid, token: &str) -> BudgetResult<bool>;

    /// Change the salary baseline; returns false for an unknown user
    async fn update_salary(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<bool>;

    /// Create a cycle and make it the owner's current one
    ///
    /// Fails with `NotFound` for an unknown user. On any failure neither the
    /// cycle nor the pointer change is visible.
    async fn open_cycle(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<SalaryCycle>;

    async fn current_cycle(&self, user_id: Uuid) -> BudgetResult<Option<SalaryCycle>>;

    async fn find_cycle(&self, cycle_id: Uuid) -> BudgetResult<Option<SalaryCycle>>;

    /// All cycles of a user, most recent first
    async fn list_cycles(&self, user_id: Uuid) -> BudgetResult<Vec<SalaryCycle>>;

    /// Append an expense bound to the owner's current cycle
    ///
    /// Fails with `NotFound` when the user is unknown or has no current cycle.
    async fn insert_expense(&self, expense: &NewExpense) -> BudgetResult<Expense>;

    async fn find_expense(&self, expense_id: Uuid) -> BudgetResult<Option<Expense>>;

    /// Returns false when nothing was deleted
    async fn delete_expense(&self, expense_id: Uuid) -> BudgetResult<bool>;

    /// Expenses bound to a cycle, newest expense date first
    async fn cycle_expenses(&self, cycle_id: Uuid) -> BudgetResult<Vec<Expense>>;

    /// Every expense of a user across cycles, newest expense date first
    async fn user_expenses(&self, user_id: Uuid) -> BudgetResult<Vec<Expense>>;

    async fn cycle_spent(&self, cycle_id: Uuid) -> BudgetResult<Decimal>;

    async fn cycle_category_totals(&self, cycle_id: Uuid) -> BudgetResult<Vec<(String, Decimal)>>;

    async fn alert_watermark(&self, cycle_id: Uuid) -> BudgetResult<Option<AlertLevel>>;

    /// Raise the cycle watermark to `level` and append the alert, atomically
    ///
    /// Returns `None` without writing anything when the watermark is already
    /// at or above `level`.
    async fn record_alert(
        &self,
        cycle_id: Uuid,
        level: AlertLevel,
        alert: &NewNotification,
    ) -> BudgetResult<Option<AlertRecord>>;

    async fn insert_notification(&self, notification: &NewNotification)
    -> BudgetResult<AlertRecord>;

    /// Notifications of a user, newest first
    async fn list_notifications(&self, user_id: Uuid) -> BudgetResult<Vec<AlertRecord>>;
}
