//! In-memory budget store
//!
//! Keeps every table behind one mutex, which makes each trait call atomic.
//! Used by tests across the workspace; it can be told to fail cycle opens,
//! skip pointer moves or fail alert writes to exercise the error paths.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseError;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::BudgetStore;
use crate::alert::AlertLevel;
use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AlertRecord, Expense, NewAccount, NewExpense, NewNotification, SalaryCycle, UserAccount,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserAccount>,
    // Insertion order is chronological order.
    cycles: Vec<SalaryCycle>,
    expenses: Vec<Expense>,
    watermarks: HashMap<Uuid, AlertLevel>,
    notifications: Vec<AlertRecord>,
    failing_cycle_opens: u32,
    skipped_retargets: u32,
    failing_alerts: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `open_cycle` fail before writing anything
    pub fn fail_next_cycle_opens(&self, count: u32) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.failing_cycle_opens = count;
        }
    }

    /// Make the next `count` calls to `open_cycle` insert the cycle but leave
    /// the owner's pointer where it was
    pub fn skip_next_retargets(&self, count: u32) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.skipped_retargets = count;
        }
    }

    /// Make `record_alert` fail until switched off again
    pub fn fail_alert_records(&self, failing: bool) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.failing_alerts = failing;
        }
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().map(|t| t.users.len()).unwrap_or(0)
    }

    fn tables(&self) -> BudgetResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| unavailable("in-memory store lock poisoned"))
    }
}

fn unavailable(reason: &str) -> BudgetError {
    BudgetError::Storage(DatabaseError::Unavailable(reason.to_string()))
}

fn newest_first(mut expenses: Vec<Expense>) -> Vec<Expense> {
    expenses.reverse();
    // Stable, so equal dates keep newest-inserted first.
    expenses.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));
    expenses
}

#[async_trait]
impl BudgetStore for InMemoryStore {
    async fn create_user(&self, account: &NewAccount) -> BudgetResult<UserAccount> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == account.email) {
            return Err(BudgetError::Conflict(format!(
                "email {} is already registered",
                account.email
            )));
        }
        let user = UserAccount {
            id: Uuid::new_v4(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            salary: account.salary,
            push_token: account.push_token.clone(),
            current_cycle_id: None,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> BudgetResult<()> {
        let mut tables = self.tables()?;
        tables.users.remove(&user_id);
        let owned: Vec<Uuid> = tables
            .cycles
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();
        tables.cycles.retain(|c| c.user_id != user_id);
        tables.expenses.retain(|e| e.user_id != user_id);
        tables.notifications.retain(|n| n.user_id != user_id);
        for cycle_id in owned {
            tables.watermarks.remove(&cycle_id);
        }
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> BudgetResult<Option<UserAccount>> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> BudgetResult<Option<UserAccount>> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_push_token(&self, user_id: Uuid, token: &str) -> BudgetResult<bool> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.push_token = Some(token.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_salary(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<bool> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.salary = salary;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn open_cycle(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<SalaryCycle> {
        let mut tables = self.tables()?;
        if tables.failing_cycle_opens > 0 {
            tables.failing_cycle_opens -= 1;
            return Err(unavailable("injected cycle open failure"));
        }
        if !tables.users.contains_key(&user_id) {
            return Err(BudgetError::not_found(format!("user {user_id}")));
        }

        let cycle = SalaryCycle {
            id: Uuid::new_v4(),
            user_id,
            salary,
            started_at: Utc::now(),
        };
        tables.cycles.push(cycle.clone());
        if tables.skipped_retargets > 0 {
            tables.skipped_retargets -= 1;
            return Ok(cycle);
        }
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.current_cycle_id = Some(cycle.id);
        }
        Ok(cycle)
    }

    async fn current_cycle(&self, user_id: Uuid) -> BudgetResult<Option<SalaryCycle>> {
        let tables = self.tables()?;
        let pointer = tables.users.get(&user_id).and_then(|u| u.current_cycle_id);
        Ok(pointer.and_then(|id| tables.cycles.iter().find(|c| c.id == id).cloned()))
    }

    async fn find_cycle(&self, cycle_id: Uuid) -> BudgetResult<Option<SalaryCycle>> {
        let tables = self.tables()?;
        Ok(tables.cycles.iter().find(|c| c.id == cycle_id).cloned())
    }

    async fn list_cycles(&self, user_id: Uuid) -> BudgetResult<Vec<SalaryCycle>> {
        let tables = self.tables()?;
        Ok(tables
            .cycles
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_expense(&self, expense: &NewExpense) -> BudgetResult<Expense> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .get(&expense.user_id)
            .ok_or_else(|| BudgetError::not_found(format!("user {}", expense.user_id)))?;
        let cycle_id = user.current_cycle_id.ok_or_else(|| {
            BudgetError::not_found(format!("current cycle of user {}", expense.user_id))
        })?;

        let stored = Expense {
            id: Uuid::new_v4(),
            user_id: expense.user_id,
            cycle_id,
            amount: expense.amount,
            budget_type: expense.budget_type.clone(),
            category: expense.category.clone(),
            note: expense.note.clone(),
            expense_date: expense.expense_date,
            created_at: Utc::now(),
        };
        tables.expenses.push(stored.clone());
        Ok(stored)
    }

    async fn find_expense(&self, expense_id: Uuid) -> BudgetResult<Option<Expense>> {
        let tables = self.tables()?;
        Ok(tables.expenses.iter().find(|e| e.id == expense_id).cloned())
    }

    async fn delete_expense(&self, expense_id: Uuid) -> BudgetResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != expense_id);
        Ok(tables.expenses.len() < before)
    }

    async fn cycle_expenses(&self, cycle_id: Uuid) -> BudgetResult<Vec<Expense>> {
        let tables = self.tables()?;
        Ok(newest_first(
            tables
                .expenses
                .iter()
                .filter(|e| e.cycle_id == cycle_id)
                .cloned()
                .collect(),
        ))
    }

    async fn user_expenses(&self, user_id: Uuid) -> BudgetResult<Vec<Expense>> {
        let tables = self.tables()?;
        Ok(newest_first(
            tables
                .expenses
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn cycle_spent(&self, cycle_id: Uuid) -> BudgetResult<Decimal> {
        let tables = self.tables()?;
        Ok(tables
            .expenses
            .iter()
            .filter(|e| e.cycle_id == cycle_id)
            .map(|e| e.amount)
            .sum())
    }

    async fn cycle_category_totals(&self, cycle_id: Uuid) -> BudgetResult<Vec<(String, Decimal)>> {
        let tables = self.tables()?;
        let totals = crate::accounting::category_totals(
            tables
                .expenses
                .iter()
                .filter(|e| e.cycle_id == cycle_id)
                .map(|e| (e.category.clone(), e.amount)),
        );
        Ok(totals.into_iter().collect())
    }

    async fn alert_watermark(&self, cycle_id: Uuid) -> BudgetResult<Option<AlertLevel>> {
        Ok(self.tables()?.watermarks.get(&cycle_id).copied())
    }

    async fn record_alert(
        &self,
        cycle_id: Uuid,
        level: AlertLevel,
        alert: &NewNotification,
    ) -> BudgetResult<Option<AlertRecord>> {
        let mut tables = self.tables()?;
        if tables.failing_alerts {
            return Err(unavailable("injected alert write failure"));
        }
        if !level.exceeds(tables.watermarks.get(&cycle_id).copied()) {
            return Ok(None);
        }

        tables.watermarks.insert(cycle_id, level);
        let record = AlertRecord {
            id: Uuid::new_v4(),
            user_id: alert.user_id,
            title: alert.title.clone(),
            message: alert.message.clone(),
            created_at: Utc::now(),
        };
        tables.notifications.push(record.clone());
        Ok(Some(record))
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> BudgetResult<AlertRecord> {
        let mut tables = self.tables()?;
        let record = AlertRecord {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            created_at: Utc::now(),
        };
        tables.notifications.push(record.clone());
        Ok(record)
    }

    async fn list_notifications(&self, user_id: Uuid) -> BudgetResult<Vec<AlertRecord>> {
        let tables = self.tables()?;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }
}
