//! Expense ledger and alert evaluation

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::BudgetService;
use crate::accounting::CycleSummary;
use crate::alert::AlertLevel;
use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    CycleListing, Expense, ExpenseDraft, NewNotification, SalaryCycle, UserAccount,
};
use crate::notify::{self, PushMessage};

/// Outcome of appending an expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseReceipt {
    #[serde(rename = "expenseId")]
    pub expense_id: Uuid,
    pub cycle_id: Uuid,
    pub salary: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    #[serde(rename = "percentUsed")]
    pub percent_used: Option<String>,
    /// Level newly alerted by this expense
    pub alert_level: Option<AlertLevel>,
}

impl BudgetService {
    /// Record an expense against the user's current cycle
    ///
    /// The pointer read, the insert, the recomputation and the alert
    /// watermark update run under the user's lock. The push is dispatched
    /// after the lock is released and cannot fail the append.
    pub async fn append_expense(&self, draft: ExpenseDraft) -> BudgetResult<ExpenseReceipt> {
        let expense = draft.validate()?;

        let (receipt, push_token, alert) = {
            let _guard = self.locks.acquire(expense.user_id).await;

            let user = self.require_user(expense.user_id).await?;
            let stored = self.store.insert_expense(&expense).await?;
            let cycle = self.store.find_cycle(stored.cycle_id).await?.ok_or_else(|| {
                BudgetError::Inconsistent(format!(
                    "expense {} is bound to missing cycle {}",
                    stored.id, stored.cycle_id
                ))
            })?;

            let spent = self.store.cycle_spent(cycle.id).await?;
            let summary = CycleSummary::compute(&cycle, spent);
            let alert = self.raise_alert(&user, &cycle, spent).await;

            info!(
                user_id = %user.id,
                cycle_id = %cycle.id,
                expense_id = %stored.id,
                amount = %stored.amount,
                total_spent = %spent,
                "Expense recorded"
            );

            let receipt = ExpenseReceipt {
                expense_id: stored.id,
                cycle_id: cycle.id,
                salary: summary.salary,
                total_spent: summary.spent,
                remaining: summary.remaining,
                percent_used: summary.percent_used,
                alert_level: alert.as_ref().map(|(level, _)| *level),
            };
            (receipt, user.push_token, alert)
        };

        if let (Some((_, alert)), Some(token)) = (alert, push_token) {
            notify::dispatch(
                self.push.clone(),
                PushMessage::new(token, alert.title, alert.message),
            );
        }

        Ok(receipt)
    }

    /// Record the alert for the level reached by `spent`, once per level per cycle
    ///
    /// Storage failures here are logged and swallowed: the expense is already
    /// committed.
    async fn raise_alert(
        &self,
        user: &UserAccount,
        cycle: &SalaryCycle,
        spent: Decimal,
    ) -> Option<(AlertLevel, NewNotification)> {
        let level = AlertLevel::evaluate(spent, cycle.salary)?;
        match self.store.alert_watermark(cycle.id).await {
            Ok(watermark) if !level.exceeds(watermark) => {
                debug!(user_id = %user.id, cycle_id = %cycle.id, level = %level, "Level already alerted this cycle");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(user_id = %user.id, cycle_id = %cycle.id, error = %e, "Failed to read alert watermark");
                return None;
            }
        }

        let alert = NewNotification {
            user_id: user.id,
            title: level.title().to_string(),
            message: level.message(),
        };

        match self.store.record_alert(cycle.id, level, &alert).await {
            Ok(Some(record)) => {
                info!(user_id = %user.id, cycle_id = %cycle.id, level = %level, notification_id = %record.id, "Budget alert raised");
                Some((level, alert))
            }
            Ok(None) => {
                debug!(user_id = %user.id, cycle_id = %cycle.id, level = %level, "Level raised concurrently");
                None
            }
            Err(e) => {
                warn!(user_id = %user.id, cycle_id = %cycle.id, level = %level, error = %e, "Failed to record budget alert");
                None
            }
        }
    }

    /// Delete an expense owned by `caller`
    pub async fn remove_expense(&self, expense_id: Uuid, caller: Uuid) -> BudgetResult<()> {
        let expense = self
            .store
            .find_expense(expense_id)
            .await?
            .ok_or_else(|| BudgetError::not_found(format!("expense {expense_id}")))?;
        if expense.user_id != caller {
            warn!(expense_id = %expense_id, caller = %caller, "Refused to delete another user's expense");
            return Err(BudgetError::Forbidden(format!(
                "expense {expense_id} belongs to another user"
            )));
        }

        let _guard = self.locks.acquire(expense.user_id).await;
        if !self.store.delete_expense(expense_id).await? {
            return Err(BudgetError::not_found(format!("expense {expense_id}")));
        }
        info!(user_id = %caller, expense_id = %expense_id, cycle_id = %expense.cycle_id, "Expense deleted");
        Ok(())
    }

    /// Expenses bound to the user's current cycle
    pub async fn current_expenses(&self, user_id: Uuid) -> BudgetResult<Vec<Expense>> {
        let cycle = self.require_current_cycle(user_id).await?;
        self.store.cycle_expenses(cycle.id).await
    }

    /// Every expense of the user, across cycles
    pub async fn all_expenses(&self, user_id: Uuid) -> BudgetResult<Vec<Expense>> {
        self.require_user(user_id).await?;
        self.store.user_expenses(user_id).await
    }

    /// Expenses of one of the user's cycles, current or historical
    pub async fn cycle_expenses(&self, user_id: Uuid, cycle_id: Uuid) -> BudgetResult<Vec<Expense>> {
        match self.store.find_cycle(cycle_id).await? {
            Some(cycle) if cycle.user_id == user_id => self.store.cycle_expenses(cycle.id).await,
            _ => Err(BudgetError::not_found(format!(
                "cycle {cycle_id} of user {user_id}"
            ))),
        }
    }

    /// The user's cycles, most recent first
    pub async fn list_cycles(&self, user_id: Uuid) -> BudgetResult<Vec<SalaryCycle>> {
        self.require_user(user_id).await?;
        self.store.list_cycles(user_id).await
    }

    /// The user's cycles, most recent first, with the current one flagged
    ///
    /// Read under the user's lock so exactly one listed cycle is current.
    pub async fn cycle_history(&self, user_id: Uuid) -> BudgetResult<Vec<CycleListing>> {
        let _guard = self.locks.acquire(user_id).await;
        let user = self.require_user(user_id).await?;
        let cycles = self.store.list_cycles(user_id).await?;
        Ok(cycles
            .into_iter()
            .map(|cycle| CycleListing {
                is_current: user.current_cycle_id == Some(cycle.id),
                cycle,
            })
            .collect())
    }
}
