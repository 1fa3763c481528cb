//! Budget service: the operations the HTTP layer calls
//!
//! Cycle lifecycle lives in [`lifecycle`], the expense ledger and alert
//! evaluation in [`ledger`]. Read-side accounting and the notification log
//! are here.

mod ledger;
mod lifecycle;

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::accounting::{self, CycleSummary};
use crate::error::{BudgetError, BudgetResult};
use crate::locks::UserLocks;
use crate::models::{AlertRecord, NewNotification, SalaryCycle, UserAccount};
use crate::notify::PushSender;
use crate::store::BudgetStore;

pub use ledger::ExpenseReceipt;
pub use lifecycle::OPEN_CYCLE_ATTEMPTS;

/// Title used for notifications added without one
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Notification";

#[derive(Clone)]
pub struct BudgetService {
    store: Arc<dyn BudgetStore>,
    push: Arc<dyn PushSender>,
    locks: UserLocks,
}

impl BudgetService {
    pub fn new(store: Arc<dyn BudgetStore>, push: Arc<dyn PushSender>) -> Self {
        Self {
            store,
            push,
            locks: UserLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn BudgetStore> {
        &self.store
    }

    pub fn push(&self) -> &Arc<dyn PushSender> {
        &self.push
    }

    async fn require_user(&self, user_id: Uuid) -> BudgetResult<UserAccount> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| BudgetError::not_found(format!("user {user_id}")))
    }

    async fn require_current_cycle(&self, user_id: Uuid) -> BudgetResult<SalaryCycle> {
        self.require_user(user_id).await?;
        self.store
            .current_cycle(user_id)
            .await?
            .ok_or_else(|| BudgetError::not_found(format!("current cycle of user {user_id}")))
    }

    /// Account registered under `email`, if any
    pub async fn find_account_by_email(&self, email: &str) -> BudgetResult<Option<UserAccount>> {
        self.store.find_user_by_email(email).await
    }

    /// Replace the device token budget alerts are pushed to
    pub async fn update_push_token(&self, user_id: Uuid, token: &str) -> BudgetResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BudgetError::validation("push token must not be empty"));
        }
        if !self.store.update_push_token(user_id, token).await? {
            return Err(BudgetError::not_found(format!("user {user_id}")));
        }
        Ok(())
    }

    /// Salary, spend and remaining budget of the user's current cycle
    pub async fn cycle_summary(&self, user_id: Uuid) -> BudgetResult<CycleSummary> {
        let cycle = self.require_current_cycle(user_id).await?;
        let spent = self.store.cycle_spent(cycle.id).await?;
        Ok(CycleSummary::compute(&cycle, spent))
    }

    /// Spend per category over the user's current cycle
    pub async fn category_summary(&self, user_id: Uuid) -> BudgetResult<BTreeMap<String, Decimal>> {
        let cycle = self.require_current_cycle(user_id).await?;
        let totals = self.store.cycle_category_totals(cycle.id).await?;
        Ok(accounting::category_totals(totals))
    }

    /// Append a notification by hand
    pub async fn add_notification(
        &self,
        user_id: Uuid,
        title: Option<String>,
        message: &str,
    ) -> BudgetResult<AlertRecord> {
        let message = message.trim();
        if message.is_empty() {
            return Err(BudgetError::validation("message is required"));
        }
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TITLE.to_string());

        self.require_user(user_id).await?;
        self.store
            .insert_notification(&NewNotification {
                user_id,
                title,
                message: message.to_string(),
            })
            .await
    }

    /// Notification log of a user, newest first
    pub async fn notifications(&self, user_id: Uuid) -> BudgetResult<Vec<AlertRecord>> {
        self.require_user(user_id).await?;
        self.store.list_notifications(user_id).await
    }
}
