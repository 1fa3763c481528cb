#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use budget::models::{ExpenseDraft, NewAccount, UserAccount};
use budget::notify::{PushError, PushMessage, PushSender};
use budget::store::InMemoryStore;
use budget::BudgetService;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Forwards every push to a channel the test can await
pub struct ChannelPush(mpsc::UnboundedSender<PushMessage>);

#[async_trait]
impl PushSender for ChannelPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let _ = self.0.send(message.clone());
        Ok(())
    }
}

/// Records every push on the channel, then reports the delivery as rejected
pub struct FailingPush(mpsc::UnboundedSender<PushMessage>);

#[async_trait]
impl PushSender for FailingPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let _ = self.0.send(message.clone());
        Err(PushError::Rejected {
            status: 503,
            reason: "push service unavailable".to_string(),
        })
    }
}

pub struct Harness {
    pub service: BudgetService,
    pub store: Arc<InMemoryStore>,
    pub pushes: mpsc::UnboundedReceiver<PushMessage>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_push(|tx| Arc::new(ChannelPush(tx)))
    }

    pub fn with_failing_push() -> Self {
        Self::with_push(|tx| Arc::new(FailingPush(tx)))
    }

    fn with_push(
        push: impl FnOnce(mpsc::UnboundedSender<PushMessage>) -> Arc<dyn PushSender>,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let (tx, pushes) = mpsc::unbounded_channel();
        let service = BudgetService::new(store.clone(), push(tx));
        Self {
            service,
            store,
            pushes,
        }
    }

    pub async fn register(&self, salary: &str) -> UserAccount {
        self.register_with_token(salary, Some("ExponentPushToken[test]")).await
    }

    pub async fn register_with_token(&self, salary: &str, token: Option<&str>) -> UserAccount {
        self.service
            .register_account(account(salary, token))
            .await
            .expect("registration should succeed")
    }

    pub async fn next_push(&mut self) -> Option<PushMessage> {
        tokio::time::timeout(Duration::from_secs(1), self.pushes.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn no_push(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(100), self.pushes.recv())
            .await
            .is_err()
    }
}

pub fn account(salary: &str, token: Option<&str>) -> NewAccount {
    let id = Uuid::new_v4();
    NewAccount {
        full_name: "Asha Rao".to_string(),
        email: format!("{id}@example.com"),
        password_hash: "$argon2id$stub".to_string(),
        salary: d(salary),
        push_token: token.map(str::to_string),
    }
}

pub fn d(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub fn draft(user_id: Uuid, amount: &str, category: &str) -> ExpenseDraft {
    ExpenseDraft {
        user_id: Some(user_id),
        amount: Some(d(amount)),
        budget_type: Some("needs".to_string()),
        category: Some(category.to_string()),
        note: None,
        expense_date: NaiveDate::from_ymd_opt(2025, 6, 1),
    }
}
