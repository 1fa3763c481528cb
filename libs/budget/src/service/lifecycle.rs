//! Cycle lifecycle: registration, explicit reloads and salary baseline changes

use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::BudgetService;
use crate::error::{BudgetError, BudgetResult};
use crate::models::expense::{AMOUNT_SCALE, MAX_AMOUNT};
use crate::models::{NewAccount, SalaryCycle, UserAccount};

/// How many times a transient cycle-open failure is attempted before surfacing
pub const OPEN_CYCLE_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

fn validate_salary(salary: Decimal) -> BudgetResult<()> {
    if salary < Decimal::ZERO {
        return Err(BudgetError::validation("salary must not be negative"));
    }
    if salary.normalize().scale() > AMOUNT_SCALE {
        return Err(BudgetError::validation(
            "salary supports at most two decimal places",
        ));
    }
    if salary > MAX_AMOUNT {
        return Err(BudgetError::validation(format!(
            "salary must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

impl BudgetService {
    /// Open a new cycle with `salary` and make it the user's current cycle
    pub async fn open_cycle(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<SalaryCycle> {
        validate_salary(salary)?;
        let _guard = self.locks.acquire(user_id).await;
        self.open_cycle_locked(user_id, salary).await
    }

    /// Start a fresh cycle from the user's current salary baseline
    pub async fn reload_cycle(&self, user_id: Uuid) -> BudgetResult<SalaryCycle> {
        let _guard = self.locks.acquire(user_id).await;
        let user = self.require_user(user_id).await?;
        self.open_cycle_locked(user_id, user.salary).await
    }

    /// Change the salary baseline used by future reloads
    ///
    /// The open cycle keeps the salary it was opened with.
    pub async fn update_salary(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<()> {
        validate_salary(salary)?;
        let _guard = self.locks.acquire(user_id).await;
        if !self.store.update_salary(user_id, salary).await? {
            return Err(BudgetError::not_found(format!("user {user_id}")));
        }
        info!(user_id = %user_id, salary = %salary, "Salary baseline updated");
        Ok(())
    }

    /// Create a user together with their first cycle
    ///
    /// Succeeds only once the first cycle exists and the pointer targets it.
    /// If the cycle cannot be opened the user row is removed again.
    pub async fn register_account(&self, account: NewAccount) -> BudgetResult<UserAccount> {
        validate_salary(account.salary)?;

        let user = self.store.create_user(&account).await?;
        let opened = {
            let _guard = self.locks.acquire(user.id).await;
            self.open_cycle_locked(user.id, account.salary).await
        };

        match opened {
            Ok(_) => self.require_user(user.id).await,
            Err(e) => {
                error!(user_id = %user.id, error = %e, "First cycle could not be opened, rolling back registration");
                if let Err(cleanup) = self.store.delete_user(user.id).await {
                    error!(user_id = %user.id, error = %cleanup, "Rollback failed, user has no current cycle");
                    return Err(BudgetError::Inconsistent(format!(
                        "user {} was created without a current cycle",
                        user.id
                    )));
                }
                Err(e)
            }
        }
    }

    /// Caller must hold the user's lock
    async fn open_cycle_locked(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<SalaryCycle> {
        let mut attempt = 1;
        let cycle = loop {
            match self.store.open_cycle(user_id, salary).await {
                Ok(cycle) => break cycle,
                Err(e) if e.is_transient() && attempt < OPEN_CYCLE_ATTEMPTS => {
                    warn!(user_id = %user_id, attempt, error = %e, "Opening cycle failed, retrying");
                    sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let current = self.store.current_cycle(user_id).await?;
        if current.as_ref().map(|c| c.id) != Some(cycle.id) {
            error!(user_id = %user_id, cycle_id = %cycle.id, "Cycle opened but pointer still targets another cycle");
            return Err(BudgetError::Inconsistent(format!(
                "cycle {} was created but is not current for user {}",
                cycle.id, user_id
            )));
        }

        info!(user_id = %user_id, cycle_id = %cycle.id, salary = %salary, "Salary cycle opened");
        Ok(cycle)
    }
}
