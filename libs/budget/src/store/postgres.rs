//! PostgreSQL-backed budget store

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::BudgetStore;
use crate::alert::AlertLevel;
use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AlertRecord, Expense, NewAccount, NewExpense, NewNotification, SalaryCycle, UserAccount,
};

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, salary, push_token, current_cycle_id, created_at";
const CYCLE_COLUMNS: &str = "id, user_id, salary, started_at";
const EXPENSE_COLUMNS: &str =
    "id, user_id, cycle_id, amount, budget_type, category, note, expense_date, created_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, created_at";

/// Budget store over a PostgreSQL pool
///
/// Per-user atomic units lock the owner's `users` row with `FOR UPDATE`, so
/// they also serialize across service instances.
#[derive(Clone)]
pub struct PgBudgetStore {
    pool: PgPool,
}

impl PgBudgetStore {
    /// Create a new store over an initialized pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BudgetStore for PgBudgetStore {
    async fn create_user(&self, account: &NewAccount) -> BudgetResult<UserAccount> {
        info!("Creating user account for {}", account.email);

        let user = sqlx::query_as::<_, UserAccount>(&format!(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, salary, push_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.salary)
        .bind(&account.push_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BudgetError::Conflict(format!("email {} is already registered", account.email))
            }
            other => other.into(),
        })?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> BudgetResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> BudgetResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> BudgetResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_push_token(&self, user_id: Uuid, token: &str) -> BudgetResult<bool> {
        let result = sqlx::query("UPDATE users SET push_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_salary(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<bool> {
        let result = sqlx::query("UPDATE users SET salary = $1 WHERE id = $2")
            .bind(salary)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn open_cycle(&self, user_id: Uuid, salary: Decimal) -> BudgetResult<SalaryCycle> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner.is_none() {
            return Err(BudgetError::not_found(format!("user {user_id}")));
        }

        let cycle = sqlx::query_as::<_, SalaryCycle>(&format!(
            r#"
            INSERT INTO salary_cycles (id, user_id, salary, started_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {CYCLE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(salary)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let retargeted = sqlx::query("UPDATE users SET current_cycle_id = $1 WHERE id = $2")
            .bind(cycle.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if retargeted.rows_affected() != 1 {
            // Dropping the transaction rolls the cycle insert back.
            return Err(BudgetError::Inconsistent(format!(
                "current cycle pointer of user {user_id} was not retargeted"
            )));
        }

        tx.commit().await?;
        debug!(user_id = %user_id, cycle_id = %cycle.id, "Cycle opened");
        Ok(cycle)
    }

    async fn current_cycle(&self, user_id: Uuid) -> BudgetResult<Option<SalaryCycle>> {
        let cycle = sqlx::query_as::<_, SalaryCycle>(
            r#"
            SELECT sc.id, sc.user_id, sc.salary, sc.started_at
            FROM salary_cycles sc
            JOIN users u ON u.current_cycle_id = sc.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cycle)
    }

    async fn find_cycle(&self, cycle_id: Uuid) -> BudgetResult<Option<SalaryCycle>> {
        let cycle = sqlx::query_as::<_, SalaryCycle>(&format!(
            "SELECT {CYCLE_COLUMNS} FROM salary_cycles WHERE id = $1"
        ))
        .bind(cycle_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cycle)
    }

    async fn list_cycles(&self, user_id: Uuid) -> BudgetResult<Vec<SalaryCycle>> {
        let cycles = sqlx::query_as::<_, SalaryCycle>(&format!(
            "SELECT {CYCLE_COLUMNS} FROM salary_cycles WHERE user_id = $1 ORDER BY started_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cycles)
    }

    async fn insert_expense(&self, expense: &NewExpense) -> BudgetResult<Expense> {
        let mut tx = self.pool.begin().await?;

        let pointer: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT current_cycle_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(expense.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let cycle_id = match pointer {
            None => return Err(BudgetError::not_found(format!("user {}", expense.user_id))),
            Some(None) => {
                return Err(BudgetError::not_found(format!(
                    "current cycle of user {}",
                    expense.user_id
                )));
            }
            Some(Some(cycle_id)) => cycle_id,
        };

        let stored = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses (id, user_id, cycle_id, amount, budget_type, category, note, expense_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(expense.user_id)
        .bind(cycle_id)
        .bind(expense.amount)
        .bind(&expense.budget_type)
        .bind(&expense.category)
        .bind(&expense.note)
        .bind(expense.expense_date)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn find_expense(&self, expense_id: Uuid) -> BudgetResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(expense_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(expense)
    }

    async fn delete_expense(&self, expense_id: Uuid) -> BudgetResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(expense_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cycle_expenses(&self, cycle_id: Uuid) -> BudgetResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE cycle_id = $1
            ORDER BY expense_date DESC, created_at DESC
            "#
        ))
        .bind(cycle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    async fn user_expenses(&self, user_id: Uuid) -> BudgetResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE user_id = $1
            ORDER BY expense_date DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    async fn cycle_spent(&self, cycle_id: Uuid) -> BudgetResult<Decimal> {
        let spent: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE cycle_id = $1")
                .bind(cycle_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(spent)
    }

    async fn cycle_category_totals(&self, cycle_id: Uuid) -> BudgetResult<Vec<(String, Decimal)>> {
        let totals = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT category, SUM(amount)
            FROM expenses
            WHERE cycle_id = $1
            GROUP BY category
            ORDER BY category
            "#,
        )
        .bind(cycle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn alert_watermark(&self, cycle_id: Uuid) -> BudgetResult<Option<AlertLevel>> {
        let level: Option<i16> =
            sqlx::query_scalar("SELECT level FROM cycle_alert_watermarks WHERE cycle_id = $1")
                .bind(cycle_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(level.and_then(AlertLevel::from_percent))
    }

    async fn record_alert(
        &self,
        cycle_id: Uuid,
        level: AlertLevel,
        alert: &NewNotification,
    ) -> BudgetResult<Option<AlertRecord>> {
        let mut tx = self.pool.begin().await?;

        // Only inserts or raises; a lower or equal level leaves the row untouched
        // and RETURNING yields nothing.
        let raised: Option<i16> = sqlx::query_scalar(
            r#"
            INSERT INTO cycle_alert_watermarks (cycle_id, level)
            VALUES ($1, $2)
            ON CONFLICT (cycle_id) DO UPDATE
                SET level = EXCLUDED.level, updated_at = NOW()
                WHERE cycle_alert_watermarks.level < EXCLUDED.level
            RETURNING level
            "#,
        )
        .bind(cycle_id)
        .bind(i16::from(level.percent()))
        .fetch_optional(&mut *tx)
        .await?;

        if raised.is_none() {
            return Ok(None);
        }

        let record = sqlx::query_as::<_, AlertRecord>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, title, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(alert.user_id)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> BudgetResult<AlertRecord> {
        let record = sqlx::query_as::<_, AlertRecord>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, title, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_notifications(&self, user_id: Uuid) -> BudgetResult<Vec<AlertRecord>> {
        let records = sqlx::query_as::<_, AlertRecord>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
