//! Salary cycle model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One accounting period with the salary captured when it was opened
///
/// Cycles are never mutated. A newer cycle supersedes this one by moving the
/// owner's current-cycle pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SalaryCycle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub salary: Decimal,
    pub started_at: DateTime<Utc>,
}

/// A cycle as listed to its owner
///
/// `is_current` is derived from the owner's pointer at read time and is
/// not stored on the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleListing {
    #[serde(flatten)]
    pub cycle: SalaryCycle,
    pub is_current: bool,
}
